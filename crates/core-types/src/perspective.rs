use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The label carried by the primary perspective.
pub const PRIMARY_PERSPECTIVE: &str = "Primary";

/// Regional Internet Registry service regions, used as the diversity label
/// for multi-perspective corroboration.
///
/// Variant order matches the lexicographic order of the labels, so ordered
/// collections of `Rir` sort the way audit records require.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rir {
    #[serde(rename = "AFRINIC")]
    Afrinic,
    #[serde(rename = "APNIC")]
    Apnic,
    #[serde(rename = "ARIN")]
    Arin,
    #[serde(rename = "LACNIC")]
    Lacnic,
    #[serde(rename = "RIPE")]
    Ripe,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unrecognized RIR label {0:?}")]
pub struct UnknownRir(pub String);

impl Rir {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Afrinic => "AFRINIC",
            Self::Apnic => "APNIC",
            Self::Arin => "ARIN",
            Self::Lacnic => "LACNIC",
            Self::Ripe => "RIPE",
        }
    }
}

impl fmt::Display for Rir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rir {
    type Err = UnknownRir;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AFRINIC" => Ok(Self::Afrinic),
            "APNIC" => Ok(Self::Apnic),
            "ARIN" => Ok(Self::Arin),
            "LACNIC" => Ok(Self::Lacnic),
            "RIPE" => Ok(Self::Ripe),
            _ => Err(UnknownRir(s.to_string())),
        }
    }
}
