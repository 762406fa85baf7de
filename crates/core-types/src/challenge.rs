use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The challenge types this VA knows how to perform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChallengeType {
    Http01,
    Dns01,
    TlsAlpn01,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unrecognized challenge type {0:?}")]
pub struct UnknownChallengeType(pub String);

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http01 => "http-01",
            Self::Dns01 => "dns-01",
            Self::TlsAlpn01 => "tls-alpn-01",
        }
    }

    /// Parse a wire-level challenge type string, `None` if unrecognized.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "http-01" => Some(Self::Http01),
            "dns-01" => Some(Self::Dns01),
            "tls-alpn-01" => Some(Self::TlsAlpn01),
            _ => None,
        }
    }
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeType {
    type Err = UnknownChallengeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| UnknownChallengeType(s.to_string()))
    }
}

impl TryFrom<String> for ChallengeType {
    type Error = UnknownChallengeType;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChallengeType> for String {
    fn from(value: ChallengeType) -> Self {
        value.as_str().to_string()
    }
}

/// Status of a challenge as reflected in results and audit records.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Pending,
    Valid,
    Invalid,
}

impl ChallengeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A challenge as carried in a [`crate::ValidationRequest`].
///
/// The `kind` field is kept as the raw wire string: requests bearing an
/// unknown challenge type must reach the dispatcher, which answers them with
/// a `malformed` problem rather than a transport-level decode error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireChallenge {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ChallengeStatus,
    pub token: String,
}

impl WireChallenge {
    pub fn new(kind: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            status: ChallengeStatus::Pending,
            token: token.into(),
        }
    }
}
