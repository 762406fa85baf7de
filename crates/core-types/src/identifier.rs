use core::fmt;

use serde::{Deserialize, Serialize};

/// An identifier presented by an applicant for validation.
///
/// Only DNS identifiers are supported. The value is an LDH hostname which may
/// carry a single `*.` prefix for wildcard names; performers always operate
/// on the stripped form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Identifier {
    Dns(String),
}

impl Identifier {
    pub fn dns(value: impl Into<String>) -> Self {
        Self::Dns(value.into())
    }

    /// The identifier value as presented, wildcard prefix included.
    pub fn value(&self) -> &str {
        match self {
            Self::Dns(value) => value,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.value().starts_with("*.")
    }

    /// The hostname performers operate on: the value with a single leading
    /// `*.` removed. Stripping is applied exactly once, so `*.*.x` yields
    /// `*.x`.
    pub fn effective_hostname(&self) -> &str {
        let value = self.value();
        value.strip_prefix("*.").unwrap_or(value)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}
