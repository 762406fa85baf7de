use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed problem taxonomy observed on the ACME protocol surface.
///
/// The wire strings are part of the protocol contract and must round-trip
/// bit-exact. Values arriving from a remote that fall outside the taxonomy
/// fail to decode; the transport layer surfaces them as `serverInternal`
/// while the original value is preserved for the differential audit line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProblemKind {
    Connection,
    Dns,
    Tls,
    Unauthorized,
    Malformed,
    Caa,
    OrderNotReady,
    ServerInternal,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unrecognized problem type {0:?}")]
pub struct UnknownProblemKind(pub String);

impl ProblemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Dns => "dns",
            Self::Tls => "tls",
            Self::Unauthorized => "unauthorized",
            Self::Malformed => "malformed",
            Self::Caa => "caa",
            Self::OrderNotReady => "orderNotReady",
            Self::ServerInternal => "serverInternal",
        }
    }

    /// The HTTP status carried by problem documents of this kind.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthorized | Self::Caa | Self::OrderNotReady => 403,
            Self::ServerInternal => 500,
            Self::Connection | Self::Dns | Self::Tls | Self::Malformed => 400,
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemKind {
    type Err = UnknownProblemKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connection" => Ok(Self::Connection),
            "dns" => Ok(Self::Dns),
            "tls" => Ok(Self::Tls),
            "unauthorized" => Ok(Self::Unauthorized),
            "malformed" => Ok(Self::Malformed),
            "caa" => Ok(Self::Caa),
            "orderNotReady" => Ok(Self::OrderNotReady),
            "serverInternal" => Ok(Self::ServerInternal),
            _ => Err(UnknownProblemKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProblemKind {
    type Error = UnknownProblemKind;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ProblemKind> for String {
    fn from(value: ProblemKind) -> Self {
        value.as_str().to_string()
    }
}

/// An ACME-style problem document. Absence of a problem means success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: ProblemKind,
    pub detail: String,
    pub status: u16,
}

impl Problem {
    pub fn new(kind: ProblemKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            status: kind.http_status(),
        }
    }

    pub fn connection(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Connection, detail)
    }

    pub fn dns(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Dns, detail)
    }

    pub fn tls(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Tls, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Unauthorized, detail)
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Malformed, detail)
    }

    pub fn caa(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::Caa, detail)
    }

    pub fn order_not_ready(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::OrderNotReady, detail)
    }

    pub fn server_internal(detail: impl Into<String>) -> Self {
        Self::new(ProblemKind::ServerInternal, detail)
    }

    /// The same problem with its detail prefixed, keeping kind and status.
    pub fn with_detail_prefix(&self, prefix: &str) -> Self {
        Self {
            kind: self.kind,
            detail: format!("{prefix}{}", self.detail),
            status: self.status,
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :: {}", self.kind, self.detail)
    }
}
