use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use verdite_core_types::{Rir, PRIMARY_PERSPECTIVE};

/// Static configuration of a VA instance. Handed to
/// [`crate::ValidationAuthority::new`] once and never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaConfig {
    /// User agent sent on outbound HTTP-01 fetches.
    pub user_agent: String,
    /// CA identities recognized in CAA `issue`/`issuewild` property values.
    pub ca_identities: Vec<String>,
    /// Prefixes used to form account URIs from registration IDs when
    /// enforcing the CAA `accounturi` parameter.
    pub account_uri_prefixes: Vec<String>,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_tls_port")]
    pub tls_port: u16,
    /// Label this instance reports in perspective results.
    #[serde(default = "default_perspective")]
    pub perspective: String,
    /// The RIR service region this instance is deployed in.
    pub rir: Rir,
    /// Deadline for a single network attempt (lookup, connect, handshake).
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
}

impl VaConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

fn default_http_port() -> u16 {
    80
}

fn default_tls_port() -> u16 {
    443
}

fn default_perspective() -> String {
    PRIMARY_PERSPECTIVE.to_string()
}

fn default_attempt_timeout_ms() -> u64 {
    10_000
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// CAA checking is meaningless without an identity to authorize.
    #[error("at least one CA identity must be configured")]
    NoCaIdentities,
    /// `accounturi` enforcement needs at least one prefix to form URIs with.
    #[error("at least one account URI prefix must be configured")]
    NoAccountUriPrefixes,
}
