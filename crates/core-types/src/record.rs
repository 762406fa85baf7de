use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::Rir;

/// The per-perspective evidence for one validation attempt.
///
/// A record is produced whether the attempt succeeded or failed: it is what
/// the audit log carries to show where the perspective looked and what it
/// connected to. `hostname` is always the effective (wildcard-stripped)
/// name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub port: Option<u16>,
    #[serde(
        rename = "addressesResolved",
        skip_serializing_if = "Vec::is_empty",
        default
    )]
    pub addresses_resolved: Vec<IpAddr>,
    #[serde(rename = "addressUsed", skip_serializing_if = "Option::is_none", default)]
    pub address_used: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
    pub perspective: String,
    pub rir: Rir,
    #[serde(
        rename = "resolverType",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub resolver_type: String,
}

impl ValidationRecord {
    pub fn new(hostname: impl Into<String>, perspective: impl Into<String>, rir: Rir) -> Self {
        Self {
            hostname: hostname.into(),
            port: None,
            addresses_resolved: Vec::new(),
            address_used: None,
            url: None,
            perspective: perspective.into(),
            rir,
            resolver_type: String::new(),
        }
    }
}
