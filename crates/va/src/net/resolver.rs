use std::net::IpAddr;

use async_trait::async_trait;
use displaydoc::Display;

/// DNS lookups used by the challenge performers and the CAA checker.
///
/// Implementations must be safe for concurrent use; a single resolver is
/// shared by every in-flight validation.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// TXT RRset for `name`, one string per record.
    async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, DnsError>;

    /// A and AAAA addresses for `name`, in resolver order.
    async fn lookup_host(&self, name: &str) -> Result<Vec<IpAddr>, DnsError>;

    /// CAA RRset for exactly `name`. Tree climbing is the checker's job.
    async fn lookup_caa(&self, name: &str) -> Result<CaaLookup, DnsError>;

    /// Tag recorded in validation records identifying the resolver class.
    fn resolver_type(&self) -> &str;
}

/// DNS failures, with lookup timeouts reported distinctly from NXDOMAIN.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum DnsError {
    /// NXDOMAIN
    NxDomain,
    /// Timeout after lookup
    Timeout,
    /// {0}
    ServFail(String),
}

impl std::error::Error for DnsError {}

/// A single CAA record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaaRecord {
    pub flags: u8,
    pub tag: String,
    pub value: String,
}

impl CaaRecord {
    pub fn new(flags: u8, tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flags,
            tag: tag.into(),
            value: value.into(),
        }
    }

    /// Whether the issuer-critical flag is set.
    pub fn critical(&self) -> bool {
        self.flags & 0x80 != 0
    }
}

/// The result of a CAA lookup: the RRset and the node that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaaLookup {
    pub records: Vec<CaaRecord>,
    pub used_node: String,
}
