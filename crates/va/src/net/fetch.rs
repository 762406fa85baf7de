use std::net::IpAddr;

use async_trait::async_trait;
use bytes::Bytes;
use displaydoc::Display;
use url::Url;

/// One HTTP transaction against an explicit address.
///
/// The fetcher performs no redirect following of its own; the HTTP-01
/// performer drives redirects so it can apply the challenge redirect policy
/// and record every hop.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

#[derive(Clone, Debug)]
pub struct FetchRequest {
    pub url: Url,
    /// Value for the `Host` header; usually the URL's hostname.
    pub host: String,
    /// The address to connect to, pinned by the performer.
    pub address: IpAddr,
    pub user_agent: String,
}

#[derive(Clone, Debug)]
pub struct FetchResponse {
    pub status: u16,
    /// The `Location` header, when the response is a redirect.
    pub location: Option<String>,
    /// At most the first KiB of the response body.
    pub body: Bytes,
}

/// Transport failures from a single HTTP transaction.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum FetchError {
    /// Connection refused
    ConnectionRefused,
    /// Connection reset by peer
    ConnectionReset,
    /// Timeout after connect
    Timeout,
    /// {0}
    Other(String),
}

impl std::error::Error for FetchError {}
