use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use verdite_va::net::{FetchError, FetchRequest, FetchResponse, Fetcher};

/// How the scripted fetcher answers a request.
#[derive(Clone, Debug)]
pub enum FetchBehavior {
    /// 200 with the key authorization plus trailing whitespace, the way
    /// real challenge responders tend to serve it.
    KeyAuthorization,
    /// 200 with a body that matches no challenge.
    WrongBody,
    /// The given status with an empty body.
    Status(u16),
    /// 302 to the given location.
    RedirectTo(String),
    /// Connection refused.
    Refused,
    /// Connection reset by peer.
    Reset,
    /// Sleep, then answer with the key authorization.
    Slow(Duration),
}

/// A scripted [`Fetcher`], keyed by request host with a default behavior.
pub struct MockFetcher {
    key_authorization: String,
    default: FetchBehavior,
    per_host: HashMap<String, FetchBehavior>,
    requests: AtomicUsize,
}

impl MockFetcher {
    pub fn new(key_authorization: &str, default: FetchBehavior) -> Self {
        Self {
            key_authorization: key_authorization.to_string(),
            default,
            per_host: HashMap::new(),
            requests: AtomicUsize::new(0),
        }
    }

    /// Serves the key authorization for every host.
    pub fn passing(key_authorization: &str) -> Self {
        Self::new(key_authorization, FetchBehavior::KeyAuthorization)
    }

    /// Serves a mismatched body for every host.
    pub fn failing(key_authorization: &str) -> Self {
        Self::new(key_authorization, FetchBehavior::WrongBody)
    }

    pub fn with_host(mut self, host: &str, behavior: FetchBehavior) -> Self {
        self.per_host.insert(host.to_string(), behavior);
        self
    }

    /// Total requests served, across redirects.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn key_authorization_body(&self) -> Bytes {
        Bytes::from(format!("{}\n\r \t", self.key_authorization))
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let behavior = self
            .per_host
            .get(&request.host)
            .unwrap_or(&self.default)
            .clone();

        match behavior {
            FetchBehavior::KeyAuthorization => Ok(FetchResponse {
                status: 200,
                location: None,
                body: self.key_authorization_body(),
            }),
            FetchBehavior::WrongBody => Ok(FetchResponse {
                status: 200,
                location: None,
                body: Bytes::from_static(b"???"),
            }),
            FetchBehavior::Status(status) => Ok(FetchResponse {
                status,
                location: None,
                body: Bytes::new(),
            }),
            FetchBehavior::RedirectTo(location) => Ok(FetchResponse {
                status: 302,
                location: Some(location),
                body: Bytes::new(),
            }),
            FetchBehavior::Refused => Err(FetchError::ConnectionRefused),
            FetchBehavior::Reset => Err(FetchError::ConnectionReset),
            FetchBehavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(FetchResponse {
                    status: 200,
                    location: None,
                    body: self.key_authorization_body(),
                })
            }
        }
    }
}
