#![forbid(unsafe_code)]

//! In-memory collaborators and fixtures for exercising the VA core without
//! a network: a scripted resolver, fetcher, and TLS dialer, remote
//! perspectives that forward to local VAs (or break, or hang), and helpers
//! for asserting on audit lines and metric samples.

use base64::prelude::*;
use sha2::{Digest, Sha256};

pub use audit::{audit_json, MockAuditLog};

mod fetcher;
pub use fetcher::{FetchBehavior, MockFetcher};

mod fixtures;
pub use fixtures::{
    build_va, caa_request, labels, metric_count, remote_test_va, test_config, validation_request,
    TestVa,
};

mod policy;
pub use policy::PermissivePolicy;

mod remotes;
pub use remotes::{
    broken_remote, caa_broken_remote, caa_hijacked_remote, canceled_remote, failing_remote,
    in_memory_remote, passing_remote, slow_remote, BrokenRemote, CanceledRemote, InMemoryRemote,
    SlowRemote,
};

pub use resolver::{standard_caa_records, MockResolver, BROKEN_DNS_DETAIL, HIJACKED_CA};

mod tls;
pub use tls::{MockTlsDialer, TlsBehavior};

/// The token every test challenge carries.
pub const TOKEN: &str = "LoqXcYV8q5ONbJQxbmR7SCTNo3tiAXDfowyjxAjEuX0";

/// JWK thumbprint of the test account key.
pub const THUMBPRINT: &str = "9jg46WB3rR_AHD-EBXdN7cBkH1WOu0tA3M9fm21mqTI";

/// The CA identity test VAs recognize in CAA records.
pub const CA_IDENTITY: &str = "example-ca.com";

/// Prefix test VAs use to form account URIs from registration IDs.
pub const ACCOUNT_URI_PREFIX: &str = "https://acme.example.net/acct/";

/// The expected key authorization for [`TOKEN`].
pub fn key_authorization() -> String {
    format!("{TOKEN}.{THUMBPRINT}")
}

/// The DNS-01 TXT digest for a key authorization.
pub fn txt_digest(key_authorization: &str) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(Sha256::digest(key_authorization.as_bytes()))
}

/// The raw SHA-256 digest carried by TLS-ALPN-01 challenge certificates.
pub fn alpn_digest(key_authorization: &str) -> Vec<u8> {
    Sha256::digest(key_authorization.as_bytes()).to_vec()
}
