//! Interfaces to the network collaborators the VA core consumes.
//!
//! The implementations behind these traits (a recursive DNS client, an HTTP
//! client with address pinning, a TLS dialer) live outside the core; the
//! core only depends on the shapes defined here, and tests substitute
//! in-memory doubles.

mod fetch;
pub use fetch::{FetchError, FetchRequest, FetchResponse, Fetcher};

mod resolver;
pub use resolver::{CaaLookup, CaaRecord, DnsError, Resolver};

mod tls;
pub use tls::{AcmeIdentifier, PeerCertificate, TlsDialer, TlsError, TlsHandshake};
