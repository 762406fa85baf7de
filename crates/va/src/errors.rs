//! Mapping from collaborator failures to user-facing problems.
//!
//! Detail strings stay terse and never carry resolver identities or
//! VA-internal addresses.

use verdite_core_types::Problem;

use crate::net::{DnsError, FetchError, TlsError};

pub(crate) fn dns_problem(err: &DnsError) -> Problem {
    Problem::dns(err.to_string())
}

pub(crate) fn fetch_problem(err: &FetchError) -> Problem {
    Problem::connection(err.to_string())
}

pub(crate) fn tls_problem(err: &TlsError) -> Problem {
    match err {
        TlsError::ConnectionRefused | TlsError::ConnectionReset => {
            Problem::connection(err.to_string())
        }
        TlsError::Timeout | TlsError::Handshake(_) => Problem::tls(err.to_string()),
    }
}
