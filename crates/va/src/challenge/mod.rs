//! Challenge performers: each takes an identifier, a token, and the expected
//! key authorization, and produces the validation records and problem for a
//! single perspective.

use std::net::IpAddr;

use base64::prelude::*;
use sha2::{Digest, Sha256};
use tokio::time::timeout;

use verdite_core_types::{ChallengeType, Identifier, Problem, ValidationRecord};

use crate::errors;
use crate::net::DnsError;
use crate::va::ValidationAuthority;

mod dns;
mod http;
mod tlsalpn;

impl ValidationAuthority {
    /// Dispatch one challenge attempt for this perspective. Unknown challenge
    /// types and syntactically invalid identifiers answer with a problem
    /// rather than an error: they are validation outcomes, not transport
    /// failures.
    pub(crate) async fn perform_challenge(
        &self,
        challenge_type: &str,
        token: &str,
        identifier: &Identifier,
        key_authorization: &str,
    ) -> (Vec<ValidationRecord>, Option<Problem>) {
        let Some(kind) = ChallengeType::from_wire(challenge_type) else {
            return (
                Vec::new(),
                Some(Problem::malformed(format!(
                    "Challenge type {challenge_type:?} is not supported"
                ))),
            );
        };

        let hostname = identifier.effective_hostname();
        if let Err(err) = self.policy.valid_domain(hostname) {
            return (
                Vec::new(),
                Some(Problem::malformed(format!(
                    "Identifier {hostname:?} is not a valid domain name: {err}"
                ))),
            );
        }

        match kind {
            ChallengeType::Http01 => self.perform_http01(hostname, token, key_authorization).await,
            ChallengeType::Dns01 => self.perform_dns01(hostname, key_authorization).await,
            ChallengeType::TlsAlpn01 => self.perform_tls_alpn01(hostname, key_authorization).await,
        }
    }

    /// Resolve `hostname` with the per-attempt deadline, AAAA before A,
    /// resolver order preserved within each family.
    pub(crate) async fn resolve_ordered(&self, hostname: &str) -> Result<Vec<IpAddr>, Problem> {
        let lookup = timeout(self.attempt_timeout, self.resolver.lookup_host(hostname)).await;

        let mut addresses = match lookup {
            Err(_) => return Err(errors::dns_problem(&DnsError::Timeout)),
            Ok(Err(err)) => return Err(errors::dns_problem(&err)),
            Ok(Ok(addresses)) => addresses,
        };

        addresses.sort_by_key(|address| match address {
            IpAddr::V6(_) => 0,
            IpAddr::V4(_) => 1,
        });

        if addresses.is_empty() {
            return Err(Problem::dns(format!(
                "No valid IP addresses found for {hostname}"
            )));
        }

        Ok(addresses)
    }
}

/// base64url (unpadded) SHA-256 digest of the key authorization, as placed
/// in DNS-01 TXT records.
pub(crate) fn key_authorization_digest(key_authorization: &str) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(Sha256::digest(key_authorization.as_bytes()))
}

/// Raw SHA-256 digest of the key authorization, as carried by the
/// TLS-ALPN-01 certificate extension.
pub(crate) fn key_authorization_sha256(key_authorization: &str) -> Vec<u8> {
    Sha256::digest(key_authorization.as_bytes()).to_vec()
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
