use tokio::time::timeout;

use verdite_core_types::{Problem, ValidationRecord};

use crate::challenge::{hex, key_authorization_sha256};
use crate::errors;
use crate::net::{TlsError, TlsHandshake};
use crate::va::ValidationAuthority;

const ACME_TLS_ALPN: &str = "acme-tls/1";

impl ValidationAuthority {
    /// TLS-ALPN-01: handshake on the TLS port with SNI set to the hostname
    /// and ALPN restricted to `acme-tls/1`, then check the presented
    /// certificate against the challenge.
    pub(crate) async fn perform_tls_alpn01(
        &self,
        hostname: &str,
        key_authorization: &str,
    ) -> (Vec<ValidationRecord>, Option<Problem>) {
        let addresses = match self.resolve_ordered(hostname).await {
            Ok(addresses) => addresses,
            Err(problem) => {
                let mut record = ValidationRecord::new(hostname, &self.perspective, self.rir);
                record.port = Some(self.tls_port);
                record.resolver_type = self.resolver.resolver_type().to_string();
                return (vec![record], Some(problem));
            }
        };

        let mut record = ValidationRecord::new(hostname, &self.perspective, self.rir);
        record.port = Some(self.tls_port);
        record.addresses_resolved = addresses.clone();
        record.resolver_type = self.resolver.resolver_type().to_string();

        let alpn = vec![ACME_TLS_ALPN.to_string()];
        let mut handshake: Option<TlsHandshake> = None;
        let mut last_problem: Option<Problem> = None;
        for address in &addresses {
            record.address_used = Some(*address);
            let dial = self
                .tls_dialer
                .dial(*address, self.tls_port, hostname, &alpn);
            match timeout(self.attempt_timeout, dial).await {
                Err(_) => last_problem = Some(errors::tls_problem(&TlsError::Timeout)),
                Ok(Err(err)) => last_problem = Some(errors::tls_problem(&err)),
                Ok(Ok(done)) => {
                    handshake = Some(done);
                    break;
                }
            }
        }
        let records = vec![record];

        let Some(handshake) = handshake else {
            let problem =
                last_problem.unwrap_or_else(|| Problem::tls("TLS handshake never completed"));
            return (records, Some(problem));
        };

        let problem = check_handshake(&handshake, hostname, key_authorization).err();
        (records, problem)
    }
}

fn check_handshake(
    handshake: &TlsHandshake,
    hostname: &str,
    key_authorization: &str,
) -> Result<(), Problem> {
    if handshake.alpn.as_deref() != Some(ACME_TLS_ALPN) {
        return Err(Problem::unauthorized(format!(
            "Server did not negotiate ALPN protocol {ACME_TLS_ALPN:?}"
        )));
    }

    if handshake.peer_chain.len() != 1 {
        return Err(Problem::unauthorized(format!(
            "Received {} certificates, expected 1",
            handshake.peer_chain.len()
        )));
    }
    let cert = &handshake.peer_chain[0];

    if !cert.self_signed {
        return Err(Problem::unauthorized(
            "Challenge certificate was not self-signed",
        ));
    }

    let san_matches = cert.san_dns_names.len() == 1
        && cert.san_dns_names[0].eq_ignore_ascii_case(hostname);
    if !san_matches {
        return Err(Problem::unauthorized(format!(
            "Challenge certificate does not have exactly one dNSName equal to {hostname:?}"
        )));
    }

    let Some(identifier) = &cert.acme_identifier else {
        return Err(Problem::unauthorized(
            "Challenge certificate is missing the id-pe-acmeIdentifier extension",
        ));
    };
    if !identifier.critical {
        return Err(Problem::unauthorized(
            "Challenge certificate id-pe-acmeIdentifier extension is not critical",
        ));
    }

    let expected = key_authorization_sha256(key_authorization);
    if identifier.digest != expected {
        return Err(Problem::unauthorized(format!(
            "Incorrect id-pe-acmeIdentifier extension: expected {}, found {}",
            hex(&expected),
            hex(&identifier.digest)
        )));
    }

    Ok(())
}
