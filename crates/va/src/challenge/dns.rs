use tokio::time::timeout;

use verdite_core_types::{Problem, ValidationRecord};

use crate::challenge::key_authorization_digest;
use crate::errors;
use crate::net::DnsError;
use crate::va::ValidationAuthority;

const CHALLENGE_LABEL: &str = "_acme-challenge";

impl ValidationAuthority {
    /// DNS-01: any TXT record at `_acme-challenge.{hostname}` must equal the
    /// base64url SHA-256 digest of the key authorization. The wildcard
    /// prefix never appears in the query name.
    pub(crate) async fn perform_dns01(
        &self,
        hostname: &str,
        key_authorization: &str,
    ) -> (Vec<ValidationRecord>, Option<Problem>) {
        let digest = key_authorization_digest(key_authorization);
        let query = format!("{CHALLENGE_LABEL}.{hostname}");

        let mut record = ValidationRecord::new(hostname, &self.perspective, self.rir);
        record.resolver_type = self.resolver.resolver_type().to_string();
        let records = vec![record];

        let lookup = timeout(self.attempt_timeout, self.resolver.lookup_txt(&query)).await;
        let txts = match lookup {
            Err(_) => return (records, Some(errors::dns_problem(&DnsError::Timeout))),
            Ok(Err(err)) => return (records, Some(errors::dns_problem(&err))),
            Ok(Ok(txts)) => txts,
        };

        if txts.iter().any(|txt| txt == &digest) {
            return (records, None);
        }

        let problem = if txts.is_empty() {
            Problem::unauthorized(format!("No TXT record found at {query}"))
        } else {
            Problem::unauthorized(format!(
                "Incorrect TXT record {:?} found at {query}",
                txts[0]
            ))
        };

        (records, Some(problem))
    }
}
