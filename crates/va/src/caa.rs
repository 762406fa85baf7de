//! CAA authorization: resolve the CAA tree for an FQDN and decide whether
//! the authoritative RRset authorizes this CA to issue.

use tokio::time::timeout;
use tracing::info;

use verdite_core_types::{Identifier, Problem};

use crate::errors;
use crate::net::{CaaLookup, CaaRecord, DnsError};
use crate::va::ValidationAuthority;

const KNOWN_TAGS: [&str; 3] = ["issue", "issuewild", "iodef"];

impl ValidationAuthority {
    /// Check CAA for one identifier from this perspective. `None` means
    /// issuance is authorized; DNS failures surface as `dns` problems, CAA
    /// policy denials as `caa`.
    pub(crate) async fn check_caa_records(
        &self,
        identifier: &Identifier,
        challenge_type: &str,
        reg_id: i64,
    ) -> Option<Problem> {
        let fqdn = identifier.effective_hostname();

        let lookup = match self.resolve_caa_tree(fqdn).await {
            Ok(lookup) => lookup,
            Err(problem) => return Some(problem),
        };

        let Some(lookup) = lookup else {
            info!("Checked CAA records for {fqdn}, [no CAA records found]: valid for issuance: true");
            return None;
        };

        let evaluation = evaluate_caa(
            &lookup.records,
            fqdn,
            identifier.is_wildcard(),
            challenge_type,
            reg_id,
            &self.ca_identities,
            &self.account_uri_prefixes,
        );

        match evaluation {
            Ok(issuer) => {
                info!(
                    used_node = %lookup.used_node,
                    "Checked CAA records for {fqdn}, [issuer: {issuer}]: valid for issuance: true"
                );
                None
            }
            Err(problem) => {
                info!(
                    used_node = %lookup.used_node,
                    "Checked CAA records for {fqdn}: valid for issuance: false"
                );
                Some(problem)
            }
        }
    }

    /// Climb from the FQDN towards the apex; the first node with a
    /// non-empty RRset is authoritative. NXDOMAIN at a node keeps climbing,
    /// every other DNS failure aborts the check.
    async fn resolve_caa_tree(&self, fqdn: &str) -> Result<Option<CaaLookup>, Problem> {
        for node in caa_climb(fqdn) {
            let lookup = timeout(self.attempt_timeout, self.resolver.lookup_caa(node)).await;
            let lookup = match lookup {
                Err(_) => return Err(errors::dns_problem(&DnsError::Timeout)),
                Ok(Err(DnsError::NxDomain)) => continue,
                Ok(Err(err)) => return Err(errors::dns_problem(&err)),
                Ok(Ok(lookup)) => lookup,
            };

            if !lookup.records.is_empty() {
                return Ok(Some(lookup));
            }
        }

        Ok(None)
    }
}

/// All nodes from the FQDN up to and including the TLD label.
fn caa_climb(fqdn: &str) -> Vec<&str> {
    let mut nodes = vec![fqdn];
    let mut rest = fqdn;
    while let Some((_, parent)) = rest.split_once('.') {
        if parent.is_empty() {
            break;
        }
        nodes.push(parent);
        rest = parent;
    }
    nodes
}

/// Apply the property rules to an authoritative RRset. Returns the issuer
/// identity that authorized issuance, or the `caa` problem that forbids it.
fn evaluate_caa(
    records: &[CaaRecord],
    fqdn: &str,
    wildcard: bool,
    challenge_type: &str,
    reg_id: i64,
    ca_identities: &[String],
    account_uri_prefixes: &[String],
) -> Result<String, Problem> {
    let forbid = || Problem::caa(format!("CAA record for {fqdn} prevents issuance"));

    // An unrecognized property with the critical flag forbids outright.
    let unknown_critical = records.iter().any(|record| {
        record.critical()
            && !KNOWN_TAGS
                .iter()
                .any(|tag| record.tag.eq_ignore_ascii_case(tag))
    });
    if unknown_critical {
        return Err(forbid());
    }

    // Wildcards prefer issuewild when any is present; everything else uses
    // issue.
    let has_issuewild = records
        .iter()
        .any(|record| record.tag.eq_ignore_ascii_case("issuewild"));
    let relevant_tag = if wildcard && has_issuewild {
        "issuewild"
    } else {
        "issue"
    };

    let relevant: Vec<&CaaRecord> = records
        .iter()
        .filter(|record| record.tag.eq_ignore_ascii_case(relevant_tag))
        .collect();
    if relevant.is_empty() {
        return Err(forbid());
    }

    for record in relevant {
        let Some(issue) = parse_issue_value(&record.value) else {
            continue;
        };
        if issue.identity.is_empty() {
            // A value of ";" authorizes nobody.
            continue;
        }
        if !ca_identities
            .iter()
            .any(|identity| identity.eq_ignore_ascii_case(&issue.identity))
        {
            continue;
        }
        if let Some(uri) = issue.param("accounturi") {
            let matches = account_uri_prefixes
                .iter()
                .any(|prefix| format!("{prefix}{reg_id}") == uri);
            if !matches {
                continue;
            }
        }
        if let Some(methods) = issue.param("validationmethods") {
            let allowed = methods
                .split(',')
                .map(str::trim)
                .any(|method| method == challenge_type);
            if !allowed {
                continue;
            }
        }
        return Ok(issue.identity);
    }

    Err(forbid())
}

struct IssueValue {
    identity: String,
    params: Vec<(String, String)>,
}

impl IssueValue {
    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse `"<identity>; k1=v1; k2=v2"`. A malformed parameter makes the whole
/// record unusable for authorization.
fn parse_issue_value(raw: &str) -> Option<IssueValue> {
    let mut parts = raw.split(';');
    let identity = parts.next()?.trim().to_string();

    let mut params = Vec::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, value) = part.split_once('=')?;
        params.push((key.trim().to_ascii_lowercase(), value.trim().to_string()));
    }

    Some(IssueValue { identity, params })
}
