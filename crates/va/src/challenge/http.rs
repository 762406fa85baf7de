use std::net::IpAddr;

use tokio::time::timeout;
use url::{Host, Url};

use verdite_core_types::{Problem, ValidationRecord};

use crate::errors;
use crate::net::{FetchError, FetchRequest, FetchResponse};
use crate::va::ValidationAuthority;

const WELL_KNOWN_PATH: &str = "/.well-known/acme-challenge/";
const MAX_REDIRECTS: usize = 10;

impl ValidationAuthority {
    /// HTTP-01: fetch the well-known challenge path over HTTP, following
    /// redirects under the challenge redirect policy, and compare the
    /// trimmed body to the expected key authorization byte for byte.
    pub(crate) async fn perform_http01(
        &self,
        hostname: &str,
        token: &str,
        key_authorization: &str,
    ) -> (Vec<ValidationRecord>, Option<Problem>) {
        let mut records = Vec::new();

        let mut url = match challenge_url(hostname, self.http_port, token) {
            Ok(url) => url,
            Err(problem) => return (records, Some(problem)),
        };

        for _ in 0..=MAX_REDIRECTS {
            let (host_label, addresses) = match self.target_addresses(&url).await {
                Ok(target) => target,
                Err(problem) => {
                    let label = url.host_str().unwrap_or(hostname).to_string();
                    records.push(self.http_record(&url, &label, Vec::new(), None));
                    return (records, Some(problem));
                }
            };

            let mut response: Option<FetchResponse> = None;
            let mut last_problem: Option<Problem> = None;
            let mut address_used = None;
            for address in &addresses {
                address_used = Some(*address);
                match self.fetch_once(&url, &host_label, *address).await {
                    Ok(resp) => {
                        response = Some(resp);
                        break;
                    }
                    Err(problem) => last_problem = Some(problem),
                }
            }
            records.push(self.http_record(&url, &host_label, addresses, address_used));

            let Some(response) = response else {
                let problem = last_problem
                    .unwrap_or_else(|| Problem::connection("No usable addresses to connect to"));
                return (records, Some(problem));
            };

            if (300..400).contains(&response.status) {
                match self.redirect_target(&url, response.location.as_deref()) {
                    Ok(next) => {
                        url = next;
                        continue;
                    }
                    Err(problem) => return (records, Some(problem)),
                }
            }

            if response.status != 200 {
                return (
                    records,
                    Some(Problem::unauthorized(format!(
                        "Invalid response from {url}: {}",
                        response.status
                    ))),
                );
            }

            let body = String::from_utf8_lossy(&response.body);
            let payload = body.trim_end();
            if payload.as_bytes() == key_authorization.as_bytes() {
                return (records, None);
            }

            return (
                records,
                Some(Problem::unauthorized(format!(
                    "The key authorization file from the server did not match this challenge. \
                     Expected {key_authorization:?} (got {payload:?})"
                ))),
            );
        }

        (records, Some(Problem::connection("Too many redirects")))
    }

    async fn target_addresses(&self, url: &Url) -> Result<(String, Vec<IpAddr>), Problem> {
        match url.host() {
            Some(Host::Domain(domain)) => {
                let addresses = self.resolve_ordered(domain).await?;
                Ok((domain.to_string(), addresses))
            }
            Some(Host::Ipv4(ip)) => Ok((ip.to_string(), vec![IpAddr::V4(ip)])),
            Some(Host::Ipv6(ip)) => Ok((ip.to_string(), vec![IpAddr::V6(ip)])),
            None => Err(Problem::malformed(format!("URL {url} has no host"))),
        }
    }

    async fn fetch_once(
        &self,
        url: &Url,
        host: &str,
        address: IpAddr,
    ) -> Result<FetchResponse, Problem> {
        let request = FetchRequest {
            url: url.clone(),
            host: host.to_string(),
            address,
            user_agent: self.user_agent.clone(),
        };

        match timeout(self.attempt_timeout, self.fetcher.get(request)).await {
            Err(_) => Err(errors::fetch_problem(&FetchError::Timeout)),
            Ok(Err(err)) => Err(errors::fetch_problem(&err)),
            Ok(Ok(response)) => Ok(response),
        }
    }

    fn http_record(
        &self,
        url: &Url,
        hostname: &str,
        addresses_resolved: Vec<IpAddr>,
        address_used: Option<IpAddr>,
    ) -> ValidationRecord {
        let mut record = ValidationRecord::new(hostname, &self.perspective, self.rir);
        record.port = url.port_or_known_default();
        record.addresses_resolved = addresses_resolved;
        record.address_used = address_used;
        record.url = Some(url.to_string());
        record.resolver_type = self.resolver.resolver_type().to_string();
        record
    }

    /// Vet a redirect target under the challenge redirect policy: HTTP or
    /// HTTPS only, default challenge ports only, and the target must be a
    /// policy-valid public hostname or a public-address literal.
    fn redirect_target(&self, base: &Url, location: Option<&str>) -> Result<Url, Problem> {
        let Some(location) = location else {
            return Err(Problem::connection("Redirect response missing Location header"));
        };

        let next = base.join(location).map_err(|_| {
            Problem::connection(format!("Invalid Location header in redirect: {location:?}"))
        })?;

        match next.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Problem::connection(format!(
                    "Invalid protocol scheme in redirect target: {other:?}"
                )));
            }
        }

        if let Some(port) = next.port() {
            if port != self.http_port && port != self.tls_port {
                return Err(Problem::connection(format!(
                    "Invalid port in redirect target: {port}"
                )));
            }
        }

        match next.host() {
            Some(Host::Domain(domain)) => {
                if let Err(err) = self.policy.valid_domain(domain) {
                    return Err(Problem::connection(format!(
                        "Invalid hostname in redirect target: {err}"
                    )));
                }
            }
            Some(Host::Ipv4(ip)) => {
                if !ipv4_is_public(ip) {
                    return Err(Problem::connection(
                        "Redirect target resolves to a non-public address",
                    ));
                }
            }
            Some(Host::Ipv6(ip)) => {
                if !ipv6_is_public(ip) {
                    return Err(Problem::connection(
                        "Redirect target resolves to a non-public address",
                    ));
                }
            }
            None => {
                return Err(Problem::connection("Redirect target has no host"));
            }
        }

        Ok(next)
    }
}

fn challenge_url(hostname: &str, port: u16, token: &str) -> Result<Url, Problem> {
    let raw = if port == 80 {
        format!("http://{hostname}{WELL_KNOWN_PATH}{token}")
    } else {
        format!("http://{hostname}:{port}{WELL_KNOWN_PATH}{token}")
    };

    Url::parse(&raw)
        .map_err(|_| Problem::malformed(format!("Could not construct challenge URL for {hostname}")))
}

fn ipv4_is_public(ip: std::net::Ipv4Addr) -> bool {
    !(ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast())
}

fn ipv6_is_public(ip: std::net::Ipv6Addr) -> bool {
    // Reject loopback, unspecified, unique-local (fc00::/7), and link-local
    // (fe80::/10) targets.
    let segments = ip.segments();
    !(ip.is_loopback()
        || ip.is_unspecified()
        || (segments[0] & 0xfe00) == 0xfc00
        || (segments[0] & 0xffc0) == 0xfe80)
}
