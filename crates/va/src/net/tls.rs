use std::net::IpAddr;

use async_trait::async_trait;
use displaydoc::Display;

/// TLS handshakes used by the TLS-ALPN-01 performer.
#[async_trait]
pub trait TlsDialer: Send + Sync {
    async fn dial(
        &self,
        address: IpAddr,
        port: u16,
        sni: &str,
        alpn: &[String],
    ) -> Result<TlsHandshake, TlsError>;
}

/// Evidence from a completed TLS handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsHandshake {
    /// The ALPN protocol the server negotiated, if any.
    pub alpn: Option<String>,
    /// The peer chain as presented, leaf first.
    pub peer_chain: Vec<PeerCertificate>,
}

/// A parsed summary of one peer certificate. DER parsing happens inside the
/// dialer; the performer only applies challenge policy to these fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerCertificate {
    pub subject: String,
    pub self_signed: bool,
    /// dNSName entries from the subjectAltName extension.
    pub san_dns_names: Vec<String>,
    /// The `id-pe-acmeIdentifier` extension, when present.
    pub acme_identifier: Option<AcmeIdentifier>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcmeIdentifier {
    pub critical: bool,
    /// The SHA-256 digest carried in the extension's OCTET STRING.
    pub digest: Vec<u8>,
}

/// TLS dial failures.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum TlsError {
    /// Connection refused
    ConnectionRefused,
    /// Connection reset by peer
    ConnectionReset,
    /// Timeout after handshake
    Timeout,
    /// {0}
    Handshake(String),
}

impl std::error::Error for TlsError {}
