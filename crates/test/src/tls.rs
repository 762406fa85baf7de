use std::net::IpAddr;

use async_trait::async_trait;

use verdite_va::net::{AcmeIdentifier, PeerCertificate, TlsDialer, TlsError, TlsHandshake};

use crate::alpn_digest;

/// How the scripted dialer completes a handshake.
#[derive(Clone, Debug)]
pub enum TlsBehavior {
    /// A conforming challenge certificate for whatever SNI is requested.
    Passing,
    /// Handshake completes but no ALPN protocol is negotiated.
    NoAlpn,
    /// Conforming certificate carrying the digest of the wrong key
    /// authorization.
    WrongDigest,
    /// The handshake fails.
    Error(TlsError),
}

/// A scripted [`TlsDialer`].
pub struct MockTlsDialer {
    key_authorization: String,
    behavior: TlsBehavior,
}

impl MockTlsDialer {
    pub fn new(key_authorization: &str, behavior: TlsBehavior) -> Self {
        Self {
            key_authorization: key_authorization.to_string(),
            behavior,
        }
    }

    pub fn passing(key_authorization: &str) -> Self {
        Self::new(key_authorization, TlsBehavior::Passing)
    }

    fn challenge_certificate(&self, sni: &str, key_authorization: &str) -> PeerCertificate {
        PeerCertificate {
            subject: format!("CN={sni}"),
            self_signed: true,
            san_dns_names: vec![sni.to_string()],
            acme_identifier: Some(AcmeIdentifier {
                critical: true,
                digest: alpn_digest(key_authorization),
            }),
        }
    }
}

#[async_trait]
impl TlsDialer for MockTlsDialer {
    async fn dial(
        &self,
        _address: IpAddr,
        _port: u16,
        sni: &str,
        alpn: &[String],
    ) -> Result<TlsHandshake, TlsError> {
        match &self.behavior {
            TlsBehavior::Passing => Ok(TlsHandshake {
                alpn: alpn.first().cloned(),
                peer_chain: vec![self.challenge_certificate(sni, &self.key_authorization)],
            }),
            TlsBehavior::NoAlpn => Ok(TlsHandshake {
                alpn: None,
                peer_chain: vec![self.challenge_certificate(sni, &self.key_authorization)],
            }),
            TlsBehavior::WrongDigest => Ok(TlsHandshake {
                alpn: alpn.first().cloned(),
                peer_chain: vec![self.challenge_certificate(sni, "not-the-key-authorization")],
            }),
            TlsBehavior::Error(error) => Err(error.clone()),
        }
    }
}
