use thiserror::Error;

/// Syntactic domain policy, consulted before performing a check and when
/// vetting HTTP-01 redirect targets. The actual policy engine lives outside
/// the core.
pub trait DomainPolicy: Send + Sync {
    fn valid_domain(&self, name: &str) -> Result<(), PolicyError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct PolicyError {
    pub reason: String,
}

impl PolicyError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
