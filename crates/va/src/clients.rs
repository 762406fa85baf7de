use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use verdite_core_types::{CheckCaaRequest, CheckCaaResult, Rir, ValidationRequest, ValidationResult};

/// Capability to ask a remote perspective to validate a challenge.
#[async_trait]
pub trait ValidationClient: Send + Sync {
    async fn validate_challenge(&self, req: ValidationRequest)
        -> Result<ValidationResult, RpcError>;
}

/// Capability to ask a remote perspective to check CAA.
#[async_trait]
pub trait CaaClient: Send + Sync {
    async fn check_caa(&self, req: CheckCaaRequest) -> Result<CheckCaaResult, RpcError>;
}

/// Transport-level failure of a remote perspective RPC. Cancellation is
/// distinguishable from every other failure; the coordinator surfaces the
/// two differently.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The RPC was cancelled before it completed.
    #[error("RPC canceled")]
    Canceled,
    /// The transport failed or the backend was unreachable.
    #[error("{0}")]
    Transport(String),
}

/// The capability set held for one remote perspective.
#[derive(Clone)]
pub struct RemoteClients {
    pub validate: Arc<dyn ValidationClient>,
    pub check_caa: Arc<dyn CaaClient>,
}

/// A configured remote perspective: a label, the RIR region it is deployed
/// in, and its RPC clients. The set is immutable for the lifetime of a VA.
#[derive(Clone)]
pub struct RemoteVa {
    pub label: String,
    pub rir: Rir,
    pub clients: RemoteClients,
}

impl RemoteVa {
    pub fn new(label: impl Into<String>, rir: Rir, clients: RemoteClients) -> Self {
        Self {
            label: label.into(),
            rir,
            clients,
        }
    }
}
