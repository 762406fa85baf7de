use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use verdite_core_types::{CheckCaaRequest, CheckCaaResult, Rir, ValidationRequest, ValidationResult};
use verdite_va::clients::{CaaClient, RemoteClients, RemoteVa, RpcError, ValidationClient};
use verdite_va::ValidationAuthority;

use crate::fixtures::remote_test_va;
use crate::{MockFetcher, MockResolver, MockTlsDialer, TlsBehavior};

/// Forwards remote RPCs straight to a local VA, letting an in-memory
/// instance stand in for a remote perspective.
pub struct InMemoryRemote {
    va: Arc<ValidationAuthority>,
}

impl InMemoryRemote {
    pub fn new(va: Arc<ValidationAuthority>) -> Self {
        Self { va }
    }
}

#[async_trait]
impl ValidationClient for InMemoryRemote {
    async fn validate_challenge(
        &self,
        req: ValidationRequest,
    ) -> Result<ValidationResult, RpcError> {
        self.va
            .validate_challenge(&req)
            .await
            .map_err(|err| RpcError::Transport(err.to_string()))
    }
}

#[async_trait]
impl CaaClient for InMemoryRemote {
    async fn check_caa(&self, req: CheckCaaRequest) -> Result<CheckCaaResult, RpcError> {
        self.va
            .check_caa(&req)
            .await
            .map_err(|err| RpcError::Transport(err.to_string()))
    }
}

/// Every RPC fails with a transport error.
pub struct BrokenRemote;

#[async_trait]
impl ValidationClient for BrokenRemote {
    async fn validate_challenge(
        &self,
        _req: ValidationRequest,
    ) -> Result<ValidationResult, RpcError> {
        Err(RpcError::Transport("remote VA is broken".to_string()))
    }
}

#[async_trait]
impl CaaClient for BrokenRemote {
    async fn check_caa(&self, _req: CheckCaaRequest) -> Result<CheckCaaResult, RpcError> {
        Err(RpcError::Transport("remote VA is broken".to_string()))
    }
}

/// Every RPC reports cancellation.
pub struct CanceledRemote;

#[async_trait]
impl ValidationClient for CanceledRemote {
    async fn validate_challenge(
        &self,
        _req: ValidationRequest,
    ) -> Result<ValidationResult, RpcError> {
        Err(RpcError::Canceled)
    }
}

#[async_trait]
impl CaaClient for CanceledRemote {
    async fn check_caa(&self, _req: CheckCaaRequest) -> Result<CheckCaaResult, RpcError> {
        Err(RpcError::Canceled)
    }
}

/// Delays before forwarding to the wrapped client.
pub struct SlowRemote<C> {
    inner: C,
    delay: Duration,
}

impl<C> SlowRemote<C> {
    pub fn new(inner: C, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<C: ValidationClient> ValidationClient for SlowRemote<C> {
    async fn validate_challenge(
        &self,
        req: ValidationRequest,
    ) -> Result<ValidationResult, RpcError> {
        tokio::time::sleep(self.delay).await;
        self.inner.validate_challenge(req).await
    }
}

#[async_trait]
impl<C: CaaClient> CaaClient for SlowRemote<C> {
    async fn check_caa(&self, req: CheckCaaRequest) -> Result<CheckCaaResult, RpcError> {
        tokio::time::sleep(self.delay).await;
        self.inner.check_caa(req).await
    }
}

/// Wrap a local VA as a remote perspective.
pub fn in_memory_remote(label: &str, rir: Rir, va: Arc<ValidationAuthority>) -> RemoteVa {
    let client = Arc::new(InMemoryRemote::new(va));
    RemoteVa::new(
        label,
        rir,
        RemoteClients {
            validate: client.clone(),
            check_caa: client,
        },
    )
}

/// A remote perspective that passes every standard check.
pub fn passing_remote(label: &str, rir: Rir) -> RemoteVa {
    let ka = crate::key_authorization();
    let va = remote_test_va(
        label,
        rir,
        MockResolver::standard(&ka),
        MockFetcher::passing(&ka),
        MockTlsDialer::passing(&ka),
    );
    in_memory_remote(label, rir, va)
}

/// A remote perspective whose challenge checks come back `unauthorized`.
pub fn failing_remote(label: &str, rir: Rir) -> RemoteVa {
    let ka = crate::key_authorization();
    let va = remote_test_va(
        label,
        rir,
        MockResolver::unauthorized(),
        MockFetcher::failing(&ka),
        MockTlsDialer::new(&ka, TlsBehavior::WrongDigest),
    );
    in_memory_remote(label, rir, va)
}

/// A remote perspective whose CAA lookups fail with SERVFAIL.
pub fn caa_broken_remote(label: &str, rir: Rir) -> RemoteVa {
    let ka = crate::key_authorization();
    let va = remote_test_va(
        label,
        rir,
        MockResolver::broken(&ka),
        MockFetcher::passing(&ka),
        MockTlsDialer::passing(&ka),
    );
    in_memory_remote(label, rir, va)
}

/// A remote perspective whose resolver sees hijacked CAA for `present.com`.
pub fn caa_hijacked_remote(label: &str, rir: Rir) -> RemoteVa {
    let ka = crate::key_authorization();
    let va = remote_test_va(
        label,
        rir,
        MockResolver::hijacked(&ka),
        MockFetcher::passing(&ka),
        MockTlsDialer::passing(&ka),
    );
    in_memory_remote(label, rir, va)
}

/// A remote perspective with a broken RPC transport.
pub fn broken_remote(label: &str, rir: Rir) -> RemoteVa {
    let client = Arc::new(BrokenRemote);
    RemoteVa::new(
        label,
        rir,
        RemoteClients {
            validate: client.clone(),
            check_caa: client,
        },
    )
}

/// A remote perspective whose RPCs come back cancelled.
pub fn canceled_remote(label: &str, rir: Rir) -> RemoteVa {
    let client = Arc::new(CanceledRemote);
    RemoteVa::new(
        label,
        rir,
        RemoteClients {
            validate: client.clone(),
            check_caa: client,
        },
    )
}

/// A passing remote perspective that answers only after `delay`.
pub fn slow_remote(label: &str, rir: Rir, delay: Duration) -> RemoteVa {
    let ka = crate::key_authorization();
    let va = remote_test_va(
        label,
        rir,
        MockResolver::standard(&ka),
        MockFetcher::passing(&ka),
        MockTlsDialer::passing(&ka),
    );
    let client = Arc::new(SlowRemote::new(InMemoryRemote::new(va), delay));
    RemoteVa::new(
        label,
        rir,
        RemoteClients {
            validate: client.clone(),
            check_caa: client,
        },
    )
}
