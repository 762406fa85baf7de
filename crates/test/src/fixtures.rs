use std::sync::Arc;

use verdite_core_types::{CheckCaaRequest, Identifier, Rir, ValidationRequest, WireChallenge};
use verdite_va::audit::AuditLog;
use verdite_va::clients::RemoteVa;
use verdite_va::config::VaConfig;
use verdite_va::metrics::{Metrics, ValidationLabels};
use verdite_va::net::{Fetcher, Resolver, TlsDialer};
use verdite_va::{Collaborators, ValidationAuthority};

use crate::{key_authorization, MockAuditLog, PermissivePolicy, ACCOUNT_URI_PREFIX, CA_IDENTITY, TOKEN};

/// A VA under test plus the audit sink it writes to.
pub struct TestVa {
    pub va: Arc<ValidationAuthority>,
    pub audit: Arc<MockAuditLog>,
}

/// Configuration used by test VAs: standard ports, the test CA identity,
/// and the test account-URI prefix.
pub fn test_config(perspective: &str, rir: Rir) -> VaConfig {
    VaConfig {
        user_agent: format!("{perspective} test agent"),
        ca_identities: vec![CA_IDENTITY.to_string()],
        account_uri_prefixes: vec![ACCOUNT_URI_PREFIX.to_string()],
        http_port: 80,
        tls_port: 443,
        perspective: perspective.to_string(),
        rir,
        attempt_timeout_ms: 10_000,
    }
}

/// Assemble a VA with the given collaborators and remotes, capturing audit
/// output in a [`MockAuditLog`].
pub fn build_va(
    perspective: &str,
    rir: Rir,
    resolver: Arc<dyn Resolver>,
    fetcher: Arc<dyn Fetcher>,
    tls_dialer: Arc<dyn TlsDialer>,
    remotes: Vec<RemoteVa>,
) -> TestVa {
    let audit = Arc::new(MockAuditLog::default());
    let audit_sink: Arc<dyn AuditLog> = audit.clone();
    let collaborators = Collaborators {
        resolver,
        fetcher,
        tls_dialer,
        policy: Arc::new(PermissivePolicy::new()),
        audit: audit_sink,
        metrics: Metrics::new(),
    };

    let va = ValidationAuthority::new(test_config(perspective, rir), collaborators, remotes)
        .expect("test config is valid");

    TestVa {
        va: Arc::new(va),
        audit,
    }
}

/// A standalone VA acting as a remote perspective; its audit output is
/// discarded.
pub fn remote_test_va(
    label: &str,
    rir: Rir,
    resolver: crate::MockResolver,
    fetcher: crate::MockFetcher,
    tls_dialer: crate::MockTlsDialer,
) -> Arc<ValidationAuthority> {
    build_va(
        label,
        rir,
        Arc::new(resolver),
        Arc::new(fetcher),
        Arc::new(tls_dialer),
        Vec::new(),
    )
    .va
}

/// A `ValidateChallenge` request carrying the standard test token.
pub fn validation_request(identifier: &str, challenge_type: &str) -> ValidationRequest {
    ValidationRequest {
        identifier: Identifier::dns(identifier),
        challenge: WireChallenge::new(challenge_type, TOKEN),
        reg_id: 1,
        authz_id: "1".to_string(),
        key_authorization: key_authorization(),
    }
}

/// A `CheckCAA` request for the standard test account.
pub fn caa_request(identifier: &str, challenge_type: &str, is_recheck: bool) -> CheckCaaRequest {
    CheckCaaRequest {
        identifier: Identifier::dns(identifier),
        challenge_type: challenge_type.to_string(),
        reg_id: 1,
        authz_id: "1".to_string(),
        is_recheck,
    }
}

/// Shorthand for a full metric label set.
pub fn labels(
    operation: &str,
    perspective: &str,
    challenge_type: &str,
    problem_type: &str,
    result: &str,
) -> ValidationLabels {
    ValidationLabels {
        operation: operation.to_string(),
        perspective: perspective.to_string(),
        challenge_type: challenge_type.to_string(),
        problem_type: problem_type.to_string(),
        result: result.to_string(),
    }
}

/// The number of observations recorded for one label set, read back through
/// the Prometheus text exposition format.
pub fn metric_count(metrics: &Metrics, labels: &ValidationLabels) -> u64 {
    let exposition = metrics
        .exposition()
        .expect("String formatting does not fail");

    let needle = format!(
        "validation_latency_count{{operation=\"{}\",perspective=\"{}\",challenge_type=\"{}\",problem_type=\"{}\",result=\"{}\"}}",
        labels.operation, labels.perspective, labels.challenge_type, labels.problem_type, labels.result
    );

    exposition
        .lines()
        .find_map(|line| line.strip_prefix(needle.as_str()))
        .and_then(|rest| rest.trim().parse().ok())
        .unwrap_or(0)
}
