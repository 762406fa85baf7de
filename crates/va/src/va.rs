use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use verdite_core_types::{
    ChallengeStatus, CheckCaaRequest, CheckCaaResult, Rir, ValidationRequest, ValidationResult,
};

use crate::audit::{
    self, AuditChallenge, AuditLog, CaaAuditRecord, ChallengeAuditRecord, DifferentialFailure,
    DifferentialRecord,
};
use crate::clients::RemoteVa;
use crate::config::{ConfigError, VaConfig};
use crate::metrics::Metrics;
use crate::mpic::{Corroboration, Operation, RemoteFailure, RemoteRequest};
use crate::net::{Fetcher, Resolver, TlsDialer};
use crate::policy::DomainPolicy;

/// The collaborators a VA consumes. All of them are shared, immutable after
/// startup, and safe for concurrent use.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn Resolver>,
    pub fetcher: Arc<dyn Fetcher>,
    pub tls_dialer: Arc<dyn TlsDialer>,
    pub policy: Arc<dyn DomainPolicy>,
    pub audit: Arc<dyn AuditLog>,
    pub metrics: Metrics,
}

/// A request was malformed enough that no validation was attempted. Every
/// validation-level failure travels inside the result's problem instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request identifier is empty")]
    MissingIdentifier,
    #[error("challenge token is empty")]
    MissingToken,
    #[error("key authorization is empty")]
    MissingKeyAuthorization,
    #[error("registration ID must be positive, got {0}")]
    InvalidRegId(i64),
}

/// One perspective of the validation authority.
///
/// An instance is long-lived and holds no per-request state; requests and
/// results are scoped to a single call.
pub struct ValidationAuthority {
    pub(crate) resolver: Arc<dyn Resolver>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) tls_dialer: Arc<dyn TlsDialer>,
    pub(crate) policy: Arc<dyn DomainPolicy>,
    pub(crate) audit: Arc<dyn AuditLog>,
    pub(crate) metrics: Metrics,
    pub(crate) remotes: Vec<RemoteVa>,
    pub(crate) user_agent: String,
    pub(crate) ca_identities: Vec<String>,
    pub(crate) account_uri_prefixes: Vec<String>,
    pub(crate) http_port: u16,
    pub(crate) tls_port: u16,
    pub(crate) perspective: String,
    pub(crate) rir: Rir,
    pub(crate) attempt_timeout: Duration,
}

impl ValidationAuthority {
    pub fn new(
        config: VaConfig,
        collaborators: Collaborators,
        remotes: Vec<RemoteVa>,
    ) -> Result<Self, ConfigError> {
        if config.ca_identities.is_empty() {
            return Err(ConfigError::NoCaIdentities);
        }
        if config.account_uri_prefixes.is_empty() {
            return Err(ConfigError::NoAccountUriPrefixes);
        }

        let attempt_timeout = config.attempt_timeout();

        Ok(Self {
            resolver: collaborators.resolver,
            fetcher: collaborators.fetcher,
            tls_dialer: collaborators.tls_dialer,
            policy: collaborators.policy,
            audit: collaborators.audit,
            metrics: collaborators.metrics,
            remotes,
            user_agent: config.user_agent,
            ca_identities: config.ca_identities,
            account_uri_prefixes: config.account_uri_prefixes,
            http_port: config.http_port,
            tls_port: config.tls_port,
            attempt_timeout,
            perspective: config.perspective,
            rir: config.rir,
        })
    }

    pub fn perspective(&self) -> &str {
        &self.perspective
    }

    pub fn rir(&self) -> Rir {
        self.rir
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Validate one challenge: perform it locally, and when the primary
    /// passes, corroborate the result from every remote perspective.
    pub async fn validate_challenge(
        &self,
        req: &ValidationRequest,
    ) -> Result<ValidationResult, RequestError> {
        let started = Instant::now();

        if let Err(err) = check_validation_request(req) {
            self.observe_rejected_request(Operation::Challenge, &req.challenge.kind, started);
            return Err(err);
        }

        debug!(
            identifier = %req.identifier,
            challenge_type = %req.challenge.kind,
            "validating challenge"
        );

        let (records, primary_problem) = self
            .perform_challenge(
                &req.challenge.kind,
                &req.challenge.token,
                &req.identifier,
                &req.key_authorization,
            )
            .await;

        let (problem, summary) = match primary_problem {
            Some(problem) => (Some(problem), None),
            None if self.remotes.is_empty() => (None, None),
            None => {
                let corroboration = self
                    .corroborate(Operation::Challenge, RemoteRequest::Validate(req.clone()))
                    .await;
                self.audit_differentials(
                    req.identifier.value(),
                    req.reg_id,
                    &req.challenge.kind,
                    &corroboration,
                );
                let Corroboration {
                    problem, summary, ..
                } = corroboration;
                (problem, Some(summary))
            }
        };

        let status = if problem.is_none() {
            ChallengeStatus::Valid
        } else {
            ChallengeStatus::Invalid
        };
        let latency = started.elapsed();

        audit::emit(
            self.audit.as_ref(),
            Operation::Challenge.audit_prefix(),
            &ChallengeAuditRecord {
                identifier: req.identifier.value(),
                account_id: req.reg_id,
                challenge_type: &req.challenge.kind,
                operation: Operation::Challenge.metric_label(),
                perspective: &self.perspective,
                challenge: AuditChallenge {
                    kind: &req.challenge.kind,
                    status,
                    validation_record: &records,
                },
                problem: problem.as_ref(),
                mpic_summary: summary.as_ref(),
                latency_ms: latency.as_millis(),
            },
        );

        self.metrics.observe(
            Operation::Challenge.metric_label(),
            &self.perspective,
            &req.challenge.kind,
            problem.as_ref().map(|p| p.kind),
            latency,
        );

        Ok(ValidationResult {
            records,
            problem,
            perspective: self.perspective.clone(),
            rir: self.rir,
        })
    }

    /// Check CAA authorization for one identifier, corroborated the same way
    /// as challenge validation. A recheck differs only in audit metadata.
    pub async fn check_caa(&self, req: &CheckCaaRequest) -> Result<CheckCaaResult, RequestError> {
        let started = Instant::now();

        if let Err(err) = check_caa_request(req) {
            self.observe_rejected_request(Operation::Caa, &req.challenge_type, started);
            return Err(err);
        }

        debug!(
            identifier = %req.identifier,
            is_recheck = req.is_recheck,
            "checking CAA authorization"
        );

        let primary_problem = self
            .check_caa_records(&req.identifier, &req.challenge_type, req.reg_id)
            .await;

        let (problem, summary) = match primary_problem {
            Some(problem) => (Some(problem), None),
            None if self.remotes.is_empty() => (None, None),
            None => {
                let corroboration = self
                    .corroborate(Operation::Caa, RemoteRequest::Caa(req.clone()))
                    .await;
                self.audit_differentials(
                    req.identifier.value(),
                    req.reg_id,
                    &req.challenge_type,
                    &corroboration,
                );
                let Corroboration {
                    problem, summary, ..
                } = corroboration;
                (problem, Some(summary))
            }
        };

        let latency = started.elapsed();

        audit::emit(
            self.audit.as_ref(),
            Operation::Caa.audit_prefix(),
            &CaaAuditRecord {
                identifier: req.identifier.value(),
                account_id: req.reg_id,
                challenge_type: &req.challenge_type,
                operation: Operation::Caa.metric_label(),
                perspective: &self.perspective,
                is_recheck: req.is_recheck,
                problem: problem.as_ref(),
                mpic_summary: summary.as_ref(),
                latency_ms: latency.as_millis(),
            },
        );

        self.metrics.observe(
            Operation::Caa.metric_label(),
            &self.perspective,
            &req.challenge_type,
            problem.as_ref().map(|p| p.kind),
            latency,
        );

        Ok(CheckCaaResult {
            problem,
            perspective: self.perspective.clone(),
            rir: self.rir,
        })
    }

    fn audit_differentials(
        &self,
        identifier: &str,
        account_id: i64,
        challenge_type: &str,
        corroboration: &Corroboration,
    ) {
        if corroboration.failures.is_empty() {
            return;
        }

        let remote_failures: Vec<DifferentialFailure<'_>> = corroboration
            .failures
            .iter()
            .map(|failure: &RemoteFailure| DifferentialFailure {
                perspective: &failure.perspective,
                rir: failure.rir,
                problem: &failure.problem,
                transport_cause: failure.transport_cause.as_deref(),
            })
            .collect();

        audit::emit(
            self.audit.as_ref(),
            audit::DIFFERENTIAL_PREFIX,
            &DifferentialRecord {
                identifier,
                account_id,
                challenge_type,
                remote_successes: corroboration.successes,
                remote_failures,
            },
        );
    }

    fn observe_rejected_request(
        &self,
        operation: Operation,
        challenge_type: &str,
        started: Instant,
    ) {
        self.metrics.observe(
            operation.metric_label(),
            &self.perspective,
            challenge_type,
            Some(verdite_core_types::ProblemKind::ServerInternal),
            started.elapsed(),
        );
    }
}

fn check_validation_request(req: &ValidationRequest) -> Result<(), RequestError> {
    if req.identifier.value().is_empty() {
        return Err(RequestError::MissingIdentifier);
    }
    if req.challenge.token.is_empty() {
        return Err(RequestError::MissingToken);
    }
    if req.key_authorization.is_empty() {
        return Err(RequestError::MissingKeyAuthorization);
    }
    if req.reg_id <= 0 {
        return Err(RequestError::InvalidRegId(req.reg_id));
    }
    Ok(())
}

fn check_caa_request(req: &CheckCaaRequest) -> Result<(), RequestError> {
    if req.identifier.value().is_empty() {
        return Err(RequestError::MissingIdentifier);
    }
    if req.reg_id <= 0 {
        return Err(RequestError::InvalidRegId(req.reg_id));
    }
    Ok(())
}
