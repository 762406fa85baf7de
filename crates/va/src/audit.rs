//! Structured audit records.
//!
//! Each top-level operation emits exactly one result record, and one
//! differential record whenever at least one consulted remote disagreed with
//! the primary. Records are JSON payloads on a single `INFO` line so an
//! external shipper can pick them up; the logger itself is an interface.

use serde::Serialize;
use tracing::{error, info};

use verdite_core_types::{ChallengeStatus, MpicSummary, Problem, Rir, ValidationRecord};

pub const CHALLENGE_RESULT_PREFIX: &str = "Challenge validation result";
pub const CAA_RESULT_PREFIX: &str = "CAA check result";
pub const DIFFERENTIAL_PREFIX: &str = "remoteVADifferentials";

/// Destination for audit lines. Production uses [`TracingAuditLog`]; tests
/// substitute an in-memory sink.
pub trait AuditLog: Send + Sync {
    fn log(&self, line: &str);
}

/// Emits audit lines on the `tracing` logger at `INFO`.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn log(&self, line: &str) {
        info!("{line}");
    }
}

#[derive(Serialize)]
pub(crate) struct ChallengeAuditRecord<'a> {
    #[serde(rename = "Identifier")]
    pub identifier: &'a str,
    #[serde(rename = "AccountID")]
    pub account_id: i64,
    #[serde(rename = "ChallengeType")]
    pub challenge_type: &'a str,
    #[serde(rename = "Operation")]
    pub operation: &'a str,
    #[serde(rename = "Perspective")]
    pub perspective: &'a str,
    #[serde(rename = "Challenge")]
    pub challenge: AuditChallenge<'a>,
    #[serde(rename = "Problem", skip_serializing_if = "Option::is_none")]
    pub problem: Option<&'a Problem>,
    #[serde(rename = "MPICSummary", skip_serializing_if = "Option::is_none")]
    pub mpic_summary: Option<&'a MpicSummary>,
    #[serde(rename = "Latency_ms")]
    pub latency_ms: u128,
}

#[derive(Serialize)]
pub(crate) struct AuditChallenge<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub status: ChallengeStatus,
    pub validation_record: &'a [ValidationRecord],
}

#[derive(Serialize)]
pub(crate) struct CaaAuditRecord<'a> {
    #[serde(rename = "Identifier")]
    pub identifier: &'a str,
    #[serde(rename = "AccountID")]
    pub account_id: i64,
    #[serde(rename = "ChallengeType")]
    pub challenge_type: &'a str,
    #[serde(rename = "Operation")]
    pub operation: &'a str,
    #[serde(rename = "Perspective")]
    pub perspective: &'a str,
    #[serde(rename = "IsRecheck")]
    pub is_recheck: bool,
    #[serde(rename = "Problem", skip_serializing_if = "Option::is_none")]
    pub problem: Option<&'a Problem>,
    #[serde(rename = "MPICSummary", skip_serializing_if = "Option::is_none")]
    pub mpic_summary: Option<&'a MpicSummary>,
    #[serde(rename = "Latency_ms")]
    pub latency_ms: u128,
}

#[derive(Serialize)]
pub(crate) struct DifferentialRecord<'a> {
    #[serde(rename = "Identifier")]
    pub identifier: &'a str,
    #[serde(rename = "AccountID")]
    pub account_id: i64,
    #[serde(rename = "ChallengeType")]
    pub challenge_type: &'a str,
    #[serde(rename = "RemoteSuccesses")]
    pub remote_successes: usize,
    #[serde(rename = "RemoteFailures")]
    pub remote_failures: Vec<DifferentialFailure<'a>>,
}

#[derive(Serialize)]
pub(crate) struct DifferentialFailure<'a> {
    #[serde(rename = "Perspective")]
    pub perspective: &'a str,
    #[serde(rename = "RIR")]
    pub rir: Rir,
    #[serde(rename = "Problem")]
    pub problem: &'a Problem,
    #[serde(rename = "TransportCause", skip_serializing_if = "Option::is_none")]
    pub transport_cause: Option<&'a str>,
}

pub(crate) fn emit<T: Serialize>(audit: &dyn AuditLog, prefix: &str, record: &T) {
    match serde_json::to_string(record) {
        Ok(json) => audit.log(&format!("{prefix} JSON={json}")),
        Err(err) => error!(%err, "failed to serialize audit record"),
    }
}
