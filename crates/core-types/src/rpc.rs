use serde::{Deserialize, Serialize};

use crate::{Identifier, Problem, Rir, ValidationRecord, WireChallenge};

/// Request for the `ValidateChallenge` operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub identifier: Identifier,
    pub challenge: WireChallenge,
    pub reg_id: i64,
    pub authz_id: String,
    pub key_authorization: String,
}

/// Response from one perspective's `ValidateChallenge`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub records: Vec<ValidationRecord>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub problem: Option<Problem>,
    pub perspective: String,
    pub rir: Rir,
}

/// Request for the `CheckCAA` operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckCaaRequest {
    pub identifier: Identifier,
    pub challenge_type: String,
    pub reg_id: i64,
    pub authz_id: String,
    pub is_recheck: bool,
}

/// Response from one perspective's `CheckCAA`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckCaaResult {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub problem: Option<Problem>,
    pub perspective: String,
    pub rir: Rir,
}

/// Summary of a multi-perspective corroboration round, attached to audit
/// records whenever remote perspectives were consulted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpicSummary {
    /// `"k/N"` where `k` is the number of passing remotes observed when the
    /// outcome was decided and `N` the number of configured remotes.
    pub quorum_result: String,
    /// Distinct RIR labels of the passing remotes, sorted lexicographically.
    pub rirs: Vec<Rir>,
}
