#![forbid(unsafe_code)]
#![warn(rustdoc::broken_intra_doc_links, variant_size_differences)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::panic))]

mod challenge;
pub use challenge::{ChallengeStatus, ChallengeType, UnknownChallengeType, WireChallenge};

mod identifier;
pub use identifier::Identifier;

mod perspective;
pub use perspective::{Rir, UnknownRir, PRIMARY_PERSPECTIVE};

mod problem;
pub use problem::{Problem, ProblemKind, UnknownProblemKind};

mod record;
pub use record::ValidationRecord;

mod rpc;
pub use rpc::{CheckCaaRequest, CheckCaaResult, MpicSummary, ValidationRequest, ValidationResult};
