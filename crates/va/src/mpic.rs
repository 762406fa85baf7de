//! The multi-perspective corroboration round: fan the primary's check out to
//! every configured remote perspective, tally results as they arrive, and
//! stop as soon as the quorum predicate is immovable.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use verdite_core_types::{CheckCaaRequest, MpicSummary, Problem, Rir, ValidationRequest};

use crate::clients::RpcError;
use crate::quorum::{Outcome, QuorumPolicy, QuorumTally};
use crate::va::ValidationAuthority;

/// The two corroborated operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Operation {
    Challenge,
    Caa,
}

impl Operation {
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Challenge => "challenge",
            Self::Caa => "caa",
        }
    }

    pub fn audit_prefix(&self) -> &'static str {
        match self {
            Self::Challenge => crate::audit::CHALLENGE_RESULT_PREFIX,
            Self::Caa => crate::audit::CAA_RESULT_PREFIX,
        }
    }

    /// Prefix wrapped around a remote failure when it becomes the overall
    /// problem.
    pub fn secondary_prefix(&self) -> &'static str {
        match self {
            Self::Challenge => "During secondary domain validation: ",
            Self::Caa => "During secondary CAA check: ",
        }
    }

    fn rpc_failed_detail(&self) -> &'static str {
        match self {
            Self::Challenge => "Remote PerformValidation RPC failed",
            Self::Caa => "Remote CheckCAA RPC failed",
        }
    }

    fn rpc_canceled_detail(&self) -> &'static str {
        match self {
            Self::Challenge => "Remote PerformValidation RPC canceled",
            Self::Caa => "Remote CheckCAA RPC canceled",
        }
    }
}

/// The request relayed to every remote, unchanged from the caller's.
#[derive(Clone, Debug)]
pub(crate) enum RemoteRequest {
    Validate(ValidationRequest),
    Caa(CheckCaaRequest),
}

/// One remote perspective's contribution, as seen by the tally loop.
struct RemoteResult {
    perspective: String,
    rir: Rir,
    problem: Option<Problem>,
    transport_cause: Option<String>,
}

/// A remote that disagreed with the primary, kept for the differential
/// audit line. `transport_cause` carries the unsanitised RPC error.
pub(crate) struct RemoteFailure {
    pub perspective: String,
    pub rir: Rir,
    pub problem: Problem,
    pub transport_cause: Option<String>,
}

/// Outcome of one corroboration round.
pub(crate) struct Corroboration {
    pub problem: Option<Problem>,
    pub summary: MpicSummary,
    pub successes: usize,
    pub failures: Vec<RemoteFailure>,
}

/// Spawned remote tasks, aborted together. Dropping the group aborts any
/// task still running, so cancelling the caller cancels the fan-out.
struct TaskGroup {
    handles: Vec<JoinHandle<()>>,
}

impl TaskGroup {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
        }
    }

    fn spawn(&mut self, future: impl std::future::Future<Output = ()> + Send + 'static) {
        self.handles.push(tokio::spawn(future));
    }

    fn abort_all(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

impl Drop for TaskGroup {
    fn drop(&mut self) {
        self.abort_all();
    }
}

impl ValidationAuthority {
    /// Fan `request` out to every remote perspective and decide the overall
    /// outcome under the quorum rule. Only called after the primary check
    /// passed, with at least one remote configured.
    pub(crate) async fn corroborate(
        &self,
        operation: Operation,
        request: RemoteRequest,
    ) -> Corroboration {
        let total = self.remotes.len();
        let policy = QuorumPolicy::for_remotes(total);
        let mut tally = QuorumTally::new(policy, self.remotes.iter().map(|remote| remote.rir));

        debug!(
            remotes = total,
            max_failures = policy.max_failures(),
            "dispatching check to remote perspectives"
        );

        let (tx, mut rx) = mpsc::channel::<RemoteResult>(total.max(1));
        let mut tasks = TaskGroup::with_capacity(total);
        for remote in &self.remotes {
            let tx = tx.clone();
            let request = request.clone();
            let clients = remote.clients.clone();
            let perspective = remote.label.clone();
            let rir = remote.rir;
            let failed_detail = operation.rpc_failed_detail();
            let canceled_detail = operation.rpc_canceled_detail();

            tasks.spawn(async move {
                let (problem, transport_cause) = match request {
                    RemoteRequest::Validate(req) => {
                        match clients.validate.validate_challenge(req).await {
                            Ok(resp) => (resp.problem, None),
                            Err(err) => (
                                Some(rpc_problem(&err, failed_detail, canceled_detail)),
                                Some(err.to_string()),
                            ),
                        }
                    }
                    RemoteRequest::Caa(req) => match clients.check_caa.check_caa(req).await {
                        Ok(resp) => (resp.problem, None),
                        Err(err) => (
                            Some(rpc_problem(&err, failed_detail, canceled_detail)),
                            Some(err.to_string()),
                        ),
                    },
                };

                let _ = tx
                    .send(RemoteResult {
                        perspective,
                        rir,
                        problem,
                        transport_cause,
                    })
                    .await;
            });
        }
        drop(tx);

        let mut failures: Vec<RemoteFailure> = Vec::new();
        while let Some(result) = rx.recv().await {
            match result.problem {
                None => tally.record_success(result.rir),
                Some(problem) => {
                    debug!(
                        perspective = %result.perspective,
                        problem = %problem,
                        "remote perspective disagreed"
                    );
                    tally.record_failure(result.rir);
                    failures.push(RemoteFailure {
                        perspective: result.perspective,
                        rir: result.rir,
                        problem,
                        transport_cause: result.transport_cause,
                    });
                }
            }

            if tally.outcome() != Outcome::Undecided {
                break;
            }
        }
        let decided = tally.outcome();
        tasks.abort_all();

        // Results already delivered are still accounted for; outstanding
        // perspectives have been cancelled and are not waited on. A late
        // result can refine the tally but never flip a decided outcome.
        while let Ok(result) = rx.try_recv() {
            match result.problem {
                None => tally.record_success(result.rir),
                Some(problem) => {
                    tally.record_failure(result.rir);
                    failures.push(RemoteFailure {
                        perspective: result.perspective,
                        rir: result.rir,
                        problem,
                        transport_cause: result.transport_cause,
                    });
                }
            }
        }

        let problem = match decided {
            Outcome::Pass => None,
            // Undecided here means results went missing; treat it as failed.
            Outcome::Fail | Outcome::Undecided => Some(match failures.first() {
                Some(first) => first.problem.with_detail_prefix(operation.secondary_prefix()),
                None => Problem::server_internal(format!(
                    "{}insufficient RIR diversity among passing perspectives",
                    operation.secondary_prefix()
                )),
            }),
        };

        Corroboration {
            problem,
            summary: MpicSummary {
                quorum_result: tally.quorum_result(),
                rirs: tally.passed_rirs(),
            },
            successes: tally.successes(),
            failures,
        }
    }
}

fn rpc_problem(error: &RpcError, failed_detail: &str, canceled_detail: &str) -> Problem {
    match error {
        RpcError::Canceled => Problem::server_internal(canceled_detail),
        RpcError::Transport(_) => Problem::server_internal(failed_detail),
    }
}
