use std::collections::BTreeSet;

use verdite_core_types::Rir;

/// The diversity floor: passing remotes must span at least this many
/// distinct RIR service regions.
pub(crate) const MIN_DISTINCT_RIRS: usize = 2;

/// Failure allowance for a remote perspective set: small sets tolerate one
/// failure, six tolerate two, larger sets a quarter rounded up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct QuorumPolicy {
    remotes: usize,
    max_failures: usize,
}

impl QuorumPolicy {
    pub fn for_remotes(remotes: usize) -> Self {
        let max_failures = match remotes {
            0..=5 => 1,
            6 => 2,
            n => n.div_ceil(4),
        };

        Self {
            remotes,
            max_failures,
        }
    }

    pub fn remotes(&self) -> usize {
        self.remotes
    }

    pub fn max_failures(&self) -> usize {
        self.max_failures
    }

    /// Successes required for the count rule: `N - f`.
    pub fn successes_needed(&self) -> usize {
        self.remotes.saturating_sub(self.max_failures)
    }

    /// Failures that decide the overall outcome as failed: `f + 1`.
    pub fn failure_budget(&self) -> usize {
        self.max_failures + 1
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Undecided,
    Pass,
    Fail,
}

/// Running tally of per-perspective results.
///
/// The tally knows the RIRs of the perspectives still outstanding, so it can
/// declare failure as soon as the diversity floor becomes unreachable rather
/// than waiting for stragglers.
#[derive(Clone, Debug)]
pub(crate) struct QuorumTally {
    policy: QuorumPolicy,
    pending: Vec<Rir>,
    successes: usize,
    failures: usize,
    passed_rirs: BTreeSet<Rir>,
}

impl QuorumTally {
    pub fn new(policy: QuorumPolicy, remote_rirs: impl IntoIterator<Item = Rir>) -> Self {
        Self {
            policy,
            pending: remote_rirs.into_iter().collect(),
            successes: 0,
            failures: 0,
            passed_rirs: BTreeSet::new(),
        }
    }

    pub fn record_success(&mut self, rir: Rir) {
        self.settle_pending(rir);
        self.successes += 1;
        self.passed_rirs.insert(rir);
    }

    pub fn record_failure(&mut self, rir: Rir) {
        self.settle_pending(rir);
        self.failures += 1;
    }

    fn settle_pending(&mut self, rir: Rir) {
        if let Some(pos) = self.pending.iter().position(|pending| *pending == rir) {
            self.pending.swap_remove(pos);
        }
    }

    pub fn successes(&self) -> usize {
        self.successes
    }

    /// Distinct RIRs of the passing remotes, in lexicographic label order.
    pub fn passed_rirs(&self) -> Vec<Rir> {
        self.passed_rirs.iter().copied().collect()
    }

    /// `"k/N"` over the successes observed so far.
    pub fn quorum_result(&self) -> String {
        format!("{}/{}", self.successes, self.policy.remotes())
    }

    pub fn outcome(&self) -> Outcome {
        if self.failures >= self.policy.failure_budget() {
            return Outcome::Fail;
        }

        // RIRs reachable if every outstanding perspective were to pass.
        let mut reachable = self.passed_rirs.clone();
        reachable.extend(self.pending.iter().copied());
        if reachable.len() < MIN_DISTINCT_RIRS {
            return Outcome::Fail;
        }

        if self.successes >= self.policy.successes_needed()
            && self.passed_rirs.len() >= MIN_DISTINCT_RIRS
        {
            return Outcome::Pass;
        }

        Outcome::Undecided
    }
}
