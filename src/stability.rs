//! Run-length debouncing of decoded values.
//!
//! A value is only trusted after it has been decoded from `threshold`
//! consecutive valid frames. Committing a value is the only thing that
//! triggers persistence, and a value is committed at most once per run.
//!
//! ```text
//! NoCandidate --value--> Accumulating --count >= threshold--> Stable
//!                           ^    |                              |
//!                           +----+ different value (count = 1) -+
//! ```

/// Where the filter is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityPhase {
    /// Nothing observed yet
    NoCandidate,
    /// A candidate is repeating but has not reached the threshold
    Accumulating,
    /// The candidate has repeated at least `threshold` times
    Stable,
}

/// Result of feeding one value to the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityDecision {
    /// Still counting; nothing to persist
    Accumulating {
        /// Current candidate
        candidate: u16,
        /// Consecutive observations of the candidate
        count: u32,
    },
    /// Stable and different from the last committed value: persist it
    Commit(u16),
    /// Stable and already committed: nothing to persist
    Holding(u16),
}

/// Debounce state carried from one monitor iteration to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilityFilter {
    threshold: u32,
    candidate: Option<u16>,
    count: u32,
    last_committed: Option<u16>,
}

impl StabilityFilter {
    /// Filter requiring `threshold` consecutive identical values (minimum 1)
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            candidate: None,
            count: 0,
            last_committed: None,
        }
    }

    /// Feed one valid decoded value.
    pub fn observe(&mut self, value: u16) -> StabilityDecision {
        if self.candidate == Some(value) {
            self.count = self.count.saturating_add(1);
        } else {
            self.candidate = Some(value);
            self.count = 1;
        }

        if self.count < self.threshold {
            return StabilityDecision::Accumulating {
                candidate: value,
                count: self.count,
            };
        }

        if self.last_committed == Some(value) {
            StabilityDecision::Holding(value)
        } else {
            self.last_committed = Some(value);
            StabilityDecision::Commit(value)
        }
    }

    /// Undo the most recent commit after it could not be persisted.
    ///
    /// `previous` is the committed value from before that commit; the next
    /// stable observation of the same value commits again.
    pub fn revert_commit(&mut self, previous: Option<u16>) {
        self.last_committed = previous;
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> StabilityPhase {
        match self.candidate {
            None => StabilityPhase::NoCandidate,
            Some(_) if self.count >= self.threshold => StabilityPhase::Stable,
            Some(_) => StabilityPhase::Accumulating,
        }
    }

    /// Value currently being counted
    pub fn candidate(&self) -> Option<u16> {
        self.candidate
    }

    /// Consecutive observations of the candidate
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Last value signalled for persistence
    pub fn last_committed(&self) -> Option<u16> {
        self.last_committed
    }

    /// Observations required before a commit
    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
