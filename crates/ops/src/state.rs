//! Operation lifecycle state machine

use std::fmt;

/// Phases of a privileged operation.
///
/// Exactly one operation may be outside `Idle` at a time; the
/// orchestrator enforces this under a single lock, so two privileged
/// scripts can never race against the same volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// No operation in flight.
    Idle,
    /// Resolving the target volume identity.
    Resolving,
    /// Compiling the request into a step sequence.
    Compiling,
    /// The script is at (or past) the elevation boundary.
    Executing,
    /// The elevated call resolved successfully.
    Completed,
    /// The operation failed at some phase.
    Failed,
}

impl OperationState {
    /// Whether moving to `next` is a legal lifecycle edge.
    #[must_use]
    pub fn can_transition_to(self, next: OperationState) -> bool {
        use OperationState::{Compiling, Completed, Executing, Failed, Idle, Resolving};
        matches!(
            (self, next),
            (Idle, Resolving)
                | (Resolving, Compiling | Failed)
                | (Compiling, Executing | Failed)
                | (Executing, Completed | Failed)
                | (Completed | Failed, Idle)
        )
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationState::Idle => "idle",
            OperationState::Resolving => "resolving",
            OperationState::Compiling => "compiling",
            OperationState::Executing => "executing",
            OperationState::Completed => "completed",
            OperationState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_edges_are_enforced() {
        assert!(OperationState::Idle.can_transition_to(OperationState::Resolving));
        assert!(OperationState::Resolving.can_transition_to(OperationState::Compiling));
        assert!(OperationState::Compiling.can_transition_to(OperationState::Executing));
        assert!(OperationState::Executing.can_transition_to(OperationState::Completed));
        assert!(OperationState::Failed.can_transition_to(OperationState::Idle));

        // No skipping phases, no re-entry while busy.
        assert!(!OperationState::Idle.can_transition_to(OperationState::Executing));
        assert!(!OperationState::Executing.can_transition_to(OperationState::Resolving));
        assert!(!OperationState::Resolving.can_transition_to(OperationState::Completed));
    }

    #[test]
    fn every_active_phase_can_fail() {
        for state in [
            OperationState::Resolving,
            OperationState::Compiling,
            OperationState::Executing,
        ] {
            assert!(state.can_transition_to(OperationState::Failed));
        }
    }
}
