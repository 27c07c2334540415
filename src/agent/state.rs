//! Agent execution state machine
//!
//! Deterministic finite state machine driving the reason/act/reflect loop:
//! every edge is validated, exactly one transition is in flight per run,
//! and both terminal states absorb further events.

use crate::errors::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Agent execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// No goal submitted yet
    Idle,

    /// Assembling context: directive, recalled memory, goal
    Planning,

    /// Reason/act iterations in progress
    Executing,

    /// Post-answer self-evaluation against the goal
    Reflecting,

    /// Terminal: goal answered (possibly partially on budget exhaustion)
    Complete,

    /// Terminal: timeout or unexpected error
    Failed,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    /// Goal submitted via run()
    GoalSubmitted,

    /// Context assembled, loop may start
    ContextAssembled,

    /// A batch of tool calls finished; stay in the loop
    ToolRoundComplete,

    /// Model answered with text and reflection is disabled
    FinalAnswer,

    /// Iteration budget exhausted; complete with partial result
    BudgetExhausted,

    /// Model answered with text and reflection is enabled
    NeedsReflection,

    /// Reflection judged the goal met
    GoalMet,

    /// Reflection judged the goal unmet
    GoalUnmet,

    /// Timeout or unhandled error
    Fault,
}

impl AgentState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Complete | AgentState::Failed)
    }

    /// Attempt state transition with validation
    ///
    /// Valid transitions:
    /// ```text
    /// 1. Idle       -> Planning   (GoalSubmitted)
    /// 2. Planning   -> Executing  (ContextAssembled)
    /// 3. Executing  -> Executing  (ToolRoundComplete)
    /// 4. Executing  -> Complete   (FinalAnswer | BudgetExhausted)
    /// 5. Executing  -> Reflecting (NeedsReflection)
    /// 6. Reflecting -> Executing  (GoalUnmet)
    /// 7. Reflecting -> Complete   (GoalMet)
    /// 8. Complete   -> Complete   (terminal)
    /// 9. Failed     -> Failed     (terminal)
    /// 10. *         -> Failed     (Fault)
    /// ```
    pub fn transition(&self, event: StateEvent) -> Result<AgentState> {
        use AgentState::*;
        use StateEvent::*;

        // A fault can occur from any state
        if event == Fault {
            return Ok(Failed);
        }

        let next_state = match (self, event) {
            (Idle, GoalSubmitted) => Planning,

            (Planning, ContextAssembled) => Executing,

            (Executing, ToolRoundComplete) => Executing,
            (Executing, FinalAnswer) => Complete,
            (Executing, BudgetExhausted) => Complete,
            (Executing, NeedsReflection) => Reflecting,

            (Reflecting, GoalUnmet) => Executing,
            (Reflecting, GoalMet) => Complete,

            // Terminal states absorb everything
            (Complete, _) => Complete,
            (Failed, _) => Failed,

            (from, event) => {
                return Err(AgentError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                    reason: format!("No valid transition from {:?} on {:?}", from, event),
                });
            }
        };

        Ok(next_state)
    }

    /// Human-readable state name
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentState::Idle => "Idle",
            AgentState::Planning => "Planning",
            AgentState::Executing => "Executing",
            AgentState::Reflecting => "Reflecting",
            AgentState::Complete => "Complete",
            AgentState::Failed => "Failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_without_reflection() {
        let state = AgentState::Idle
            .transition(StateEvent::GoalSubmitted)
            .unwrap();
        assert_eq!(state, AgentState::Planning);

        let state = state.transition(StateEvent::ContextAssembled).unwrap();
        assert_eq!(state, AgentState::Executing);

        let state = state.transition(StateEvent::ToolRoundComplete).unwrap();
        assert_eq!(state, AgentState::Executing);

        let state = state.transition(StateEvent::FinalAnswer).unwrap();
        assert_eq!(state, AgentState::Complete);
    }

    #[test]
    fn test_reflection_cycle() {
        let state = AgentState::Executing
            .transition(StateEvent::NeedsReflection)
            .unwrap();
        assert_eq!(state, AgentState::Reflecting);

        assert_eq!(
            state.transition(StateEvent::GoalUnmet).unwrap(),
            AgentState::Executing
        );
        assert_eq!(
            state.transition(StateEvent::GoalMet).unwrap(),
            AgentState::Complete
        );
    }

    #[test]
    fn test_budget_exhaustion_completes() {
        assert_eq!(
            AgentState::Executing
                .transition(StateEvent::BudgetExhausted)
                .unwrap(),
            AgentState::Complete
        );
    }

    #[test]
    fn test_fault_from_any_state() {
        for state in [
            AgentState::Idle,
            AgentState::Planning,
            AgentState::Executing,
            AgentState::Reflecting,
            AgentState::Complete,
            AgentState::Failed,
        ] {
            assert_eq!(
                state.transition(StateEvent::Fault).unwrap(),
                AgentState::Failed
            );
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(AgentState::Complete.is_terminal());
        assert!(AgentState::Failed.is_terminal());
        assert!(!AgentState::Executing.is_terminal());
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        assert!(AgentState::Idle
            .transition(StateEvent::FinalAnswer)
            .is_err());
        assert!(AgentState::Planning
            .transition(StateEvent::GoalMet)
            .is_err());
        assert!(AgentState::Executing
            .transition(StateEvent::GoalSubmitted)
            .is_err());
    }

    #[test]
    fn test_determinism() {
        let a = AgentState::Executing.transition(StateEvent::NeedsReflection);
        let b = AgentState::Executing.transition(StateEvent::NeedsReflection);
        assert_eq!(a.unwrap(), b.unwrap());
    }
}
