//! Dispatch State Machine
//!
//! Defines the valid transitions of a single demo dispatch, from gate
//! creation to termination. A dispatch runs through the machine once.

use std::fmt;

/// States of a dispatch flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Nothing allocated yet
    Init,
    /// Gate exists, subscription not yet registered
    SubscribePending,
    /// Subscribed, no acceptable network connected yet
    AwaitingNetwork,
    /// An acceptable network is connected, resolver not yet run
    NetworkResolved,
    /// Demo entry point is executing
    Running,
    /// Releasing subscription and gate
    Teardown,
    /// Flow finished
    Terminated,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Events that drive the dispatch flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// Availability gate allocated
    GateCreated,
    /// Availability gate could not be allocated
    GateFailed,
    /// Subscription accepted; `network_ready` when an acceptable network was already up
    Subscribed { network_ready: bool },
    /// Network manager rejected the subscription
    SubscribeFailed,
    /// The gate was released by the event bridge
    NetworkAvailable,
    /// Resolver committed to a network type
    Resolved,
    /// Resolver found no supported network
    Unsupported,
    /// Demo entry point returned, whatever its status
    DemoReturned,
    /// Subscription removed and gate released
    TeardownComplete,
}

/// Result of a state transition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition was valid and state changed
    Success(DispatchState),
    /// Transition was invalid from current state
    Invalid {
        from: DispatchState,
        event: DispatchEvent,
    },
}

/// The state machine for one dispatch flow
#[derive(Debug)]
pub struct DispatchStateMachine {
    current_state: DispatchState,
    history: Vec<DispatchState>,
}

impl Default for DispatchStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchStateMachine {
    /// Create a new state machine in Init state
    pub fn new() -> Self {
        Self {
            current_state: DispatchState::Init,
            history: vec![DispatchState::Init],
        }
    }

    /// Get current state
    pub fn state(&self) -> DispatchState {
        self.current_state
    }

    /// Every state entered so far, starting with Init
    pub fn history(&self) -> &[DispatchState] {
        &self.history
    }

    pub fn into_history(self) -> Vec<DispatchState> {
        self.history
    }

    pub fn is_terminated(&self) -> bool {
        self.current_state == DispatchState::Terminated
    }

    /// Process an event and return the transition result
    pub fn process_event(&mut self, event: DispatchEvent) -> TransitionResult {
        match self.get_next_state(&event) {
            Some(state) => {
                self.current_state = state;
                self.history.push(state);
                TransitionResult::Success(state)
            }
            None => TransitionResult::Invalid {
                from: self.current_state,
                event,
            },
        }
    }

    /// Get the next state for a given event, if the transition is valid
    fn get_next_state(&self, event: &DispatchEvent) -> Option<DispatchState> {
        use DispatchEvent::*;
        use DispatchState::*;

        match (self.current_state, event) {
            (Init, GateCreated) => Some(SubscribePending),
            (Init, GateFailed) => Some(Teardown),

            (SubscribePending, Subscribed { network_ready: true }) => Some(NetworkResolved),
            (SubscribePending, Subscribed { network_ready: false }) => Some(AwaitingNetwork),
            (SubscribePending, SubscribeFailed) => Some(Teardown),

            (AwaitingNetwork, NetworkAvailable) => Some(NetworkResolved),

            (NetworkResolved, Resolved) => Some(Running),
            (NetworkResolved, Unsupported) => Some(Teardown),

            // Demo status never changes the path
            (Running, DemoReturned) => Some(Teardown),

            (Teardown, TeardownComplete) => Some(Terminated),

            _ => None,
        }
    }
}

/// Check if a transition from one state to another is ever valid
pub fn is_valid_transition(from: DispatchState, to: DispatchState) -> bool {
    use DispatchState::*;

    matches!(
        (from, to),
        (Init, SubscribePending)
            | (Init, Teardown)
            | (SubscribePending, AwaitingNetwork)
            | (SubscribePending, NetworkResolved)
            | (SubscribePending, Teardown)
            | (AwaitingNetwork, NetworkResolved)
            | (NetworkResolved, Running)
            | (NetworkResolved, Teardown)
            | (Running, Teardown)
            | (Teardown, Terminated)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let fsm = DispatchStateMachine::new();
        assert_eq!(fsm.state(), DispatchState::Init);
        assert_eq!(fsm.history(), &[DispatchState::Init]);
    }

    #[test]
    fn test_flow_with_wait() {
        let mut fsm = DispatchStateMachine::new();

        let result = fsm.process_event(DispatchEvent::GateCreated);
        assert_eq!(result, TransitionResult::Success(DispatchState::SubscribePending));

        let result = fsm.process_event(DispatchEvent::Subscribed { network_ready: false });
        assert_eq!(result, TransitionResult::Success(DispatchState::AwaitingNetwork));

        let result = fsm.process_event(DispatchEvent::NetworkAvailable);
        assert_eq!(result, TransitionResult::Success(DispatchState::NetworkResolved));

        let result = fsm.process_event(DispatchEvent::Resolved);
        assert_eq!(result, TransitionResult::Success(DispatchState::Running));

        let result = fsm.process_event(DispatchEvent::DemoReturned);
        assert_eq!(result, TransitionResult::Success(DispatchState::Teardown));

        let result = fsm.process_event(DispatchEvent::TeardownComplete);
        assert_eq!(result, TransitionResult::Success(DispatchState::Terminated));
        assert!(fsm.is_terminated());
    }

    #[test]
    fn test_network_ready_skips_wait() {
        let mut fsm = DispatchStateMachine::new();
        fsm.process_event(DispatchEvent::GateCreated);
        fsm.process_event(DispatchEvent::Subscribed { network_ready: true });

        assert_eq!(fsm.state(), DispatchState::NetworkResolved);
        assert!(!fsm.history().contains(&DispatchState::AwaitingNetwork));
    }

    #[test]
    fn test_failures_go_to_teardown() {
        let mut fsm = DispatchStateMachine::new();
        fsm.process_event(DispatchEvent::GateFailed);
        assert_eq!(fsm.state(), DispatchState::Teardown);

        let mut fsm = DispatchStateMachine::new();
        fsm.process_event(DispatchEvent::GateCreated);
        fsm.process_event(DispatchEvent::SubscribeFailed);
        assert_eq!(fsm.state(), DispatchState::Teardown);

        let mut fsm = DispatchStateMachine::new();
        fsm.process_event(DispatchEvent::GateCreated);
        fsm.process_event(DispatchEvent::Subscribed { network_ready: true });
        fsm.process_event(DispatchEvent::Unsupported);
        assert_eq!(fsm.state(), DispatchState::Teardown);
    }

    #[test]
    fn test_invalid_transition() {
        let mut fsm = DispatchStateMachine::new();

        // Cannot run a demo before a network is resolved
        let result = fsm.process_event(DispatchEvent::Resolved);
        assert!(matches!(result, TransitionResult::Invalid { .. }));
        assert_eq!(fsm.state(), DispatchState::Init);
        assert_eq!(fsm.history().len(), 1);
    }

    #[test]
    fn test_terminated_is_final() {
        let mut fsm = DispatchStateMachine::new();
        fsm.process_event(DispatchEvent::GateFailed);
        fsm.process_event(DispatchEvent::TeardownComplete);

        let result = fsm.process_event(DispatchEvent::GateCreated);
        assert!(matches!(result, TransitionResult::Invalid { .. }));
        assert!(fsm.is_terminated());
    }

    #[test]
    fn test_history_matches_transition_table() {
        let mut fsm = DispatchStateMachine::new();
        fsm.process_event(DispatchEvent::GateCreated);
        fsm.process_event(DispatchEvent::Subscribed { network_ready: false });
        fsm.process_event(DispatchEvent::NetworkAvailable);
        fsm.process_event(DispatchEvent::Unsupported);
        fsm.process_event(DispatchEvent::TeardownComplete);

        for pair in fsm.history().windows(2) {
            assert!(is_valid_transition(pair[0], pair[1]), "{:?}", pair);
        }
        assert!(!is_valid_transition(DispatchState::Running, DispatchState::Init));
    }
}
