//! Demo dispatch flow
//!
//! Runs one demo through the dispatch state machine: create the gate,
//! subscribe the bridge, wait for an acceptable network if none is up,
//! resolve it, run the demo, then release everything it acquired.

use super::bridge::NetworkEventBridge;
use super::context::DemoContext;
use super::gate::{AvailabilityGate, GATE_MAX_COUNT};
use crate::demo::{DemoConnection, DemoStatus};
use crate::network::{NetworkManager, SubscriptionId};
use crate::resource;
use demo_runner_shared::state_machine::{
    DispatchEvent, DispatchState, DispatchStateMachine, TransitionResult,
};
use demo_runner_shared::{resolve, Credentials, DispatchError, NetworkType, NetworkTypes, ServerInfo};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// How a dispatch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The demo ran; its status is reported but never acted on
    Completed {
        network: NetworkType,
        mqtt_mode: bool,
        status: DemoStatus,
    },
    /// The demo never ran
    Skipped(DispatchError),
}

impl DispatchOutcome {
    pub fn demo_ran(&self) -> bool {
        matches!(self, DispatchOutcome::Completed { .. })
    }
}

/// Summary returned when a dispatch flow terminates
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub demo: String,
    /// States entered, from Init to Terminated
    pub trace: Vec<DispatchState>,
    pub outcome: DispatchOutcome,
}

/// One execution of the dispatch state machine for one demo
pub struct DispatchFlow {
    context: Arc<DemoContext>,
    manager: Arc<dyn NetworkManager>,
    identifier: String,
    server: ServerInfo,
    credentials: Credentials,
    gate_capacity: usize,
    fsm: DispatchStateMachine,
}

impl DispatchFlow {
    pub fn new(
        context: Arc<DemoContext>,
        manager: Arc<dyn NetworkManager>,
        identifier: impl Into<String>,
        server: ServerInfo,
        credentials: Credentials,
    ) -> Self {
        Self {
            context,
            manager,
            identifier: identifier.into(),
            server,
            credentials,
            gate_capacity: GATE_MAX_COUNT,
            fsm: DispatchStateMachine::new(),
        }
    }

    /// Maximum count requested when creating the availability gate
    #[cfg(test)]
    pub fn with_gate_capacity(mut self, capacity: usize) -> Self {
        self.gate_capacity = capacity;
        self
    }

    /// Run the flow to termination
    pub async fn run(mut self) -> DispatchReport {
        let mut subscription = None;

        let gate = AvailabilityGate::create(0, self.gate_capacity);
        let outcome = match &gate {
            Ok(gate) => {
                self.advance(DispatchEvent::GateCreated);
                self.dispatch(gate, &mut subscription).await
            }
            Err(e) => {
                error!("[DEMO] {}", e);
                self.advance(DispatchEvent::GateFailed);
                DispatchOutcome::Skipped(e.clone())
            }
        };

        self.teardown(gate.ok(), subscription);

        DispatchReport {
            demo: self.context.name().to_string(),
            trace: self.fsm.into_history(),
            outcome,
        }
    }

    async fn dispatch(
        &mut self,
        gate: &AvailabilityGate,
        subscription: &mut Option<SubscriptionId>,
    ) -> DispatchOutcome {
        let acceptable = self.context.acceptable_networks();

        let bridge = NetworkEventBridge::new(
            self.context.clone(),
            gate.clone(),
            &self.manager,
            self.identifier.clone(),
            self.server.clone(),
            self.credentials.clone(),
        );
        match self.manager.subscribe(acceptable, bridge.into_callback()) {
            Ok(id) => *subscription = Some(id),
            Err(e) => {
                error!(
                    "[DEMO] Failed to subscribe with network manager for network state change: {}",
                    e
                );
                self.advance(DispatchEvent::SubscribeFailed);
                return DispatchOutcome::Skipped(e.into());
            }
        }

        let mut available = self.usable_networks();
        self.advance(DispatchEvent::Subscribed {
            network_ready: !available.is_empty(),
        });

        if available.is_empty() {
            info!("[DEMO] Waiting for one of {} to connect", acceptable);
            gate.wait().await;
            self.advance(DispatchEvent::NetworkAvailable);
            // The bridge only signals; look the networks up again
            available = self.usable_networks();
        }

        let selection = match resolve(available, acceptable) {
            Ok(selection) => selection,
            Err(e) => {
                warn!("[DEMO] {}", e);
                self.advance(DispatchEvent::Unsupported);
                return DispatchOutcome::Skipped(e);
            }
        };

        self.context.commit(selection.network);
        self.advance(DispatchEvent::Resolved);

        let connection = DemoConnection {
            mqtt_mode: selection.mqtt_mode,
            identifier: self.identifier.clone(),
            server: self.server.clone(),
            credentials: self.credentials.for_server(&self.server),
            interface: self.manager.network_interface(selection.network),
        };

        info!(
            "[DEMO] Running {} over {} (mqtt_mode={})",
            self.context.demo().name(),
            selection.network,
            selection.mqtt_mode
        );
        let started = Instant::now();
        let status = self.context.demo().run(connection).await;
        self.advance(DispatchEvent::DemoReturned);

        info!("[DEMO] {} returned status {}", self.context.demo().name(), status);
        match resource::peak_resident_kb() {
            Some(kb) => info!("[DEMO] Demo peak resident memory: {} kB", kb),
            None => info!("[DEMO] Demo ran for {:?}", started.elapsed()),
        }

        DispatchOutcome::Completed {
            network: selection.network,
            mqtt_mode: selection.mqtt_mode,
            status,
        }
    }

    fn teardown(&mut self, gate: Option<AvailabilityGate>, subscription: Option<SubscriptionId>) {
        if let Some(id) = subscription {
            self.manager.remove_subscription(id);
        }
        if let Some(gate) = gate {
            gate.destroy();
        }
        self.advance(DispatchEvent::TeardownComplete);
        debug!("[DEMO] {} terminated", self.context.name());
    }

    fn usable_networks(&self) -> NetworkTypes {
        self.manager.connected_networks() & self.context.acceptable_networks()
    }

    fn advance(&mut self, event: DispatchEvent) {
        let from = self.fsm.state();
        match self.fsm.process_event(event) {
            TransitionResult::Success(to) => debug!("[DEMO] {} -> {}", from, to),
            TransitionResult::Invalid { from, event } => {
                error!("[DEMO] Invalid dispatch transition from {} on {:?}", from, event)
            }
        }
    }
}
