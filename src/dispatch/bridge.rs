//! Network event bridge
//!
//! Turns network manager state changes into a release of the availability
//! gate and into the demo's lifecycle hooks.

use super::context::DemoContext;
use super::gate::AvailabilityGate;
use crate::demo::DemoConnection;
use crate::network::{NetworkManager, StateChangeCallback};
use crate::transport::NetworkInterface;
use demo_runner_shared::{Credentials, NetworkState, NetworkType, ServerInfo};
use std::sync::{Arc, Weak};
use tracing::debug;

/// State-change subscriber registered by a dispatch flow
pub struct NetworkEventBridge {
    context: Arc<DemoContext>,
    gate: AvailabilityGate,
    manager: Weak<dyn NetworkManager>,
    identifier: String,
    server: ServerInfo,
    credentials: Credentials,
}

impl NetworkEventBridge {
    pub fn new(
        context: Arc<DemoContext>,
        gate: AvailabilityGate,
        manager: &Arc<dyn NetworkManager>,
        identifier: impl Into<String>,
        server: ServerInfo,
        credentials: Credentials,
    ) -> Self {
        Self {
            context,
            gate,
            manager: Arc::downgrade(manager),
            identifier: identifier.into(),
            server,
            credentials,
        }
    }

    /// Wrap the bridge into a callback for `NetworkManager::subscribe`
    pub fn into_callback(self) -> StateChangeCallback {
        let bridge = Arc::new(self);
        Arc::new(move |network, state| bridge.on_state_change(network, state))
    }

    /// Handle one state change. Never blocks.
    pub fn on_state_change(&self, network: NetworkType, state: NetworkState) {
        debug!("[BRIDGE] {}: {} {:?}", self.context.name(), network, state);
        match state {
            NetworkState::Enabled => self.on_enabled(network),
            NetworkState::Disabled => self.on_disabled(network),
        }
    }

    fn on_enabled(&self, network: NetworkType) {
        if self.context.connected_network().is_some() {
            return;
        }

        self.gate.post();

        // The configured server info is used as-is, whichever network came up
        let connection = DemoConnection {
            mqtt_mode: network.keeps_alive(),
            identifier: self.identifier.clone(),
            server: self.server.clone(),
            credentials: self.credentials.for_server(&self.server),
            interface: self.interface_for(network),
        };
        self.context.demo().on_network_connected(connection);
    }

    fn on_disabled(&self, network: NetworkType) {
        if self.context.clear_if_connected(network) {
            self.context
                .demo()
                .on_network_disconnected(self.interface_for(network));
        }
    }

    fn interface_for(&self, network: NetworkType) -> Option<Arc<dyn NetworkInterface>> {
        self.manager
            .upgrade()
            .and_then(|manager| manager.network_interface(network))
    }
}
