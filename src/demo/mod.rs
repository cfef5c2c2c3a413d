//! Demo capability
//!
//! A demo is an opaque entry point run over whatever network the dispatch
//! flow resolved. Demos that care about network transitions after they
//! started override the lifecycle hooks.

mod builtin;

pub use builtin::{BleEchoDemo, EchoDemo};

use crate::transport::NetworkInterface;
use async_trait::async_trait;
use demo_runner_shared::{Credentials, NetworkType, NetworkTypes, ServerInfo};
use std::sync::Arc;

/// Status code returned by a demo run; zero is success
pub type DemoStatus = i32;

pub const DEMO_SUCCESS: DemoStatus = 0;
pub const DEMO_FAILURE: DemoStatus = 1;

/// Everything a demo needs to reach the server
#[derive(Clone)]
pub struct DemoConnection {
    /// Keep-alive mode flag, false on transports without keep-alive
    pub mqtt_mode: bool,
    pub identifier: String,
    pub server: ServerInfo,
    pub credentials: Credentials,
    /// Whatever interface the network manager returned for the type
    pub interface: Option<Arc<dyn NetworkInterface>>,
}

impl std::fmt::Debug for DemoConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoConnection")
            .field("mqtt_mode", &self.mqtt_mode)
            .field("identifier", &self.identifier)
            .field("server", &self.server)
            .field("credentials", &self.credentials)
            .field("interface", &self.interface.as_ref().map(|i| i.name()))
            .finish()
    }
}

/// A runnable demo with optional network lifecycle hooks
#[async_trait]
pub trait Demo: Send + Sync {
    /// Run the demo to completion
    async fn run(&self, connection: DemoConnection) -> DemoStatus;

    /// Called when an acceptable network comes up while nothing is committed
    fn on_network_connected(&self, _connection: DemoConnection) {}

    /// Called when the committed network goes down
    fn on_network_disconnected(&self, _interface: Option<Arc<dyn NetworkInterface>>) {}

    fn name(&self) -> &str;
}

/// The demo kinds the runner knows how to start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoKind {
    Mqtt,
    Shadow,
    BleMqttEcho,
}

impl DemoKind {
    /// Networks this kind of demo may run over
    pub fn acceptable_networks(self) -> NetworkTypes {
        match self {
            DemoKind::Mqtt | DemoKind::Shadow => NetworkType::Wifi.into(),
            DemoKind::BleMqttEcho => NetworkType::Ble | NetworkType::Wifi,
        }
    }

    /// Name of the task the demo runs in
    pub fn task_name(self) -> &'static str {
        match self {
            DemoKind::Mqtt => "MQTTDemo",
            DemoKind::Shadow => "ShadowDemo",
            DemoKind::BleMqttEcho => "BLEMQTTEchoDemo",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptable_networks_per_kind() {
        assert_eq!(DemoKind::Mqtt.acceptable_networks(), NetworkTypes::from(NetworkType::Wifi));
        assert_eq!(DemoKind::Shadow.acceptable_networks(), NetworkTypes::from(NetworkType::Wifi));

        let echo = DemoKind::BleMqttEcho.acceptable_networks();
        assert!(echo.contains(NetworkType::Ble));
        assert!(echo.contains(NetworkType::Wifi));
        assert!(!echo.contains(NetworkType::Ethernet));
    }

    #[test]
    fn test_task_names() {
        assert_eq!(DemoKind::Mqtt.task_name(), "MQTTDemo");
        assert_eq!(DemoKind::Shadow.task_name(), "ShadowDemo");
        assert_eq!(DemoKind::BleMqttEcho.task_name(), "BLEMQTTEchoDemo");
    }
}
