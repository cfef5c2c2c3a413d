//! Demo dispatch
//!
//! Each started demo gets its own task running a [`DispatchFlow`]: it
//! subscribes to network state changes, waits for an acceptable network,
//! picks one and hands the demo its connection parameters.

mod bridge;
mod context;
mod flow;
mod gate;
#[cfg(test)]
mod testing;

pub use context::DemoContext;
pub use flow::{DispatchFlow, DispatchOutcome, DispatchReport};

use crate::demo::{Demo, DemoKind};
use crate::network::NetworkManager;
use demo_runner_shared::{Credentials, ServerInfo};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, info_span, Instrument};

/// Starts demos, one dispatch task each
#[derive(Clone)]
pub struct DemoLauncher {
    manager: Arc<dyn NetworkManager>,
    identifier: String,
    server: ServerInfo,
    credentials: Credentials,
}

impl DemoLauncher {
    pub fn new(
        manager: Arc<dyn NetworkManager>,
        identifier: impl Into<String>,
        server: ServerInfo,
        credentials: Credentials,
    ) -> Self {
        Self {
            manager,
            identifier: identifier.into(),
            server,
            credentials,
        }
    }

    /// Start `demo` with the acceptable networks and task name of `kind`
    pub fn start(&self, kind: DemoKind, demo: Arc<dyn Demo>) -> JoinHandle<DispatchReport> {
        self.launch(Arc::new(DemoContext::new(kind, demo)))
    }

    /// Spawn the dispatch task for a prepared context
    pub fn launch(&self, context: Arc<DemoContext>) -> JoinHandle<DispatchReport> {
        let span = info_span!("demo", task = %context.name());
        info!(
            "[DEMO] Starting {} (acceptable: {})",
            context.name(),
            context.acceptable_networks()
        );

        let flow = DispatchFlow::new(
            context,
            self.manager.clone(),
            self.identifier.clone(),
            self.server.clone(),
            self.credentials.clone(),
        );
        tokio::spawn(flow.run().instrument(span))
    }

    pub fn start_mqtt_demo(&self, demo: Arc<dyn Demo>) -> JoinHandle<DispatchReport> {
        self.start(DemoKind::Mqtt, demo)
    }

    pub fn start_shadow_demo(&self, demo: Arc<dyn Demo>) -> JoinHandle<DispatchReport> {
        self.start(DemoKind::Shadow, demo)
    }

    pub fn start_ble_mqtt_echo_demo(&self, demo: Arc<dyn Demo>) -> JoinHandle<DispatchReport> {
        self.start(DemoKind::BleMqttEcho, demo)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingDemo;
    use super::*;
    use crate::network::{LinkManager, NetworkConfig};
    use demo_runner_shared::{NetworkState, NetworkType};
    use std::time::Duration;
    use tokio::time::timeout;

    fn launcher(manager: &Arc<LinkManager>) -> DemoLauncher {
        DemoLauncher::new(
            manager.clone(),
            "thing-1",
            ServerInfo::default(),
            Credentials::default(),
        )
    }

    #[tokio::test]
    async fn test_demos_run_independently() {
        let manager = Arc::new(LinkManager::from_config(&NetworkConfig::default()));
        manager.set_state(NetworkType::Ble, NetworkState::Enabled);
        let launcher = launcher(&manager);

        let mqtt = Arc::new(RecordingDemo::new());
        let echo = Arc::new(RecordingDemo::new());
        let mqtt_handle = launcher.start_mqtt_demo(mqtt.clone());
        let echo_handle = launcher.start_ble_mqtt_echo_demo(echo.clone());

        // BLE is enough for the echo demo but not for the MQTT demo
        let echo_report = timeout(Duration::from_secs(1), echo_handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(echo_report.demo, "BLEMQTTEchoDemo");
        assert!(matches!(
            echo_report.outcome,
            DispatchOutcome::Completed {
                network: NetworkType::Ble,
                mqtt_mode: false,
                ..
            }
        ));
        assert!(mqtt.runs().is_empty());
        assert!(!mqtt_handle.is_finished());

        manager.set_state(NetworkType::Wifi, NetworkState::Enabled);
        let mqtt_report = timeout(Duration::from_secs(1), mqtt_handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mqtt_report.demo, "MQTTDemo");
        assert!(mqtt_report.outcome.demo_ran());
        assert_eq!(echo.runs().len(), 1);
        assert_eq!(mqtt.runs().len(), 1);
        assert_eq!(manager.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_shadow_demo_uses_wifi() {
        let manager = Arc::new(LinkManager::from_config(&NetworkConfig::default()));
        manager.set_state(NetworkType::Wifi, NetworkState::Enabled);
        let demo = Arc::new(RecordingDemo::new());

        let report = launcher(&manager).start_shadow_demo(demo.clone()).await.unwrap();
        assert_eq!(report.demo, "ShadowDemo");
        assert!(matches!(
            report.outcome,
            DispatchOutcome::Completed {
                network: NetworkType::Wifi,
                mqtt_mode: true,
                ..
            }
        ));
    }
}
