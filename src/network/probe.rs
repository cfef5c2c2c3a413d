//! Link probes reporting connectivity transitions to the link manager

use super::manager::{LinkManager, NetworkConfig, NetworkManager};
use crate::transport::NetworkInterface;
use anyhow::{anyhow, Result};
use demo_runner_shared::{Credentials, NetworkState, NetworkType, ServerInfo};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info};

/// Spawn one probe task per managed network type
pub fn spawn_probes(
    manager: Arc<LinkManager>,
    config: &NetworkConfig,
    server: ServerInfo,
    credentials: Credentials,
) -> Vec<JoinHandle<()>> {
    manager
        .managed_networks()
        .iter()
        .filter_map(|network| {
            let interface = manager.network_interface(network)?;
            let manager = manager.clone();
            let config = config.clone();
            let server = server.clone();
            let credentials = credentials.clone();
            Some(tokio::spawn(async move {
                probe_loop(manager, network, interface, config, server, credentials).await;
            }))
        })
        .collect()
}

/// Probe a link forever, with exponential backoff while it is down
async fn probe_loop(
    manager: Arc<LinkManager>,
    network: NetworkType,
    interface: Arc<dyn NetworkInterface>,
    config: NetworkConfig,
    server: ServerInfo,
    credentials: Credentials,
) {
    let mut reconnect_delay = config.reconnect_delay;
    info!("[PROBE] Probing {} via {}", network, interface.name());

    loop {
        match probe_once(interface.as_ref(), &config, &server, &credentials).await {
            Ok(()) => {
                reconnect_delay = config.reconnect_delay; // Reset delay
                manager.set_state(network, NetworkState::Enabled);
                tokio::time::sleep(config.probe_interval).await;
            }
            Err(e) => {
                debug!("[PROBE] {} unreachable: {}", network, e);
                manager.set_state(network, NetworkState::Disabled);
                tokio::time::sleep(reconnect_delay).await;

                // Exponential backoff
                reconnect_delay = std::cmp::min(reconnect_delay * 2, config.max_reconnect_delay);
            }
        }
    }
}

/// Open and immediately close a stream over the interface
async fn probe_once(
    interface: &dyn NetworkInterface,
    config: &NetworkConfig,
    server: &ServerInfo,
    credentials: &Credentials,
) -> Result<()> {
    let mut stream = timeout(config.connect_timeout, interface.connect(server, credentials))
        .await
        .map_err(|_| anyhow!("connect timed out after {:?}", config.connect_timeout))??;
    stream.shutdown().await
}
