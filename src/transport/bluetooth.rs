//! BLE network interface
//!
//! BLE traffic never reaches the server directly: it goes to a relay node
//! that bridges it onward. The relay link is a TCP socket to the relay.

use crate::transport::tcp::TcpTransportStream;
use crate::transport::traits::{NetworkInterface, TransportStream};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use demo_runner_shared::{Credentials, NetworkType, ServerInfo};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// BLE relay configuration
#[derive(Debug, Clone)]
pub struct BluetoothConfig {
    /// Address of the relay node bridging BLE traffic
    pub relay_address: String,
    /// How long to wait for the relay to accept
    pub relay_timeout: Duration,
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            relay_address: "127.0.0.1:9000".into(),
            relay_timeout: Duration::from_secs(3),
        }
    }
}

/// Interface reaching the server through a BLE relay node
pub struct BluetoothInterface {
    config: BluetoothConfig,
}

impl BluetoothInterface {
    pub fn new(config: BluetoothConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl NetworkInterface for BluetoothInterface {
    /// The server address is the relay's business; only the relay is dialled.
    async fn connect(
        &self,
        server: &ServerInfo,
        _credentials: &Credentials,
    ) -> Result<Box<dyn TransportStream>> {
        debug!(
            "[BT] Connecting to relay {} for {}",
            self.config.relay_address,
            server.address()
        );
        let stream = timeout(
            self.config.relay_timeout,
            TcpStream::connect(&self.config.relay_address),
        )
        .await
        .map_err(|_| anyhow!("relay {} did not answer", self.config.relay_address))??;
        Ok(Box::new(TcpTransportStream::new(stream)))
    }

    fn name(&self) -> &'static str {
        "Bluetooth"
    }

    fn network_type(&self) -> NetworkType {
        NetworkType::Ble
    }
}
