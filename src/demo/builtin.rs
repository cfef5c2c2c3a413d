//! Stand-in demos used by the runner binary
//!
//! They only exercise the resolved interface with a line echo; the real
//! demo protocols live elsewhere.

use super::{Demo, DemoConnection, DemoStatus, DEMO_FAILURE, DEMO_SUCCESS};
use crate::transport::{NetworkInterface, TransportStream};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Sends one line over the resolved interface and expects it echoed back
pub struct EchoDemo {
    name: String,
    reply_timeout: Duration,
}

impl EchoDemo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reply_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    async fn exchange(&self, connection: &DemoConnection) -> Result<()> {
        let interface = connection
            .interface
            .as_ref()
            .ok_or_else(|| anyhow!("no network interface"))?;

        let mut stream = interface
            .connect(&connection.server, &connection.credentials)
            .await?;

        let line = format!(
            "{} {} keepalive={}\n",
            connection.identifier, self.name, connection.mqtt_mode
        );
        stream.write_all(line.as_bytes()).await?;

        let mut reply = vec![0u8; line.len()];
        timeout(self.reply_timeout, stream.read_exact(&mut reply))
            .await
            .map_err(|_| anyhow!("no echo within {:?}", self.reply_timeout))??;

        TransportStream::shutdown(&mut *stream).await?;

        if reply != line.as_bytes() {
            return Err(anyhow!("echo mismatch"));
        }
        Ok(())
    }
}

#[async_trait]
impl Demo for EchoDemo {
    async fn run(&self, connection: DemoConnection) -> DemoStatus {
        info!(
            "[DEMO] {} over {} (mqtt_mode={})",
            self.name,
            connection.interface.as_ref().map_or("none", |i| i.name()),
            connection.mqtt_mode
        );
        match self.exchange(&connection).await {
            Ok(()) => DEMO_SUCCESS,
            Err(e) => {
                error!("[DEMO] {} failed: {}", self.name, e);
                DEMO_FAILURE
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Echo demo that follows network transitions after it started
pub struct BleEchoDemo {
    inner: EchoDemo,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl BleEchoDemo {
    pub fn new(inner: EchoDemo) -> Self {
        Self {
            inner,
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// Number of connect and disconnect notifications seen
    pub fn transitions(&self) -> (usize, usize) {
        (
            self.connects.load(Ordering::SeqCst),
            self.disconnects.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl Demo for BleEchoDemo {
    async fn run(&self, connection: DemoConnection) -> DemoStatus {
        let status = self.inner.run(connection).await;
        let (connects, disconnects) = self.transitions();
        info!(
            "[DEMO] {} saw {} network up and {} network down event(s)",
            self.inner.name, connects, disconnects
        );
        status
    }

    fn on_network_connected(&self, connection: DemoConnection) {
        self.connects.fetch_add(1, Ordering::SeqCst);
        info!(
            "[DEMO] {} network up: {} (mqtt_mode={})",
            self.inner.name,
            connection.interface.as_ref().map_or("none", |i| i.name()),
            connection.mqtt_mode
        );
    }

    fn on_network_disconnected(&self, interface: Option<Arc<dyn NetworkInterface>>) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        warn!(
            "[DEMO] {} network down: {}",
            self.inner.name,
            interface.as_ref().map_or("none", |i| i.name())
        );
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
