//! Network interface abstraction handed to demos

use anyhow::Result;
use async_trait::async_trait;
use demo_runner_shared::{Credentials, NetworkType, ServerInfo};
use tokio::io::{AsyncRead, AsyncWrite};

/// A transport stream that can read and write bytes
#[async_trait]
pub trait TransportStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Close the transport gracefully
    async fn shutdown(&mut self) -> Result<()>;
}

/// Per-network-type connector the network manager hands out
#[async_trait]
pub trait NetworkInterface: Send + Sync {
    /// Open a stream to the server over this network
    async fn connect(
        &self,
        server: &ServerInfo,
        credentials: &Credentials,
    ) -> Result<Box<dyn TransportStream>>;

    /// Human-readable name for this interface
    fn name(&self) -> &'static str;

    /// Network type this interface carries traffic over
    fn network_type(&self) -> NetworkType;
}
