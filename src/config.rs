//! Runner configuration

use crate::network::NetworkConfig;
use demo_runner_shared::{broker, Credentials, ServerInfo};
use std::time::Duration;

/// Configuration for the demo runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Client identifier (thing name) handed to every demo
    pub identifier: String,
    /// Server every demo connects to, whichever network it runs over
    pub server: ServerInfo,
    pub credentials: Credentials,
    pub network: NetworkConfig,
    /// How long the stand-in demos wait for their echo
    pub demo_reply_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            identifier: broker::DEFAULT_IDENTIFIER.into(),
            server: ServerInfo::default(),
            credentials: Credentials::default(),
            network: NetworkConfig::default(),
            demo_reply_timeout: Duration::from_secs(5),
        }
    }
}
