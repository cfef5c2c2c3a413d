//! Per-demo context shared by the dispatch flow and its event bridge

use crate::demo::{Demo, DemoKind};
use demo_runner_shared::{NetworkType, NetworkTypes};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const NO_NETWORK: u32 = 0;

/// One demo instance: what it accepts, what it committed to, what it runs
pub struct DemoContext {
    name: String,
    acceptable: NetworkTypes,
    /// Bit of the committed network type, `NO_NETWORK` when none
    connected: AtomicU32,
    demo: Arc<dyn Demo>,
}

impl DemoContext {
    /// Context for one of the known demo kinds
    pub fn new(kind: DemoKind, demo: Arc<dyn Demo>) -> Self {
        Self::with_networks(kind.task_name(), kind.acceptable_networks(), demo)
    }

    pub fn with_networks(name: impl Into<String>, acceptable: NetworkTypes, demo: Arc<dyn Demo>) -> Self {
        Self {
            name: name.into(),
            acceptable,
            connected: AtomicU32::new(NO_NETWORK),
            demo,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn acceptable_networks(&self) -> NetworkTypes {
        self.acceptable
    }

    pub fn demo(&self) -> &Arc<dyn Demo> {
        &self.demo
    }

    /// Network the flow committed to, `None` before commit or after its disconnect
    pub fn connected_network(&self) -> Option<NetworkType> {
        NetworkType::from_bit(self.connected.load(Ordering::SeqCst))
    }

    /// Record the resolver's choice. Only acceptable types can be committed.
    pub fn commit(&self, network: NetworkType) {
        debug_assert!(self.acceptable.contains(network));
        self.connected.store(network.bit(), Ordering::SeqCst);
    }

    /// Reset to no network if `network` is the committed one
    pub fn clear_if_connected(&self, network: NetworkType) -> bool {
        self.connected
            .compare_exchange(network.bit(), NO_NETWORK, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::EchoDemo;

    fn context() -> DemoContext {
        DemoContext::new(DemoKind::BleMqttEcho, Arc::new(EchoDemo::new("echo")))
    }

    #[test]
    fn test_new_context_has_no_network() {
        let ctx = context();
        assert_eq!(ctx.name(), "BLEMQTTEchoDemo");
        assert_eq!(ctx.connected_network(), None);
        assert_eq!(ctx.acceptable_networks(), NetworkType::Ble | NetworkType::Wifi);
    }

    #[test]
    fn test_commit_and_clear() {
        let ctx = context();
        ctx.commit(NetworkType::Ble);
        assert_eq!(ctx.connected_network(), Some(NetworkType::Ble));

        // A different type going down is not ours to clear
        assert!(!ctx.clear_if_connected(NetworkType::Wifi));
        assert_eq!(ctx.connected_network(), Some(NetworkType::Ble));

        assert!(ctx.clear_if_connected(NetworkType::Ble));
        assert_eq!(ctx.connected_network(), None);
        assert!(!ctx.clear_if_connected(NetworkType::Ble));
    }
}
