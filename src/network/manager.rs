//! Network manager owning connectivity state and state-change subscriptions

use crate::transport::{BluetoothConfig, BluetoothInterface, NetworkInterface, TcpInterface};
use demo_runner_shared::{NetworkError, NetworkState, NetworkType, NetworkTypes};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info};

/// Callback invoked on every state change of a subscribed network type.
///
/// Runs on whichever task reported the change and must not block.
pub type StateChangeCallback = Arc<dyn Fn(NetworkType, NetworkState) + Send + Sync>;

/// Handle returned by a successful subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Connectivity services consumed by the dispatch flow
pub trait NetworkManager: Send + Sync {
    /// Mask of currently connected network types
    fn connected_networks(&self) -> NetworkTypes;

    /// Register `callback` for state changes of any type in `types`
    fn subscribe(
        &self,
        types: NetworkTypes,
        callback: StateChangeCallback,
    ) -> Result<SubscriptionId, NetworkError>;

    /// Drop a subscription; unknown ids are ignored
    fn remove_subscription(&self, id: SubscriptionId);

    /// Interface used to reach the server over `network`
    fn network_interface(&self, network: NetworkType) -> Option<Arc<dyn NetworkInterface>>;
}

/// Configuration for the network manager and its link probes
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Manage the WiFi network
    pub wifi_enabled: bool,
    /// Manage the BLE network with this configuration
    pub bluetooth: Option<BluetoothConfig>,
    /// Manage a wired network
    pub ethernet_enabled: bool,
    /// Delay between probes of a link that is up
    pub probe_interval: Duration,
    /// Reconnection delay (initial)
    pub reconnect_delay: Duration,
    /// Maximum reconnection delay
    pub max_reconnect_delay: Duration,
    /// Connection timeout for a single probe
    pub connect_timeout: Duration,
    /// Size of the subscription table
    pub max_subscriptions: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_enabled: true,
            bluetooth: Some(BluetoothConfig::default()),
            ethernet_enabled: false,
            probe_interval: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            max_subscriptions: 8,
        }
    }
}

struct Subscription {
    types: NetworkTypes,
    callback: StateChangeCallback,
}

#[derive(Default)]
struct LinkTable {
    connected: NetworkTypes,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    next_id: u64,
}

/// In-process network manager driven by link probes
pub struct LinkManager {
    interfaces: HashMap<NetworkType, Arc<dyn NetworkInterface>>,
    max_subscriptions: usize,
    table: RwLock<LinkTable>,
}

impl LinkManager {
    /// Create a manager with no interfaces
    pub fn new(max_subscriptions: usize) -> Self {
        Self {
            interfaces: HashMap::new(),
            max_subscriptions,
            table: RwLock::new(LinkTable::default()),
        }
    }

    /// Create a manager with the interfaces enabled in `config`
    pub fn from_config(config: &NetworkConfig) -> Self {
        let mut manager = Self::new(config.max_subscriptions);
        if config.wifi_enabled {
            manager = manager.with_interface(Arc::new(TcpInterface::wifi()));
        }
        if let Some(bluetooth) = &config.bluetooth {
            manager = manager.with_interface(Arc::new(BluetoothInterface::new(bluetooth.clone())));
        }
        if config.ethernet_enabled {
            manager = manager.with_interface(Arc::new(TcpInterface::ethernet()));
        }
        manager
    }

    /// Manage the network type carried by `interface`
    pub fn with_interface(mut self, interface: Arc<dyn NetworkInterface>) -> Self {
        self.interfaces.insert(interface.network_type(), interface);
        self
    }

    /// Mask of all managed network types
    pub fn managed_networks(&self) -> NetworkTypes {
        self.interfaces
            .keys()
            .fold(NetworkTypes::NONE, |mask, network| mask | *network)
    }

    /// Number of live subscriptions
    #[cfg(test)]
    pub fn subscription_count(&self) -> usize {
        self.read_table().subscriptions.len()
    }

    /// Record a state change and notify subscribers.
    ///
    /// Returns `false` when the state was already current; nobody is notified then.
    pub fn set_state(&self, network: NetworkType, state: NetworkState) -> bool {
        let callbacks: Vec<StateChangeCallback> = {
            let mut table = self.write_table();
            let was_connected = table.connected.contains(network);
            match state {
                NetworkState::Enabled if !was_connected => table.connected.insert(network),
                NetworkState::Disabled if was_connected => table.connected.remove(network),
                _ => return false,
            }
            table
                .subscriptions
                .values()
                .filter(|sub| sub.types.contains(network))
                .map(|sub| sub.callback.clone())
                .collect()
        };

        info!("[NET] {} {:?} ({} subscriber(s))", network, state, callbacks.len());

        // Callbacks may call back into the manager
        for callback in callbacks {
            callback(network, state);
        }
        true
    }

    fn read_table(&self) -> RwLockReadGuard<'_, LinkTable> {
        self.table.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, LinkTable> {
        self.table.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NetworkManager for LinkManager {
    fn connected_networks(&self) -> NetworkTypes {
        self.read_table().connected
    }

    fn subscribe(
        &self,
        types: NetworkTypes,
        callback: StateChangeCallback,
    ) -> Result<SubscriptionId, NetworkError> {
        if (types & self.managed_networks()).is_empty() {
            return Err(NetworkError::NoManagedTypes(types));
        }

        let mut table = self.write_table();
        if table.subscriptions.len() >= self.max_subscriptions {
            return Err(NetworkError::SubscriptionLimit {
                max: self.max_subscriptions,
            });
        }

        table.next_id += 1;
        let id = SubscriptionId(table.next_id);
        table.subscriptions.insert(id, Subscription { types, callback });
        debug!("[NET] Subscription {:?} registered for {}", id, types);
        Ok(id)
    }

    fn remove_subscription(&self, id: SubscriptionId) {
        if self.write_table().subscriptions.remove(&id).is_some() {
            debug!("[NET] Subscription {:?} removed", id);
        }
    }

    fn network_interface(&self, network: NetworkType) -> Option<Arc<dyn NetworkInterface>> {
        self.interfaces.get(&network).cloned()
    }
}
