//! Network connectivity management
//!
//! This module handles:
//! - Connectivity state per network type, with state-change subscriptions
//! - Per-type network interfaces handed to demos
//! - Background link probes that report transitions

mod manager;
mod probe;

pub use manager::{
    LinkManager, NetworkConfig, NetworkManager, StateChangeCallback, SubscriptionId,
};
pub use probe::spawn_probes;
