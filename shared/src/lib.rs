//! Demo Runner Shared Types
//!
//! This crate provides the network model, the network resolver and the
//! dispatch state machine shared by the demo runner and its tests.

pub mod error;
pub mod resolver;
pub mod state_machine;

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

pub use error::{DispatchError, NetworkError};
pub use resolver::{resolve, Selection};

/// Broker connection defaults
pub mod broker {
    /// Default broker host when none is configured
    pub const DEFAULT_HOST: &str = "127.0.0.1";

    /// Default secure MQTT port
    pub const DEFAULT_PORT: u16 = 8883;

    /// Default client identifier (thing name)
    pub const DEFAULT_IDENTIFIER: &str = "demo-runner-001";
}

/// TLS negotiation parameters
pub mod tls {
    /// ALPN is only negotiated on the reserved HTTPS port
    pub const ALPN_PORT: u16 = 443;

    /// ALPN protocol name used for MQTT over port 443
    pub const MQTT_ALPN_PROTOCOL: &str = "x-amzn-mqtt-ca";
}

/// A transport class managed by the network manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkType {
    Wifi,
    Ble,
    Ethernet,
}

impl NetworkType {
    /// All known types, in resolver priority order
    pub const ALL: [NetworkType; 3] = [NetworkType::Wifi, NetworkType::Ble, NetworkType::Ethernet];

    /// Bit assigned to this type in a [`NetworkTypes`] mask
    pub const fn bit(self) -> u32 {
        match self {
            NetworkType::Wifi => 0x0000_0001,
            NetworkType::Ble => 0x0000_0002,
            NetworkType::Ethernet => 0x0000_0004,
        }
    }

    /// Type owning exactly the bit `bits`, if any
    pub fn from_bit(bits: u32) -> Option<NetworkType> {
        Self::ALL.into_iter().find(|network| network.bit() == bits)
    }

    /// Whether the protocol layer should send keep-alive traffic over this type.
    ///
    /// BLE links are not always-on, so keep-alive is disabled for them.
    pub const fn keeps_alive(self) -> bool {
        !matches!(self, NetworkType::Ble)
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkType::Wifi => write!(f, "WiFi"),
            NetworkType::Ble => write!(f, "BLE"),
            NetworkType::Ethernet => write!(f, "Ethernet"),
        }
    }
}

/// Bitmask of network types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NetworkTypes(u32);

impl NetworkTypes {
    pub const NONE: NetworkTypes = NetworkTypes(0);

    const KNOWN_BITS: u32 = 0x0000_0007;

    /// Build a mask from raw bits, dropping bits that name no known type
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::KNOWN_BITS)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, network: NetworkType) -> bool {
        self.0 & network.bit() != 0
    }

    pub const fn intersection(self, other: NetworkTypes) -> NetworkTypes {
        NetworkTypes(self.0 & other.0)
    }

    pub fn insert(&mut self, network: NetworkType) {
        self.0 |= network.bit();
    }

    pub fn remove(&mut self, network: NetworkType) {
        self.0 &= !network.bit();
    }

    /// Iterate over the contained types in priority order
    pub fn iter(self) -> impl Iterator<Item = NetworkType> {
        NetworkType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl From<NetworkType> for NetworkTypes {
    fn from(network: NetworkType) -> Self {
        NetworkTypes(network.bit())
    }
}

impl BitOr for NetworkTypes {
    type Output = NetworkTypes;

    fn bitor(self, rhs: NetworkTypes) -> NetworkTypes {
        NetworkTypes(self.0 | rhs.0)
    }
}

impl BitOr<NetworkType> for NetworkTypes {
    type Output = NetworkTypes;

    fn bitor(self, rhs: NetworkType) -> NetworkTypes {
        NetworkTypes(self.0 | rhs.bit())
    }
}

impl BitOr for NetworkType {
    type Output = NetworkTypes;

    fn bitor(self, rhs: NetworkType) -> NetworkTypes {
        NetworkTypes(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<NetworkType> for NetworkTypes {
    fn bitor_assign(&mut self, rhs: NetworkType) {
        self.insert(rhs);
    }
}

impl BitAnd for NetworkTypes {
    type Output = NetworkTypes;

    fn bitand(self, rhs: NetworkTypes) -> NetworkTypes {
        self.intersection(rhs)
    }
}

impl fmt::Display for NetworkTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<String> = self.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", names.join("|"))
    }
}

/// Connectivity state reported by the network manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkState {
    Enabled,
    Disabled,
}

/// Where the demo connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub host: String,
    pub port: u16,
}

impl ServerInfo {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port` form accepted by socket connectors
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self::new(broker::DEFAULT_HOST, broker::DEFAULT_PORT)
    }
}

/// TLS parameters handed to the demo along with the server info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// ALPN protocol list, `None` when ALPN must not be negotiated
    pub alpn_protocols: Option<Vec<String>>,
    pub disable_sni: bool,
}

impl Credentials {
    /// Copy of these credentials usable against `server`.
    ///
    /// ALPN only works over port 443, so it is cleared for any other port.
    pub fn for_server(&self, server: &ServerInfo) -> Credentials {
        let mut credentials = self.clone();
        if server.port != tls::ALPN_PORT {
            credentials.alpn_protocols = None;
        }
        credentials
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            alpn_protocols: Some(vec![tls::MQTT_ALPN_PROTOCOL.to_string()]),
            disable_sni: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_operations() {
        let mut mask = NetworkType::Wifi | NetworkType::Ble;
        assert!(mask.contains(NetworkType::Wifi));
        assert!(mask.contains(NetworkType::Ble));
        assert!(!mask.contains(NetworkType::Ethernet));

        mask.remove(NetworkType::Wifi);
        assert_eq!(mask, NetworkTypes::from(NetworkType::Ble));

        mask |= NetworkType::Ethernet;
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![NetworkType::Ble, NetworkType::Ethernet]);
    }

    #[test]
    fn test_unknown_bits_truncated() {
        let mask = NetworkTypes::from_bits_truncate(0xFFFF_FF00);
        assert!(mask.is_empty());
        assert_eq!(NetworkTypes::from_bits_truncate(0x13).bits(), 0x3);
    }

    #[test]
    fn test_mask_display() {
        assert_eq!(NetworkTypes::NONE.to_string(), "none");
        assert_eq!((NetworkType::Ble | NetworkType::Wifi).to_string(), "WiFi|BLE");
    }

    #[test]
    fn test_from_bit() {
        for network in NetworkType::ALL {
            assert_eq!(NetworkType::from_bit(network.bit()), Some(network));
        }
        assert_eq!(NetworkType::from_bit(0), None);
        assert_eq!(NetworkType::from_bit(0x3), None);
    }

    #[test]
    fn test_keep_alive_per_type() {
        assert!(NetworkType::Wifi.keeps_alive());
        assert!(NetworkType::Ethernet.keeps_alive());
        assert!(!NetworkType::Ble.keeps_alive());
    }

    #[test]
    fn test_alpn_cleared_off_port_443() {
        let credentials = Credentials::default();

        let tls_port = credentials.for_server(&ServerInfo::new("broker", 443));
        assert_eq!(tls_port.alpn_protocols, credentials.alpn_protocols);

        let mqtt_port = credentials.for_server(&ServerInfo::default());
        assert!(mqtt_port.alpn_protocols.is_none());
        assert_eq!(mqtt_port.disable_sni, credentials.disable_sni);
    }
}
