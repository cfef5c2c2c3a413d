//! Network interfaces handed to demos by the network manager

pub mod bluetooth;
pub mod tcp;
pub mod traits;

pub use bluetooth::{BluetoothConfig, BluetoothInterface};
pub use tcp::TcpInterface;
pub use traits::{NetworkInterface, TransportStream};
