//! Network Resolver
//!
//! Picks the single network type a demo runs over when several acceptable
//! networks are connected at once.

use crate::{DispatchError, NetworkType, NetworkTypes};

/// Preference order: always-on TCP/IP first, then Bluetooth, then the rest
const PRIORITY: [NetworkType; 3] = [NetworkType::Wifi, NetworkType::Ble, NetworkType::Ethernet];

/// The network a demo was committed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub network: NetworkType,
    /// Keep-alive mode flag handed to the demo
    pub mqtt_mode: bool,
}

/// Resolve the network type to use from the connected and acceptable masks
pub fn resolve(
    available: NetworkTypes,
    acceptable: NetworkTypes,
) -> Result<Selection, DispatchError> {
    let usable = available & acceptable;

    PRIORITY
        .into_iter()
        .find(|network| usable.contains(*network))
        .map(|network| Selection {
            network,
            mqtt_mode: network.keeps_alive(),
        })
        .ok_or(DispatchError::Unsupported {
            available,
            acceptable,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_masks() -> impl Iterator<Item = NetworkTypes> {
        (0..8).map(NetworkTypes::from_bits_truncate)
    }

    #[test]
    fn test_wifi_wins_when_usable() {
        for available in all_masks() {
            for acceptable in all_masks() {
                let usable = available & acceptable;
                if usable.contains(NetworkType::Wifi) {
                    let selection = resolve(available, acceptable).unwrap();
                    assert_eq!(selection.network, NetworkType::Wifi);
                }
            }
        }
    }

    #[test]
    fn test_unsupported_iff_no_overlap() {
        for available in all_masks() {
            for acceptable in all_masks() {
                let result = resolve(available, acceptable);
                assert_eq!(result.is_err(), (available & acceptable).is_empty());
            }
        }
    }

    #[test]
    fn test_mqtt_mode_follows_transport() {
        for available in all_masks() {
            for acceptable in all_masks() {
                if let Ok(selection) = resolve(available, acceptable) {
                    assert_eq!(selection.mqtt_mode, selection.network != NetworkType::Ble);
                }
            }
        }
    }

    #[test]
    fn test_ble_chosen_over_ethernet() {
        let both = NetworkType::Ble | NetworkType::Ethernet;
        let selection = resolve(both, both).unwrap();
        assert_eq!(selection.network, NetworkType::Ble);
        assert!(!selection.mqtt_mode);
    }

    #[test]
    fn test_unacceptable_network_ignored() {
        let available = NetworkType::Wifi | NetworkType::Ble;
        let acceptable = NetworkTypes::from(NetworkType::Ble);

        let selection = resolve(available, acceptable).unwrap();
        assert_eq!(selection.network, NetworkType::Ble);

        let err = resolve(NetworkType::Wifi.into(), acceptable).unwrap_err();
        assert!(matches!(err, DispatchError::Unsupported { .. }));
    }
}
