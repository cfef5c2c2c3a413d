//! Error types for network management and demo dispatch

use thiserror::Error;

use crate::NetworkTypes;

/// Reasons a dispatch flow ends without running its demo.
///
/// None of these leave the flow that produced them and none are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Availability gate could not be created: {0}")]
    Resource(String),

    #[error("Network manager rejected subscription: {0}")]
    Subscription(String),

    #[error("No supported network: available={available} acceptable={acceptable}")]
    Unsupported {
        available: NetworkTypes,
        acceptable: NetworkTypes,
    },
}

/// Errors returned by a network manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Subscription table full ({max} entries)")]
    SubscriptionLimit { max: usize },

    #[error("None of the requested network types are managed: {0}")]
    NoManagedTypes(NetworkTypes),
}

impl From<NetworkError> for DispatchError {
    fn from(err: NetworkError) -> Self {
        DispatchError::Subscription(err.to_string())
    }
}
