use thiserror::Error;

/// Errors raised by the [`NetworkRegistry`](crate::NetworkRegistry)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// A network with this id is already registered
    #[error("Network {network_id} is already registered")]
    NetworkAlreadyExists { network_id: String },

    /// The network is not registered
    #[error("Network {network_id} is not registered - operation '{operation}' requires it")]
    NetworkNotFound {
        network_id: String,
        operation: &'static str,
    },

    /// Every peer index of the network has been handed out
    #[error("Network {network_id} has no peer index left to allocate")]
    PeerIndicesExhausted { network_id: String },
}
