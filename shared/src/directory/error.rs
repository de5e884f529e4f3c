use thiserror::Error;

/// Inconsistencies detected while applying peer churn to the
/// [`PeerDirectory`](crate::PeerDirectory). These are expected under duplicated
/// or reordered delivery and are never fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The network has no directory entry (no peer ever joined, or all have left)
    #[error("Peer {peer_id} left network {network_id}, which has no known peers")]
    UnknownNetwork { network_id: String, peer_id: String },

    /// The peer is not listed in the network
    #[error("Peer {peer_id} left network {network_id} but was never registered there")]
    UnknownPeer { network_id: String, peer_id: String },
}
