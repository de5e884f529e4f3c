use std::collections::HashMap;

use log::warn;

use crate::{directory::error::DirectoryError, NetworkId, PeerId, PeerIndex, UserId};

struct PeerEntry {
    user: UserId,
    index: PeerIndex,
}

// NetworkPeers
struct NetworkPeers {
    peers: HashMap<PeerId, PeerEntry>,
    index_to_peer: HashMap<PeerIndex, PeerId>,
    users: HashMap<UserId, Vec<PeerId>>,
}

impl NetworkPeers {
    fn new() -> Self {
        Self {
            peers: HashMap::new(),
            index_to_peer: HashMap::new(),
            users: HashMap::new(),
        }
    }

    fn remove_from_user(&mut self, user: &UserId, peer: &PeerId) {
        let Some(user_peers) = self.users.get_mut(user) else {
            return;
        };
        user_peers.retain(|listed| listed != peer);
        if user_peers.is_empty() {
            self.users.remove(user);
        }
    }

    fn remove_index(&mut self, index: PeerIndex, peer: &PeerId) {
        // the slot may already belong to a newer peer
        if self.index_to_peer.get(&index) == Some(peer) {
            self.index_to_peer.remove(&index);
        }
    }
}

/// Outcome of a `PeerJoined` application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerJoin {
    Inserted,
    AlreadyPresent,
}

/// Tracks which peers are connected to each network and which user each
/// peer belongs to. Written only by the core receptors.
pub struct PeerDirectory {
    networks: HashMap<NetworkId, NetworkPeers>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self {
            networks: HashMap::new(),
        }
    }

    // Mutation

    /// Registers `peer` as a member of `user` on `network`. Replaying a join is
    /// harmless: the peer keeps exactly one index entry and one listing.
    pub fn peer_joined(
        &mut self,
        network: &NetworkId,
        peer: &PeerId,
        peer_index: PeerIndex,
        user: &UserId,
    ) -> PeerJoin {
        let network_peers = self
            .networks
            .entry(network.clone())
            .or_insert_with(NetworkPeers::new);

        let mut outcome = PeerJoin::Inserted;

        if let Some(existing) = network_peers.peers.remove(peer) {
            outcome = PeerJoin::AlreadyPresent;
            if existing.index != peer_index {
                network_peers.remove_index(existing.index, peer);
            }
            if existing.user != *user {
                warn!(
                    "peer {} rejoined network {} as user {} (was {})",
                    peer, network, user, existing.user
                );
                network_peers.remove_from_user(&existing.user, peer);
            }
        }

        if let Some(previous) = network_peers.index_to_peer.get(&peer_index) {
            if previous != peer {
                warn!(
                    "peer index {} on network {} reassigned from {} to {}",
                    peer_index, network, previous, peer
                );
            }
        }

        network_peers.peers.insert(
            peer.clone(),
            PeerEntry {
                user: user.clone(),
                index: peer_index,
            },
        );
        network_peers.index_to_peer.insert(peer_index, peer.clone());

        let user_peers = network_peers.users.entry(user.clone()).or_default();
        if !user_peers.contains(peer) {
            user_peers.push(peer.clone());
        }

        outcome
    }

    /// Removes `peer` from `network`, garbage-collecting the user entry and the
    /// network entry once they become empty. Returns the user the peer belonged to.
    pub fn try_peer_left(
        &mut self,
        network: &NetworkId,
        peer: &PeerId,
        user: &UserId,
    ) -> Result<UserId, DirectoryError> {
        let Some(network_peers) = self.networks.get_mut(network) else {
            return Err(DirectoryError::UnknownNetwork {
                network_id: network.to_string(),
                peer_id: peer.to_string(),
            });
        };

        let Some(entry) = network_peers.peers.remove(peer) else {
            return Err(DirectoryError::UnknownPeer {
                network_id: network.to_string(),
                peer_id: peer.to_string(),
            });
        };

        if entry.user != *user {
            warn!(
                "peer {} left network {} claiming user {}, but it joined as {}",
                peer, network, user, entry.user
            );
        }

        network_peers.remove_index(entry.index, peer);
        network_peers.remove_from_user(&entry.user, peer);

        if network_peers.peers.is_empty() {
            self.networks.remove(network);
        }

        Ok(entry.user)
    }

    // Queries

    pub fn has_network(&self, network: &NetworkId) -> bool {
        self.networks.contains_key(network)
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    pub fn contains_peer(&self, network: &NetworkId, peer: &PeerId) -> bool {
        self.networks
            .get(network)
            .is_some_and(|network_peers| network_peers.peers.contains_key(peer))
    }

    pub fn peer_count(&self, network: &NetworkId) -> usize {
        self.networks
            .get(network)
            .map_or(0, |network_peers| network_peers.peers.len())
    }

    pub fn peer_index(&self, network: &NetworkId, peer: &PeerId) -> Option<PeerIndex> {
        let network_peers = self.networks.get(network)?;
        network_peers.peers.get(peer).map(|entry| entry.index)
    }

    pub fn peer_at_index(&self, network: &NetworkId, index: PeerIndex) -> Option<&PeerId> {
        self.networks.get(network)?.index_to_peer.get(&index)
    }

    pub fn peer_user(&self, network: &NetworkId, peer: &PeerId) -> Option<&UserId> {
        let network_peers = self.networks.get(network)?;
        network_peers.peers.get(peer).map(|entry| &entry.user)
    }

    /// Peers of `user` on `network`, in join order
    pub fn user_peers(&self, network: &NetworkId, user: &UserId) -> &[PeerId] {
        self.networks
            .get(network)
            .and_then(|network_peers| network_peers.users.get(user))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn user_connected(&self, network: &NetworkId, user: &UserId) -> bool {
        !self.user_peers(network, user).is_empty()
    }

    pub fn user_count(&self, network: &NetworkId) -> usize {
        self.networks
            .get(network)
            .map_or(0, |network_peers| network_peers.users.len())
    }

    pub fn peers(&self, network: &NetworkId) -> impl Iterator<Item = &PeerId> {
        self.networks
            .get(network)
            .into_iter()
            .flat_map(|network_peers| network_peers.peers.keys())
    }
}

impl Default for PeerDirectory {
    fn default() -> Self {
        Self::new()
    }
}
