use std::collections::HashMap;

use log::info;

use crate::{
    network::{
        error::NetworkError,
        peer_index_allocator::{PeerIndexAllocator, PeerIndexPolicy},
    },
    NetworkId, NetworkTopic, PeerId, PeerIndex,
};

pub struct Network {
    id: NetworkId,
    topic: NetworkTopic,
    host_peer: Option<PeerId>,
    peer_indices: PeerIndexAllocator,
}

impl Network {
    fn new(id: NetworkId, topic: NetworkTopic, host_peer: Option<PeerId>, policy: PeerIndexPolicy) -> Self {
        Self {
            id,
            topic,
            host_peer,
            peer_indices: PeerIndexAllocator::new(policy),
        }
    }

    pub fn id(&self) -> &NetworkId {
        &self.id
    }

    pub fn topic(&self) -> NetworkTopic {
        self.topic
    }

    /// Absent for peer-to-peer topologies
    pub fn host_peer(&self) -> Option<&PeerId> {
        self.host_peer.as_ref()
    }

    pub fn is_hosted_by(&self, peer: &PeerId) -> bool {
        self.host_peer.as_ref() == Some(peer)
    }
}

/// Networks known to this process, created and destroyed by the transport layer.
/// Host changes are local to this registry and must be mirrored by the
/// transport on every peer.
pub struct NetworkRegistry {
    networks: HashMap<NetworkId, Network>,
    index_policy: PeerIndexPolicy,
}

impl NetworkRegistry {
    pub fn new(index_policy: PeerIndexPolicy) -> Self {
        Self {
            networks: HashMap::new(),
            index_policy,
        }
    }

    pub fn add_network(
        &mut self,
        id: NetworkId,
        topic: NetworkTopic,
        host_peer: Option<PeerId>,
    ) -> Result<(), NetworkError> {
        if self.networks.contains_key(&id) {
            return Err(NetworkError::NetworkAlreadyExists {
                network_id: id.to_string(),
            });
        }
        info!("network {} ({:?}) registered, host: {:?}", id, topic, host_peer);
        let network = Network::new(id.clone(), topic, host_peer, self.index_policy);
        self.networks.insert(id, network);
        Ok(())
    }

    pub fn remove_network(&mut self, id: &NetworkId) -> Option<Network> {
        self.networks.remove(id)
    }

    pub fn set_host(&mut self, id: &NetworkId, host_peer: Option<PeerId>) -> Result<(), NetworkError> {
        let network = self.network_mut(id, "set_host")?;
        info!("network {} host changed: {:?} -> {:?}", id, network.host_peer, host_peer);
        network.host_peer = host_peer;
        Ok(())
    }

    pub fn network(&self, id: &NetworkId) -> Option<&Network> {
        self.networks.get(id)
    }

    pub fn has_network(&self, id: &NetworkId) -> bool {
        self.networks.contains_key(id)
    }

    pub fn host_peer(&self, id: &NetworkId) -> Option<&PeerId> {
        self.networks.get(id).and_then(Network::host_peer)
    }

    /// The network serving `topic`. When several do, the lowest-sorted id wins.
    pub fn network_for_topic(&self, topic: NetworkTopic) -> Option<&NetworkId> {
        self.networks
            .values()
            .filter(|network| network.topic == topic)
            .map(Network::id)
            .min()
    }

    /// Hands `peer` its index on network `id`, to be carried by the `PeerJoined` action
    pub fn allocate_peer_index(&mut self, id: &NetworkId, peer: &PeerId) -> Result<PeerIndex, NetworkError> {
        let network = self.network_mut(id, "allocate_peer_index")?;
        network
            .peer_indices
            .allocate(peer)
            .ok_or_else(|| NetworkError::PeerIndicesExhausted {
                network_id: id.to_string(),
            })
    }

    pub fn release_peer_index(&mut self, id: &NetworkId, peer: &PeerId) -> Result<Option<PeerIndex>, NetworkError> {
        let network = self.network_mut(id, "release_peer_index")?;
        Ok(network.peer_indices.release(peer))
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    fn network_mut(&mut self, id: &NetworkId, operation: &'static str) -> Result<&mut Network, NetworkError> {
        self.networks
            .get_mut(id)
            .ok_or_else(|| NetworkError::NetworkNotFound {
                network_id: id.to_string(),
                operation,
            })
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new(PeerIndexPolicy::default())
    }
}
