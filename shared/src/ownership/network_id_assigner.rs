use std::collections::HashMap;

use crate::{EntityUuid, NetworkObjectId, PeerId};

/// Derives dense network ids from the ownership table.
///
/// Every owner peer keeps its object UUIDs in sorted order; an object's id is
/// its position in that list. Replicas holding the same records therefore agree
/// on every id without exchanging a message. Ids are unique only within one
/// owner peer's set, so `(owner_peer, id)` is the wire handle.
pub struct NetworkIdAssigner {
    // each list sorted ascending
    by_owner_peer: HashMap<PeerId, Vec<EntityUuid>>,
}

impl NetworkIdAssigner {
    pub fn new() -> Self {
        Self {
            by_owner_peer: HashMap::new(),
        }
    }

    pub fn insert(&mut self, owner_peer: &PeerId, entity: &EntityUuid) {
        let entities = self.by_owner_peer.entry(owner_peer.clone()).or_default();
        if let Err(position) = entities.binary_search(entity) {
            entities.insert(position, entity.clone());
        }
    }

    pub fn remove(&mut self, owner_peer: &PeerId, entity: &EntityUuid) {
        let Some(entities) = self.by_owner_peer.get_mut(owner_peer) else {
            return;
        };
        if let Ok(position) = entities.binary_search(entity) {
            entities.remove(position);
        }
        if entities.is_empty() {
            self.by_owner_peer.remove(owner_peer);
        }
    }

    pub fn network_id(&self, owner_peer: &PeerId, entity: &EntityUuid) -> Option<NetworkObjectId> {
        let entities = self.by_owner_peer.get(owner_peer)?;
        let position = entities.binary_search(entity).ok()?;
        NetworkObjectId::try_from(position).ok()
    }

    pub fn entity_for(&self, owner_peer: &PeerId, id: NetworkObjectId) -> Option<&EntityUuid> {
        let entities = self.by_owner_peer.get(owner_peer)?;
        entities.get(usize::try_from(id).ok()?)
    }

    /// All entities spawned by `owner_peer`, in network-id order
    pub fn entities(&self, owner_peer: &PeerId) -> &[EntityUuid] {
        self.by_owner_peer
            .get(owner_peer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for NetworkIdAssigner {
    fn default() -> Self {
        Self::new()
    }
}
