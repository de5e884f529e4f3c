use crate::{EntityUuid, PeerId, UserId};

/// Who owns a networked object and who may currently write to it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnershipRecord {
    entity: EntityUuid,
    parent: EntityUuid,
    owner_id: UserId,
    owner_peer: PeerId,
    authority_peer_id: Option<PeerId>,
    requesting_peer_id: Option<PeerId>,
}

impl OwnershipRecord {
    pub fn new(
        entity: EntityUuid,
        parent: EntityUuid,
        owner_id: UserId,
        owner_peer: PeerId,
        authority_peer_id: Option<PeerId>,
    ) -> Self {
        Self {
            entity,
            parent,
            owner_id,
            owner_peer,
            authority_peer_id,
            requesting_peer_id: None,
        }
    }

    pub fn entity(&self) -> &EntityUuid {
        &self.entity
    }

    pub fn parent(&self) -> &EntityUuid {
        &self.parent
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// The peer that spawned the object
    pub fn owner_peer(&self) -> &PeerId {
        &self.owner_peer
    }

    pub fn authority_peer_id(&self) -> Option<&PeerId> {
        self.authority_peer_id.as_ref()
    }

    pub fn requesting_peer_id(&self) -> Option<&PeerId> {
        self.requesting_peer_id.as_ref()
    }

    /// The peer allowed to write right now: the authority peer, or the owner peer if unset
    pub fn authority(&self) -> &PeerId {
        self.authority_peer_id.as_ref().unwrap_or(&self.owner_peer)
    }

    pub fn is_scene_owned(&self) -> bool {
        self.owner_id.is_scene()
    }

    pub(crate) fn set_requesting_peer(&mut self, peer: PeerId) {
        self.requesting_peer_id = Some(peer);
    }

    // the only write path for authority, clears any pending request with it
    pub(crate) fn commit_authority(&mut self, peer: PeerId) {
        self.authority_peer_id = Some(peer);
        self.requesting_peer_id = None;
    }
}
