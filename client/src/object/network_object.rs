use std::collections::HashMap;

use tether_shared::{EntityUuid, NetworkObjectId, PeerId, UserId};

/// The locally materialized representation of a networked object.
///
/// Rendering, physics and input read `has_authority` to decide whether local
/// input may mutate the object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkObject {
    entity: EntityUuid,
    owner_id: UserId,
    owner_peer: PeerId,
    authority_peer: PeerId,
    network_id: Option<NetworkObjectId>,
    parent: Option<EntityUuid>,
    owned_locally: bool,
    has_authority: bool,
}

impl NetworkObject {
    pub(crate) fn new(entity: EntityUuid, owner_id: UserId, owner_peer: PeerId) -> Self {
        let authority_peer = owner_peer.clone();
        Self {
            entity,
            owner_id,
            owner_peer,
            authority_peer,
            network_id: None,
            parent: None,
            owned_locally: false,
            has_authority: false,
        }
    }

    pub fn entity(&self) -> &EntityUuid {
        &self.entity
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn owner_peer(&self) -> &PeerId {
        &self.owner_peer
    }

    pub fn authority_peer(&self) -> &PeerId {
        &self.authority_peer
    }

    pub fn network_id(&self) -> Option<NetworkObjectId> {
        self.network_id
    }

    /// The parent this object is currently attached to
    pub fn parent(&self) -> Option<&EntityUuid> {
        self.parent.as_ref()
    }

    /// Owned tag: the local user owns this object
    pub fn is_owned_locally(&self) -> bool {
        self.owned_locally
    }

    /// Authority tag: the local peer may write this object's live state
    pub fn has_authority(&self) -> bool {
        self.has_authority
    }

    pub(crate) fn bind(
        &mut self,
        owner_id: &UserId,
        owner_peer: &PeerId,
        authority_peer: &PeerId,
        network_id: Option<NetworkObjectId>,
        local_user: &UserId,
        local_peer: &PeerId,
    ) {
        self.owner_id = owner_id.clone();
        self.owner_peer = owner_peer.clone();
        self.authority_peer = authority_peer.clone();
        self.network_id = network_id;
        self.owned_locally = owner_id == local_user;
        self.has_authority = authority_peer == local_peer;
    }

    pub(crate) fn attach(&mut self, parent: &EntityUuid) {
        self.parent = Some(parent.clone());
    }

    pub(crate) fn detach(&mut self) {
        self.parent = None;
    }
}

/// Cache of every materialized [`NetworkObject`], keyed by UUID
#[derive(Default)]
pub struct NetworkObjects {
    objects: HashMap<EntityUuid, NetworkObject>,
}

impl NetworkObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: &EntityUuid) -> Option<&NetworkObject> {
        self.objects.get(entity)
    }

    pub fn contains(&self, entity: &EntityUuid) -> bool {
        self.objects.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkObject> {
        self.objects.values()
    }

    pub(crate) fn get_mut(&mut self, entity: &EntityUuid) -> Option<&mut NetworkObject> {
        self.objects.get_mut(entity)
    }

    pub(crate) fn insert(&mut self, object: NetworkObject) {
        self.objects.insert(object.entity().clone(), object);
    }

    pub(crate) fn remove(&mut self, entity: &EntityUuid) -> Option<NetworkObject> {
        self.objects.remove(entity)
    }
}
