use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tether_shared::{EntityUuid, OwnershipRecord, PeerId, UserId};

#[derive(PartialEq, Eq)]
struct WatchKeys {
    owner: UserId,
    peers: Vec<PeerId>,
    parent: EntityUuid,
}

impl WatchKeys {
    fn of(record: &OwnershipRecord) -> Self {
        let mut peers = vec![record.owner_peer().clone()];
        if record.authority() != record.owner_peer() {
            peers.push(record.authority().clone());
        }
        Self {
            owner: record.owner_id().clone(),
            peers,
            parent: record.parent().clone(),
        }
    }
}

/// Reverse indices from the inputs a reactor depends on back to the reactor's
/// entity, so a directory or table change only wakes the reactors it affects
pub(crate) struct WatcherIndex {
    by_user: HashMap<UserId, HashSet<EntityUuid>>,
    by_peer: HashMap<PeerId, HashSet<EntityUuid>>,
    by_parent: HashMap<EntityUuid, HashSet<EntityUuid>>,
    keys: HashMap<EntityUuid, WatchKeys>,
}

impl WatcherIndex {
    pub fn new() -> Self {
        Self {
            by_user: HashMap::new(),
            by_peer: HashMap::new(),
            by_parent: HashMap::new(),
            keys: HashMap::new(),
        }
    }

    pub fn watch(&mut self, record: &OwnershipRecord) {
        let keys = WatchKeys::of(record);
        if self.keys.get(record.entity()) == Some(&keys) {
            return;
        }
        self.unwatch(record.entity());

        let entity = record.entity();
        add(&mut self.by_user, &keys.owner, entity);
        for peer in &keys.peers {
            add(&mut self.by_peer, peer, entity);
        }
        add(&mut self.by_parent, &keys.parent, entity);
        self.keys.insert(entity.clone(), keys);
    }

    pub fn unwatch(&mut self, entity: &EntityUuid) {
        let Some(keys) = self.keys.remove(entity) else {
            return;
        };
        remove(&mut self.by_user, &keys.owner, entity);
        for peer in &keys.peers {
            remove(&mut self.by_peer, peer, entity);
        }
        remove(&mut self.by_parent, &keys.parent, entity);
    }

    pub fn is_watching(&self, entity: &EntityUuid) -> bool {
        self.keys.contains_key(entity)
    }

    pub fn user_watchers(&self, user: &UserId) -> impl Iterator<Item = &EntityUuid> {
        self.by_user.get(user).into_iter().flatten()
    }

    pub fn peer_watchers(&self, peer: &PeerId) -> impl Iterator<Item = &EntityUuid> {
        self.by_peer.get(peer).into_iter().flatten()
    }

    pub fn children(&self, parent: &EntityUuid) -> impl Iterator<Item = &EntityUuid> {
        self.by_parent.get(parent).into_iter().flatten()
    }
}

fn add<K: Eq + Hash + Clone>(map: &mut HashMap<K, HashSet<EntityUuid>>, key: &K, entity: &EntityUuid) {
    map.entry(key.clone()).or_default().insert(entity.clone());
}

fn remove<K: Eq + Hash>(map: &mut HashMap<K, HashSet<EntityUuid>>, key: &K, entity: &EntityUuid) {
    let Some(entities) = map.get_mut(key) else {
        return;
    };
    entities.remove(entity);
    if entities.is_empty() {
        map.remove(key);
    }
}
