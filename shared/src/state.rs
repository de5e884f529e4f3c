use std::collections::HashSet;
use std::mem;

use log::{debug, error, warn};

use crate::{
    Action, ActionDispatcher, ActionKind, ActionRecord, EntityUuid, NetworkId, OwnershipTable,
    PeerDirectory, PeerId, UserId,
};

/// A peer joining or leaving, as observed during one drain
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerChange {
    Joined {
        network: NetworkId,
        peer: PeerId,
        user: UserId,
    },
    Left {
        network: NetworkId,
        peer: PeerId,
        user: UserId,
    },
}

/// What the receptors touched since the last [`ReplicatedState::take_changes`]
#[derive(Default, Debug)]
pub struct ChangeSet {
    entities: HashSet<EntityUuid>,
    destroyed: HashSet<EntityUuid>,
    owner_peers: HashSet<PeerId>,
    peers: Vec<PeerChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.destroyed.is_empty()
            && self.owner_peers.is_empty()
            && self.peers.is_empty()
    }

    /// Entities spawned or modified, still present in the table or not
    pub fn entities(&self) -> &HashSet<EntityUuid> {
        &self.entities
    }

    pub fn destroyed(&self) -> &HashSet<EntityUuid> {
        &self.destroyed
    }

    /// Owner peers whose object set changed, so their network ids may have shifted
    pub fn owner_peers(&self) -> &HashSet<PeerId> {
        &self.owner_peers
    }

    pub fn peers(&self) -> &[PeerChange] {
        &self.peers
    }
}

/// The state mutated by the core receptors: the peer directory and the
/// ownership table. Everything outside the receptors reads it only.
pub struct ReplicatedState {
    directory: PeerDirectory,
    ownership: OwnershipTable,
    changes: ChangeSet,
}

impl ReplicatedState {
    pub fn new() -> Self {
        Self {
            directory: PeerDirectory::new(),
            ownership: OwnershipTable::new(),
            changes: ChangeSet::default(),
        }
    }

    pub fn directory(&self) -> &PeerDirectory {
        &self.directory
    }

    pub fn ownership(&self) -> &OwnershipTable {
        &self.ownership
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn take_changes(&mut self) -> ChangeSet {
        mem::take(&mut self.changes)
    }
}

impl Default for ReplicatedState {
    fn default() -> Self {
        Self::new()
    }
}

/// A dispatcher with the six core receptors already registered
pub fn core_dispatcher() -> ActionDispatcher<ReplicatedState> {
    let mut dispatcher = ActionDispatcher::new();
    register_core_receptors(&mut dispatcher);
    dispatcher
}

pub fn register_core_receptors(dispatcher: &mut ActionDispatcher<ReplicatedState>) {
    dispatcher.register(ActionKind::PeerJoined, receive_peer_joined);
    dispatcher.register(ActionKind::PeerLeft, receive_peer_left);
    dispatcher.register(ActionKind::SpawnEntity, receive_spawn_entity);
    dispatcher.register(ActionKind::RequestAuthority, receive_request_authority);
    dispatcher.register(ActionKind::TransferAuthority, receive_transfer_authority);
    dispatcher.register(ActionKind::DestroyEntity, receive_destroy_entity);
}

fn receive_peer_joined(state: &mut ReplicatedState, record: &ActionRecord) {
    let Action::PeerJoined {
        network,
        peer,
        peer_index,
        user,
    } = &record.action
    else {
        return;
    };
    state.directory.peer_joined(network, peer, *peer_index, user);
    state.changes.peers.push(PeerChange::Joined {
        network: network.clone(),
        peer: peer.clone(),
        user: user.clone(),
    });
}

fn receive_peer_left(state: &mut ReplicatedState, record: &ActionRecord) {
    let Action::PeerLeft {
        network,
        peer,
        user,
    } = &record.action
    else {
        return;
    };
    match state.directory.try_peer_left(network, peer, user) {
        Ok(user) => {
            state.changes.peers.push(PeerChange::Left {
                network: network.clone(),
                peer: peer.clone(),
                user,
            });
        }
        Err(err) => {
            error!("action #{} dropped: {}", record.index, err);
        }
    }
}

fn receive_spawn_entity(state: &mut ReplicatedState, record: &ActionRecord) {
    let Action::SpawnEntity {
        entity,
        parent,
        owner,
        authority,
    } = &record.action
    else {
        return;
    };
    let previous_owner_peer = state
        .ownership
        .get(entity)
        .map(|existing| existing.owner_peer().clone());
    let authority = authority.clone().or_else(|| Some(record.sender.clone()));

    match state
        .ownership
        .try_spawn(entity, parent, owner, &record.sender, authority)
    {
        Ok(outcome) => {
            debug!("spawn of {} by {}: {:?}", entity, record.sender, outcome);
            state.changes.entities.insert(entity.clone());
            state.changes.destroyed.remove(entity);
            state.changes.owner_peers.insert(record.sender.clone());
            if let Some(previous) = previous_owner_peer {
                state.changes.owner_peers.insert(previous);
            }
        }
        Err(err) => {
            warn!("action #{} dropped: {}", record.index, err);
        }
    }
}

fn receive_request_authority(state: &mut ReplicatedState, record: &ActionRecord) {
    let Action::RequestAuthority {
        entity,
        new_authority,
    } = &record.action
    else {
        return;
    };
    match state.ownership.try_request_authority(entity, new_authority) {
        Ok(()) => {
            state.changes.entities.insert(entity.clone());
        }
        Err(err) => {
            warn!("action #{} dropped: {}", record.index, err);
        }
    }
}

fn receive_transfer_authority(state: &mut ReplicatedState, record: &ActionRecord) {
    let Action::TransferAuthority {
        entity,
        owner,
        new_authority,
    } = &record.action
    else {
        return;
    };
    match state
        .ownership
        .try_transfer_authority(entity, owner, new_authority)
    {
        Ok(changed) => {
            if changed {
                debug!("authority over {} committed to {}", entity, new_authority);
            }
            state.changes.entities.insert(entity.clone());
        }
        Err(err) => {
            warn!("action #{} dropped: {}", record.index, err);
        }
    }
}

fn receive_destroy_entity(state: &mut ReplicatedState, record: &ActionRecord) {
    let Action::DestroyEntity { entity } = &record.action else {
        return;
    };
    match state.ownership.destroy(entity) {
        Some(destroyed) => {
            state.changes.entities.remove(entity);
            state.changes.destroyed.insert(entity.clone());
            state.changes.owner_peers.insert(destroyed.owner_peer().clone());
        }
        None => {
            debug!("destroy of unknown entity {} ignored", entity);
        }
    }
}
