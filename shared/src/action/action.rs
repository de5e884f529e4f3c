use crate::{ActionIndex, EntityUuid, NetworkId, PeerId, PeerIndex, UserId};

/// The immutable records that flow through the [`ActionLog`](crate::ActionLog).
/// These are the only legal way to mutate the peer directory or the ownership table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    PeerJoined {
        network: NetworkId,
        peer: PeerId,
        peer_index: PeerIndex,
        user: UserId,
    },
    PeerLeft {
        network: NetworkId,
        peer: PeerId,
        user: UserId,
    },
    SpawnEntity {
        entity: EntityUuid,
        parent: EntityUuid,
        owner: UserId,
        // defaults to the sending peer when omitted
        authority: Option<PeerId>,
    },
    RequestAuthority {
        entity: EntityUuid,
        new_authority: PeerId,
    },
    TransferAuthority {
        entity: EntityUuid,
        owner: UserId,
        new_authority: PeerId,
    },
    DestroyEntity {
        entity: EntityUuid,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    PeerJoined,
    PeerLeft,
    SpawnEntity,
    RequestAuthority,
    TransferAuthority,
    DestroyEntity,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::PeerJoined { .. } => ActionKind::PeerJoined,
            Action::PeerLeft { .. } => ActionKind::PeerLeft,
            Action::SpawnEntity { .. } => ActionKind::SpawnEntity,
            Action::RequestAuthority { .. } => ActionKind::RequestAuthority,
            Action::TransferAuthority { .. } => ActionKind::TransferAuthority,
            Action::DestroyEntity { .. } => ActionKind::DestroyEntity,
        }
    }

    /// The entity this action targets, if any
    pub fn entity(&self) -> Option<&EntityUuid> {
        match self {
            Action::SpawnEntity { entity, .. }
            | Action::RequestAuthority { entity, .. }
            | Action::TransferAuthority { entity, .. }
            | Action::DestroyEntity { entity } => Some(entity),
            Action::PeerJoined { .. } | Action::PeerLeft { .. } => None,
        }
    }
}

/// An [`Action`] together with the metadata the transport attaches to it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRecord {
    /// Assigned by the receiving log, used for tracing only
    pub index: ActionIndex,
    /// The peer that dispatched the action (`$peer`)
    pub sender: PeerId,
    pub action: Action,
}

impl ActionRecord {
    pub fn new(sender: PeerId, action: Action) -> Self {
        Self {
            index: 0,
            sender,
            action,
        }
    }
}
