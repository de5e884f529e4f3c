//! # Tether Shared
//! Peer directory, action log and entity ownership table shared by every
//! tether peer. All mutation of the directory and the table flows through
//! the action receptors registered in [`state`].

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod action;
mod directory;
mod network;
mod ownership;
mod types;

pub mod state;

pub use action::{
    action::{Action, ActionKind, ActionRecord},
    action_log::ActionLog,
    dispatcher::{ActionDispatcher, Receptor},
};
pub use directory::{
    error::DirectoryError,
    peer_directory::{PeerDirectory, PeerJoin},
};
pub use network::{
    error::NetworkError,
    network_registry::{Network, NetworkRegistry},
    peer_index_allocator::{PeerIndexAllocator, PeerIndexPolicy},
};
pub use ownership::{
    error::OwnershipError,
    network_id_assigner::NetworkIdAssigner,
    ownership_record::OwnershipRecord,
    ownership_table::{OwnershipTable, SpawnOutcome},
};
pub use state::{core_dispatcher, register_core_receptors, ChangeSet, PeerChange, ReplicatedState};
pub use types::{
    ActionIndex, EntityUuid, NetworkId, NetworkObjectId, NetworkTopic, PeerId, PeerIndex, UserId,
};
