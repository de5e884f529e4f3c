//! # Tether Client
//! A per-peer session that applies incoming tether actions to the replicated
//! peer directory and ownership table, then reconciles local network objects
//! and their authority against the result.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tether_shared::{
        Action, ActionKind, ActionRecord, EntityUuid, NetworkId, NetworkObjectId, NetworkTopic,
        OwnershipRecord, PeerDirectory, PeerId, PeerIndex, PeerIndexPolicy, ReplicatedState,
        UserId,
    };
}

mod object;
mod reconcile;
mod session;

pub use object::{
    network_object::{NetworkObject, NetworkObjects},
    object_events::{
        AttachEvent, AuthorityChangeEvent, DematerializeEvent, MaterializeEvent, ObjectEvent,
        ObjectEvents,
    },
};
pub use session::{
    error::SessionError,
    session::Session,
    session_config::{SceneFailover, SessionConfig},
};
