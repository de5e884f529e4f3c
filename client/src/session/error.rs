use thiserror::Error;

use tether_shared::NetworkError;

/// Errors returned by [`Session`](crate::Session) helpers that dispatch actions
/// on behalf of the local peer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The entity has no ownership record in this session
    #[error("Entity {entity_id} is not known to this session")]
    EntityNotFound { entity_id: String },

    /// Only the owning user may transfer authority
    #[error("User {user_id} does not own entity {entity_id} and cannot transfer its authority")]
    NotOwner { entity_id: String, user_id: String },

    #[error(transparent)]
    Network(#[from] NetworkError),
}
