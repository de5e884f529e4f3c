use thiserror::Error;

/// Protocol violations detected by the ownership receptors.
///
/// A stale or malicious peer can produce any of these; they are logged and the
/// offending action is dropped, the table is left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OwnershipError {
    /// No ownership record exists for the entity
    #[error("Entity {entity_id} has no ownership record - operation '{operation}' dropped")]
    EntityNotFound {
        entity_id: String,
        operation: &'static str,
    },

    /// A transfer named an owner other than the record's owner
    #[error("Transfer of {entity_id} claimed owner {claimed}, but the entity is owned by {owner}")]
    OwnerMismatch {
        entity_id: String,
        owner: String,
        claimed: String,
    },

    /// A spawn tried to re-key an existing entity under a different owner
    #[error("Spawn of {entity_id} by owner {incoming} conflicts with existing owner {existing}")]
    OwnerConflict {
        entity_id: String,
        existing: String,
        incoming: String,
    },
}
