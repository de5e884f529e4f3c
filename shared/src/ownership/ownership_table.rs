use std::collections::HashMap;

use crate::{
    ownership::{
        error::OwnershipError, network_id_assigner::NetworkIdAssigner,
        ownership_record::OwnershipRecord,
    },
    EntityUuid, NetworkObjectId, PeerId, UserId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    Inserted,
    Overwritten,
}

/// One [`OwnershipRecord`] per live networked object, keyed by UUID
pub struct OwnershipTable {
    records: HashMap<EntityUuid, OwnershipRecord>,
    network_ids: NetworkIdAssigner,
}

impl OwnershipTable {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            network_ids: NetworkIdAssigner::new(),
        }
    }

    // Mutation

    /// Inserts or overwrites the record for `entity`.
    ///
    /// Returns an error, leaving the table untouched, if the entity already
    /// exists under a different owner: the first spawn of a UUID fixes its owner.
    pub fn try_spawn(
        &mut self,
        entity: &EntityUuid,
        parent: &EntityUuid,
        owner_id: &UserId,
        owner_peer: &PeerId,
        authority_peer_id: Option<PeerId>,
    ) -> Result<SpawnOutcome, OwnershipError> {
        let mut outcome = SpawnOutcome::Inserted;

        if let Some(existing) = self.records.get(entity) {
            if existing.owner_id() != owner_id {
                return Err(OwnershipError::OwnerConflict {
                    entity_id: entity.to_string(),
                    existing: existing.owner_id().to_string(),
                    incoming: owner_id.to_string(),
                });
            }
            let previous_peer = existing.owner_peer().clone();
            self.network_ids.remove(&previous_peer, entity);
            outcome = SpawnOutcome::Overwritten;
        }

        let record = OwnershipRecord::new(
            entity.clone(),
            parent.clone(),
            owner_id.clone(),
            owner_peer.clone(),
            authority_peer_id,
        );
        self.network_ids.insert(owner_peer, entity);
        self.records.insert(entity.clone(), record);

        Ok(outcome)
    }

    /// Records a pending authority request. Permission is checked later, by the owner.
    pub fn try_request_authority(
        &mut self,
        entity: &EntityUuid,
        new_authority: &PeerId,
    ) -> Result<(), OwnershipError> {
        let record = self.record_mut(entity, "request_authority")?;
        record.set_requesting_peer(new_authority.clone());
        Ok(())
    }

    /// Commits `new_authority` if `owner_id` matches the record's owner.
    /// Returns whether the authority peer actually changed.
    pub fn try_transfer_authority(
        &mut self,
        entity: &EntityUuid,
        owner_id: &UserId,
        new_authority: &PeerId,
    ) -> Result<bool, OwnershipError> {
        let record = self.record_mut(entity, "transfer_authority")?;
        if record.owner_id() != owner_id {
            return Err(OwnershipError::OwnerMismatch {
                entity_id: entity.to_string(),
                owner: record.owner_id().to_string(),
                claimed: owner_id.to_string(),
            });
        }
        let changed = record.authority_peer_id() != Some(new_authority);
        record.commit_authority(new_authority.clone());
        Ok(changed)
    }

    pub fn destroy(&mut self, entity: &EntityUuid) -> Option<OwnershipRecord> {
        let record = self.records.remove(entity)?;
        self.network_ids.remove(record.owner_peer(), entity);
        Some(record)
    }

    // Queries

    pub fn get(&self, entity: &EntityUuid) -> Option<&OwnershipRecord> {
        self.records.get(entity)
    }

    pub fn contains(&self, entity: &EntityUuid) -> bool {
        self.records.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OwnershipRecord> {
        self.records.values()
    }

    /// Entities spawned by `peer`, in network-id order
    pub fn records_owned_by_peer(&self, peer: &PeerId) -> &[EntityUuid] {
        self.network_ids.entities(peer)
    }

    pub fn records_owned_by_user<'a>(&'a self, user: &'a UserId) -> impl Iterator<Item = &'a OwnershipRecord> {
        self.records
            .values()
            .filter(move |record| record.owner_id() == user)
    }

    pub fn network_id(&self, entity: &EntityUuid) -> Option<NetworkObjectId> {
        let record = self.records.get(entity)?;
        self.network_ids.network_id(record.owner_peer(), entity)
    }

    pub fn entity_for_network_id(&self, owner_peer: &PeerId, id: NetworkObjectId) -> Option<&EntityUuid> {
        self.network_ids.entity_for(owner_peer, id)
    }

    fn record_mut(
        &mut self,
        entity: &EntityUuid,
        operation: &'static str,
    ) -> Result<&mut OwnershipRecord, OwnershipError> {
        self.records
            .get_mut(entity)
            .ok_or_else(|| OwnershipError::EntityNotFound {
                entity_id: entity.to_string(),
                operation,
            })
    }
}

impl Default for OwnershipTable {
    fn default() -> Self {
        Self::new()
    }
}
