use std::collections::HashSet;
use std::mem;

use log::{debug, info};

use tether_shared::{
    core_dispatcher, Action, ActionDispatcher, ActionKind, ActionLog, ActionRecord, EntityUuid,
    NetworkId, NetworkObjectId, NetworkRegistry, OwnershipRecord, PeerDirectory, PeerId,
    PeerIndex, ReplicatedState, UserId,
};

use crate::{
    object::{
        network_object::{NetworkObject, NetworkObjects},
        object_events::ObjectEvents,
    },
    reconcile::{entity_reactor::ReconcileContext, reconciler::Reconciler},
    session::{error::SessionError, session_config::SessionConfig},
};

/// The application context of one peer.
///
/// Owns the replicated state, the incoming action log and the local object
/// representations. [`Session::apply_incoming_actions`] is the only point at
/// which the peer directory and ownership table change.
pub struct Session {
    config: SessionConfig,
    local_user: UserId,
    local_peer: PeerId,
    network: NetworkId,
    networks: NetworkRegistry,
    state: ReplicatedState,
    dispatcher: ActionDispatcher<ReplicatedState>,
    incoming_actions: ActionLog,
    outgoing_actions: Vec<ActionRecord>,
    reconciler: Reconciler,
    objects: NetworkObjects,
    scene_roots: HashSet<EntityUuid>,
    events: ObjectEvents,
}

impl Session {
    /// Creates a session for `local_peer` of `local_user`, reconciling entity
    /// ownership against the peers of `network`
    pub fn new(config: SessionConfig, local_user: UserId, local_peer: PeerId, network: NetworkId) -> Self {
        let networks = NetworkRegistry::new(config.peer_index_policy);
        Self {
            config,
            local_user,
            local_peer,
            network,
            networks,
            state: ReplicatedState::new(),
            dispatcher: core_dispatcher(),
            incoming_actions: ActionLog::new(),
            outgoing_actions: Vec::new(),
            reconciler: Reconciler::new(),
            objects: NetworkObjects::new(),
            scene_roots: HashSet::new(),
            events: ObjectEvents::new(),
        }
    }

    pub fn local_user(&self) -> &UserId {
        &self.local_user
    }

    pub fn local_peer(&self) -> &PeerId {
        &self.local_peer
    }

    /// The network whose peers decide entity connectivity and failover
    pub fn network(&self) -> &NetworkId {
        &self.network
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.networks
    }

    /// Networks are created and destroyed by the transport layer. The host
    /// recorded here is not replicated: every session of a network must be
    /// given the same host, or scene failover may pick different peers.
    pub fn networks_mut(&mut self) -> &mut NetworkRegistry {
        &mut self.networks
    }

    /// Registers an extra receptor, run after the core receptor of that kind
    pub fn register_receptor<F>(&mut self, kind: ActionKind, receptor: F)
    where
        F: Fn(&mut ReplicatedState, &ActionRecord) + 'static,
    {
        self.dispatcher.register(kind, receptor);
    }

    // Actions

    /// Enqueues `action` locally and buffers it for the transport
    pub fn dispatch(&mut self, action: Action) {
        let record = ActionRecord::new(self.local_peer.clone(), action);
        self.outgoing_actions.push(record.clone());
        self.incoming_actions.push(record);
    }

    /// Accepts an action delivered by the transport from a remote peer
    pub fn receive_action(&mut self, record: ActionRecord) {
        self.incoming_actions.push(record);
    }

    /// Actions dispatched locally since the last call, for the transport to deliver
    pub fn take_outgoing_actions(&mut self) -> Vec<ActionRecord> {
        mem::take(&mut self.outgoing_actions)
    }

    pub fn has_incoming_actions(&self) -> bool {
        !self.incoming_actions.is_empty()
    }

    /// Drains the incoming queue once and runs the reconciliation process for
    /// every affected record before returning. Actions dispatched by the
    /// reconciliation are queued for the next call. Returns the number of
    /// actions applied.
    pub fn apply_incoming_actions(&mut self) -> usize {
        let applied = self
            .dispatcher
            .apply_all(&mut self.state, &mut self.incoming_actions);
        let changes = self.state.take_changes();

        let ctx = ReconcileContext {
            local_user: &self.local_user,
            local_peer: &self.local_peer,
            network: &self.network,
            state: &self.state,
            networks: &self.networks,
            scene_roots: &self.scene_roots,
            config: &self.config,
        };
        let actions = self
            .reconciler
            .reconcile(&ctx, changes, &mut self.objects, &mut self.events);

        if applied > 0 {
            debug!("{} applied {} actions", self.local_peer, applied);
        }
        for action in actions {
            self.dispatch(action);
        }
        applied
    }

    pub fn take_events(&mut self) -> ObjectEvents {
        mem::take(&mut self.events)
    }

    // Helpers for the local peer

    pub fn spawn_entity(&mut self, entity: EntityUuid, parent: EntityUuid, owner: UserId, authority: Option<PeerId>) {
        self.dispatch(Action::SpawnEntity {
            entity,
            parent,
            owner,
            authority,
        });
    }

    /// Asks the owner of `entity` to hand authority to the local peer
    pub fn request_authority(&mut self, entity: &EntityUuid) -> Result<(), SessionError> {
        self.record_or_err(entity)?;
        let new_authority = self.local_peer.clone();
        self.dispatch(Action::RequestAuthority {
            entity: entity.clone(),
            new_authority,
        });
        Ok(())
    }

    /// Hands authority over an entity the local user owns to `new_authority`
    pub fn transfer_authority(&mut self, entity: &EntityUuid, new_authority: PeerId) -> Result<(), SessionError> {
        let owner = self.record_or_err(entity)?.owner_id().clone();
        if owner != self.local_user && !owner.is_scene() {
            return Err(SessionError::NotOwner {
                entity_id: entity.to_string(),
                user_id: self.local_user.to_string(),
            });
        }
        self.dispatch(Action::TransferAuthority {
            entity: entity.clone(),
            owner,
            new_authority,
        });
        Ok(())
    }

    pub fn destroy_entity(&mut self, entity: &EntityUuid) {
        self.dispatch(Action::DestroyEntity {
            entity: entity.clone(),
        });
    }

    /// Host side of a join: allocates the peer's index and announces it
    pub fn admit_peer(&mut self, network: &NetworkId, peer: PeerId, user: UserId) -> Result<PeerIndex, SessionError> {
        let peer_index = self.networks.allocate_peer_index(network, &peer)?;
        info!("admitting {} of {} to {} at index {}", peer, user, network, peer_index);
        self.dispatch(Action::PeerJoined {
            network: network.clone(),
            peer,
            peer_index,
            user,
        });
        Ok(peer_index)
    }

    /// Host side of a leave: frees the peer's index and announces the departure
    pub fn dismiss_peer(&mut self, network: &NetworkId, peer: PeerId, user: UserId) -> Result<(), SessionError> {
        self.networks.release_peer_index(network, &peer)?;
        info!("dismissing {} of {} from {}", peer, user, network);
        self.dispatch(Action::PeerLeft {
            network: network.clone(),
            peer,
            user,
        });
        Ok(())
    }

    /// Marks `entity` as a static hierarchy root that children may attach to
    /// without it being a networked object
    pub fn add_scene_root(&mut self, entity: EntityUuid) {
        self.reconciler.mark_children_dirty(&entity);
        self.scene_roots.insert(entity);
    }

    // Queries

    pub fn state(&self) -> &ReplicatedState {
        &self.state
    }

    pub fn directory(&self) -> &PeerDirectory {
        self.state.directory()
    }

    pub fn ownership_record(&self, entity: &EntityUuid) -> Option<&OwnershipRecord> {
        self.state.ownership().get(entity)
    }

    pub fn has_network_object(&self, entity: &EntityUuid) -> bool {
        self.objects.contains(entity)
    }

    pub fn network_object(&self, entity: &EntityUuid) -> Option<&NetworkObject> {
        self.objects.get(entity)
    }

    pub fn network_objects(&self) -> &NetworkObjects {
        &self.objects
    }

    /// The peer currently allowed to write `entity`, as recorded in the ownership table
    pub fn authority_peer(&self, entity: &EntityUuid) -> Option<&PeerId> {
        self.state.ownership().get(entity).map(OwnershipRecord::authority)
    }

    pub fn network_id(&self, entity: &EntityUuid) -> Option<NetworkObjectId> {
        self.state.ownership().network_id(entity)
    }

    /// Resolves a wire handle back to the entity it addresses
    pub fn entity_for_network_id(&self, owner_peer: &PeerId, id: NetworkObjectId) -> Option<&EntityUuid> {
        self.state.ownership().entity_for_network_id(owner_peer, id)
    }

    /// Owned tag of the local representation
    pub fn is_owned_locally(&self, entity: &EntityUuid) -> bool {
        self.objects
            .get(entity)
            .is_some_and(NetworkObject::is_owned_locally)
    }

    /// Authority tag of the local representation
    pub fn has_authority(&self, entity: &EntityUuid) -> bool {
        self.objects.get(entity).is_some_and(NetworkObject::has_authority)
    }

    pub fn is_host(&self) -> bool {
        self.networks
            .network(&self.network)
            .is_some_and(|network| network.is_hosted_by(&self.local_peer))
    }

    pub fn reactor_count(&self) -> usize {
        self.reconciler.reactor_count()
    }

    fn record_or_err(&self, entity: &EntityUuid) -> Result<&OwnershipRecord, SessionError> {
        self.state
            .ownership()
            .get(entity)
            .ok_or_else(|| SessionError::EntityNotFound {
                entity_id: entity.to_string(),
            })
    }
}
