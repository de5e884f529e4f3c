use std::collections::HashSet;

use log::{debug, info, warn};

use tether_shared::{
    Action, EntityUuid, NetworkId, NetworkObjectId, NetworkRegistry, OwnershipRecord, PeerId,
    ReplicatedState, UserId,
};

use crate::{
    object::{
        network_object::{NetworkObject, NetworkObjects},
        object_events::ObjectEvents,
    },
    session::session_config::{SceneFailover, SessionConfig},
};

/// Read-only inputs shared by every reactor during one reconciliation pass.
/// Reactors only ever see the state committed by the drain that preceded it.
pub(crate) struct ReconcileContext<'a> {
    pub local_user: &'a UserId,
    pub local_peer: &'a PeerId,
    pub network: &'a NetworkId,
    pub state: &'a ReplicatedState,
    pub networks: &'a NetworkRegistry,
    pub scene_roots: &'a HashSet<EntityUuid>,
    pub config: &'a SessionConfig,
}

impl ReconcileContext<'_> {
    fn is_owner(&self, record: &OwnershipRecord) -> bool {
        record.owner_id() == self.local_user || record.is_scene_owned()
    }

    // an owner counts as connected before its own peer registers
    fn user_connected(&self, record: &OwnershipRecord) -> bool {
        self.is_owner(record)
            || self
                .state
                .directory()
                .user_connected(self.network, record.owner_id())
    }

    // the scene sentinel never joins, so it can't leave either
    fn is_author_in_network(&self, record: &OwnershipRecord) -> bool {
        record.authority().is_scene()
            || self
                .state
                .directory()
                .contains_peer(self.network, record.authority())
    }
}

/// Where reactor effects land
pub(crate) struct EffectSink<'a> {
    pub objects: &'a mut NetworkObjects,
    pub events: &'a mut ObjectEvents,
    pub actions: Vec<Action>,
}

#[derive(PartialEq, Eq)]
struct BindingKey {
    owner_id: UserId,
    owner_peer: PeerId,
    authority: PeerId,
    network_id: Option<NetworkObjectId>,
}

#[derive(Clone, PartialEq, Eq)]
struct CommitKey {
    requesting: PeerId,
    local_is_owner: bool,
}

/// The authority reconciliation process for one ownership record.
///
/// Each effect remembers the inputs it last ran with and only runs again when
/// they change, so re-evaluating an unchanged record is a no-op.
pub(crate) struct EntityReactor {
    entity: EntityUuid,
    materialized: bool,
    binding: Option<BindingKey>,
    hierarchy: Option<(EntityUuid, bool)>,
    commit: Option<CommitKey>,
    // the authority peer seen present while the failover effect was mounted
    failover_armed: Option<PeerId>,
    orphaned: bool,
    evaluated: bool,
}

impl EntityReactor {
    pub fn new(entity: EntityUuid) -> Self {
        Self {
            entity,
            materialized: false,
            binding: None,
            hierarchy: None,
            commit: None,
            failover_armed: None,
            orphaned: false,
            evaluated: false,
        }
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Authority was lost and no connected peer holds it yet. Stays set while
    /// a takeover is in flight so a departing candidate is failed over too.
    pub fn is_orphaned(&self) -> bool {
        self.orphaned
    }

    /// Runs materialization, state binding, request commit and failover
    pub fn evaluate(&mut self, ctx: &ReconcileContext, record: &OwnershipRecord, sink: &mut EffectSink) {
        self.materialize(ctx, record, sink);
        self.bind_state(ctx, record, sink);
        self.commit_request(ctx, record, sink);
        self.watch_authority(ctx, record, sink);
        self.evaluated = true;
    }

    /// Attaches the representation to its parent once both exist
    pub fn evaluate_hierarchy(&mut self, ctx: &ReconcileContext, record: &OwnershipRecord, sink: &mut EffectSink) {
        if !self.materialized {
            self.hierarchy = None;
            return;
        }

        let parent = record.parent();
        let resolved = *parent != self.entity
            && (ctx.scene_roots.contains(parent) || sink.objects.contains(parent));
        let key = (parent.clone(), resolved);
        if self.hierarchy.as_ref() == Some(&key) {
            return;
        }

        if let Some(object) = sink.objects.get_mut(&self.entity) {
            if resolved {
                object.attach(parent);
                sink.events.push_attach(&self.entity, parent);
            } else {
                object.detach();
            }
        }
        self.hierarchy = Some(key);
    }

    /// Tears the representation down when the record is destroyed
    pub fn unmount(&mut self, sink: &mut EffectSink) {
        self.teardown(sink);
        self.commit = None;
        self.failover_armed = None;
        self.orphaned = false;
    }

    // Materialization

    fn materialize(&mut self, ctx: &ReconcileContext, record: &OwnershipRecord, sink: &mut EffectSink) {
        let user_connected = ctx.user_connected(record);
        if user_connected == self.materialized {
            return;
        }

        if user_connected {
            debug!("materializing {}", self.entity);
            sink.objects.insert(NetworkObject::new(
                self.entity.clone(),
                record.owner_id().clone(),
                record.owner_peer().clone(),
            ));
            sink.events.push_materialize(&self.entity);
            self.materialized = true;
        } else {
            debug!("owner {} of {} disconnected, tearing down", record.owner_id(), self.entity);
            self.teardown(sink);
        }
    }

    fn teardown(&mut self, sink: &mut EffectSink) {
        if sink.objects.remove(&self.entity).is_some() {
            sink.events.push_dematerialize(&self.entity);
        }
        self.materialized = false;
        self.binding = None;
        self.hierarchy = None;
    }

    // State binding

    fn bind_state(&mut self, ctx: &ReconcileContext, record: &OwnershipRecord, sink: &mut EffectSink) {
        if !self.materialized {
            return;
        }

        let key = BindingKey {
            owner_id: record.owner_id().clone(),
            owner_peer: record.owner_peer().clone(),
            authority: record.authority().clone(),
            network_id: ctx.state.ownership().network_id(&self.entity),
        };
        if self.binding.as_ref() == Some(&key) {
            return;
        }

        let Some(object) = sink.objects.get_mut(&self.entity) else {
            return;
        };
        object.bind(
            &key.owner_id,
            &key.owner_peer,
            &key.authority,
            key.network_id,
            ctx.local_user,
            ctx.local_peer,
        );

        let authority_changed = self
            .binding
            .as_ref()
            .is_some_and(|previous| previous.authority != key.authority);
        if authority_changed {
            sink.events.push_authority_change(&self.entity, &key.authority);
        }
        self.binding = Some(key);
    }

    // Authority request commit

    fn commit_request(&mut self, ctx: &ReconcileContext, record: &OwnershipRecord, sink: &mut EffectSink) {
        // permission is read from the live representation, not from the request
        let key = record.requesting_peer_id().map(|requesting| CommitKey {
            requesting: requesting.clone(),
            local_is_owner: sink.objects.get(&self.entity).is_some_and(|object| {
                object.owner_id() == ctx.local_user || object.owner_id().is_scene()
            }),
        });
        if key == self.commit {
            return;
        }
        self.commit = key.clone();

        let Some(CommitKey {
            requesting,
            local_is_owner: true,
        }) = key
        else {
            return;
        };

        info!("granting authority over {} to {}", self.entity, requesting);
        sink.actions.push(Action::TransferAuthority {
            entity: self.entity.clone(),
            owner: record.owner_id().clone(),
            new_authority: requesting,
        });
    }

    // Failover on disconnect

    fn watch_authority(&mut self, ctx: &ReconcileContext, record: &OwnershipRecord, sink: &mut EffectSink) {
        let is_owner = ctx.is_owner(record);
        if is_owner && ctx.is_author_in_network(record) {
            self.failover_armed = Some(record.authority().clone());
            self.orphaned = false;
            return;
        }

        if let Some(departed) = self.failover_armed.take() {
            info!("authority peer {} of {} left the network", departed, self.entity);
            self.fail_over(ctx, record, sink);
        } else if self.orphaned && is_owner {
            self.fail_over(ctx, record, sink);
        } else if !self.evaluated && is_owner {
            // the authority may still be joining, so wait for the next peer change
            debug!("authority peer {} of {} not connected yet", record.authority(), self.entity);
            self.orphaned = true;
        }
    }

    fn fail_over(&mut self, ctx: &ReconcileContext, record: &OwnershipRecord, sink: &mut EffectSink) {
        if record.is_scene_owned() && ctx.config.scene_failover == SceneFailover::Disabled {
            warn!("scene object {} keeps stale authority {}", self.entity, record.authority());
            self.orphaned = false;
            return;
        }

        // cleared once the new authority is seen in the network
        self.orphaned = true;
        let Some(candidate) = failover_candidate(ctx, record) else {
            info!("{} is orphaned until its owner {} reconnects", self.entity, record.owner_id());
            return;
        };

        // every replica picks the same candidate, only the candidate itself dispatches
        if candidate != *ctx.local_peer {
            debug!("waiting for {} to take over {}", candidate, self.entity);
            return;
        }
        info!("taking over authority of {} as {}", self.entity, candidate);
        sink.actions.push(Action::TransferAuthority {
            entity: self.entity.clone(),
            owner: record.owner_id().clone(),
            new_authority: candidate,
        });
    }
}

/// The peer every replica agrees should take over `record`.
///
/// For scene objects this reads the network host from the session's
/// [`NetworkRegistry`], which is not replicated. Sessions agree only if the
/// transport gives all of them the same host view.
fn failover_candidate(ctx: &ReconcileContext, record: &OwnershipRecord) -> Option<PeerId> {
    let directory = ctx.state.directory();
    if record.is_scene_owned() {
        if let Some(host) = ctx.networks.host_peer(ctx.network) {
            if directory.contains_peer(ctx.network, host) {
                return Some(host.clone());
            }
        }
        return directory.peers(ctx.network).min().cloned();
    }
    directory
        .user_peers(ctx.network, record.owner_id())
        .iter()
        .min()
        .cloned()
}
