use std::collections::{BTreeSet, HashMap};
use std::mem;

use log::trace;

use tether_shared::{Action, ChangeSet, EntityUuid, PeerChange};

use crate::{
    object::{network_object::NetworkObjects, object_events::ObjectEvents},
    reconcile::{
        entity_reactor::{EffectSink, EntityReactor, ReconcileContext},
        watcher_index::WatcherIndex,
    },
};

/// Owns one [`EntityReactor`] per live ownership record and decides which of
/// them to re-evaluate after a drain
pub(crate) struct Reconciler {
    reactors: HashMap<EntityUuid, EntityReactor>,
    watchers: WatcherIndex,
    pending: BTreeSet<EntityUuid>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            reactors: HashMap::new(),
            watchers: WatcherIndex::new(),
            pending: BTreeSet::new(),
        }
    }

    pub fn reactor_count(&self) -> usize {
        self.reactors.len()
    }

    /// Schedules the children of `parent` for re-evaluation on the next pass
    pub fn mark_children_dirty(&mut self, parent: &EntityUuid) {
        self.pending.extend(self.watchers.children(parent).cloned());
    }

    /// Re-evaluates every reactor affected by `changes`, returning the actions
    /// the reactors want dispatched
    pub fn reconcile(
        &mut self,
        ctx: &ReconcileContext,
        changes: ChangeSet,
        objects: &mut NetworkObjects,
        events: &mut ObjectEvents,
    ) -> Vec<Action> {
        let mut sink = EffectSink {
            objects,
            events,
            actions: Vec::new(),
        };
        let table = ctx.state.ownership();
        let mut dirty = mem::take(&mut self.pending);

        for entity in changes.destroyed() {
            if let Some(mut reactor) = self.reactors.remove(entity) {
                reactor.unmount(&mut sink);
            }
            dirty.extend(self.watchers.children(entity).cloned());
            self.watchers.unwatch(entity);
        }

        for entity in changes.entities() {
            if let Some(record) = table.get(entity) {
                self.watchers.watch(record);
                dirty.insert(entity.clone());
            }
        }

        for owner_peer in changes.owner_peers() {
            dirty.extend(table.records_owned_by_peer(owner_peer).iter().cloned());
        }

        let mut peers_changed = false;
        for change in changes.peers() {
            let (network, peer, user) = match change {
                PeerChange::Joined {
                    network,
                    peer,
                    user,
                }
                | PeerChange::Left {
                    network,
                    peer,
                    user,
                } => (network, peer, user),
            };
            if network != ctx.network {
                continue;
            }
            peers_changed = true;
            dirty.extend(self.watchers.user_watchers(user).cloned());
            dirty.extend(self.watchers.peer_watchers(peer).cloned());
        }

        if peers_changed {
            dirty.extend(
                self.reactors
                    .iter()
                    .filter(|(_, reactor)| reactor.is_orphaned())
                    .map(|(entity, _)| entity.clone()),
            );
        }

        trace!("reconciling {} of {} records", dirty.len(), table.len());

        let mut hierarchy_dirty = dirty.clone();
        for entity in &dirty {
            let Some(record) = table.get(entity) else {
                continue;
            };
            if !self.watchers.is_watching(entity) {
                self.watchers.watch(record);
            }
            let reactor = self
                .reactors
                .entry(entity.clone())
                .or_insert_with(|| EntityReactor::new(entity.clone()));
            let was_materialized = reactor.is_materialized();
            reactor.evaluate(ctx, record, &mut sink);
            if was_materialized != reactor.is_materialized() {
                hierarchy_dirty.extend(self.watchers.children(entity).cloned());
            }
        }

        // parents materialized above are visible to every child here
        for entity in &hierarchy_dirty {
            let (Some(record), Some(reactor)) = (table.get(entity), self.reactors.get_mut(entity)) else {
                continue;
            };
            reactor.evaluate_hierarchy(ctx, record, &mut sink);
        }

        sink.actions
    }
}
