use std::vec::IntoIter;

use tether_shared::{EntityUuid, PeerId};

pub struct ObjectEvents {
    materializes: Vec<EntityUuid>,
    dematerializes: Vec<EntityUuid>,
    attaches: Vec<(EntityUuid, EntityUuid)>,
    authority_changes: Vec<(EntityUuid, PeerId)>,
    empty: bool,
}

impl Default for ObjectEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectEvents {
    pub(crate) fn new() -> Self {
        Self {
            materializes: Vec::new(),
            dematerializes: Vec::new(),
            attaches: Vec::new(),
            authority_changes: Vec::new(),
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ObjectEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ObjectEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_materialize(&mut self, entity: &EntityUuid) {
        self.materializes.push(entity.clone());
        self.empty = false;
    }

    pub(crate) fn push_dematerialize(&mut self, entity: &EntityUuid) {
        self.dematerializes.push(entity.clone());
        self.empty = false;
    }

    pub(crate) fn push_attach(&mut self, child: &EntityUuid, parent: &EntityUuid) {
        self.attaches.push((child.clone(), parent.clone()));
        self.empty = false;
    }

    pub(crate) fn push_authority_change(&mut self, entity: &EntityUuid, authority: &PeerId) {
        self.authority_changes.push((entity.clone(), authority.clone()));
        self.empty = false;
    }
}

// Event Trait
pub trait ObjectEvent {
    type Iter;

    fn iter(events: &mut ObjectEvents) -> Self::Iter;

    fn has(events: &ObjectEvents) -> bool;
}

// Materialize Event
pub struct MaterializeEvent;
impl ObjectEvent for MaterializeEvent {
    type Iter = IntoIter<EntityUuid>;

    fn iter(events: &mut ObjectEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.materializes);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ObjectEvents) -> bool {
        !events.materializes.is_empty()
    }
}

// Dematerialize Event
pub struct DematerializeEvent;
impl ObjectEvent for DematerializeEvent {
    type Iter = IntoIter<EntityUuid>;

    fn iter(events: &mut ObjectEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.dematerializes);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ObjectEvents) -> bool {
        !events.dematerializes.is_empty()
    }
}

// Attach Event, (child, parent)
pub struct AttachEvent;
impl ObjectEvent for AttachEvent {
    type Iter = IntoIter<(EntityUuid, EntityUuid)>;

    fn iter(events: &mut ObjectEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.attaches);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ObjectEvents) -> bool {
        !events.attaches.is_empty()
    }
}

// Authority Change Event, (entity, new authority peer)
pub struct AuthorityChangeEvent;
impl ObjectEvent for AuthorityChangeEvent {
    type Iter = IntoIter<(EntityUuid, PeerId)>;

    fn iter(events: &mut ObjectEvents) -> Self::Iter {
        let list = std::mem::take(&mut events.authority_changes);
        IntoIterator::into_iter(list)
    }

    fn has(events: &ObjectEvents) -> bool {
        !events.authority_changes.is_empty()
    }
}
