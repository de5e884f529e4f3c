use std::collections::{BTreeSet, HashMap};

use crate::{PeerId, PeerIndex};

/// How a network hands out peer indices after peers have left
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PeerIndexPolicy {
    /// Reuse the lowest index freed by a departed peer
    #[default]
    LowestFree,
    /// Never reuse an index
    Monotonic,
}

pub struct PeerIndexAllocator {
    policy: PeerIndexPolicy,
    assigned: HashMap<PeerId, PeerIndex>,
    // front small, back big
    free: BTreeSet<PeerIndex>,
    // None once the index space is used up
    next: Option<PeerIndex>,
}

impl PeerIndexAllocator {
    pub fn new(policy: PeerIndexPolicy) -> Self {
        Self {
            policy,
            assigned: HashMap::new(),
            free: BTreeSet::new(),
            next: Some(0),
        }
    }

    pub fn policy(&self) -> PeerIndexPolicy {
        self.policy
    }

    /// Returns the index of `peer`, allocating one if it has none yet.
    /// Returns `None` once every index has been handed out.
    pub fn allocate(&mut self, peer: &PeerId) -> Option<PeerIndex> {
        if let Some(index) = self.assigned.get(peer) {
            return Some(*index);
        }

        let index = match self.policy {
            PeerIndexPolicy::LowestFree => match self.free.pop_first() {
                Some(index) => index,
                None => self.bump()?,
            },
            PeerIndexPolicy::Monotonic => self.bump()?,
        };

        self.assigned.insert(peer.clone(), index);
        Some(index)
    }

    /// Frees the index held by `peer`. Returns the freed index, if any.
    pub fn release(&mut self, peer: &PeerId) -> Option<PeerIndex> {
        let index = self.assigned.remove(peer)?;
        if self.policy == PeerIndexPolicy::LowestFree {
            self.free.insert(index);
        }
        Some(index)
    }

    pub fn index_of(&self, peer: &PeerId) -> Option<PeerIndex> {
        self.assigned.get(peer).copied()
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    fn bump(&mut self) -> Option<PeerIndex> {
        let index = self.next?;
        // the last index is still handed out, nothing after it
        self.next = index.checked_add(1);
        Some(index)
    }

    #[cfg(test)]
    pub(crate) fn starting_at(policy: PeerIndexPolicy, next: PeerIndex) -> Self {
        let mut allocator = Self::new(policy);
        allocator.next = Some(next);
        allocator
    }
}
