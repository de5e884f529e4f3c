use std::collections::VecDeque;

use log::trace;

use crate::{action::action::ActionRecord, ActionIndex};

/// Ordered, unbounded queue of incoming [`ActionRecord`]s
pub struct ActionLog {
    queue: VecDeque<ActionRecord>,
    next_index: ActionIndex,
}

impl ActionLog {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_index: 0,
        }
    }

    /// Appends a record, stamping it with the next sequence number
    pub fn push(&mut self, mut record: ActionRecord) -> ActionIndex {
        let index = self.next_index;
        self.next_index += 1;
        record.index = index;
        trace!("action log: enqueued #{} {:?} from {}", index, record.action.kind(), record.sender);
        self.queue.push_back(record);
        index
    }

    /// Takes every queued record, in arrival order
    pub fn drain(&mut self) -> Vec<ActionRecord> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}
