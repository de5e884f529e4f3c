use std::collections::HashMap;

use log::trace;

use crate::action::{
    action::{ActionKind, ActionRecord},
    action_log::ActionLog,
};

/// A pure state transition registered against one [`ActionKind`].
///
/// Receptors only see the state and the record, never the log, so they
/// cannot enqueue further actions while a drain is in progress.
pub type Receptor<S> = Box<dyn Fn(&mut S, &ActionRecord)>;

pub struct ActionDispatcher<S> {
    receptors: HashMap<ActionKind, Vec<Receptor<S>>>,
}

impl<S> ActionDispatcher<S> {
    pub fn new() -> Self {
        Self {
            receptors: HashMap::new(),
        }
    }

    /// Registers `receptor` for `kind`. Receptors of one kind run in registration order.
    pub fn register<F>(&mut self, kind: ActionKind, receptor: F)
    where
        F: Fn(&mut S, &ActionRecord) + 'static,
    {
        self.receptors
            .entry(kind)
            .or_default()
            .push(Box::new(receptor));
    }

    pub fn receptor_count(&self, kind: ActionKind) -> usize {
        self.receptors.get(&kind).map_or(0, Vec::len)
    }

    /// Runs every receptor registered for the record's kind
    pub fn apply(&self, state: &mut S, record: &ActionRecord) {
        let kind = record.action.kind();
        let Some(receptors) = self.receptors.get(&kind) else {
            trace!("no receptor for {:?}, action #{} ignored", kind, record.index);
            return;
        };
        for receptor in receptors {
            receptor(state, record);
        }
    }

    /// Drains `log` once, applying records strictly in arrival order.
    /// Returns the number of records applied.
    pub fn apply_all(&self, state: &mut S, log: &mut ActionLog) -> usize {
        let records = log.drain();
        let count = records.len();
        for record in &records {
            self.apply(state, record);
        }
        count
    }
}

impl<S> Default for ActionDispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}
