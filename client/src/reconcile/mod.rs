pub mod entity_reactor;
pub mod reconciler;
pub mod watcher_index;
