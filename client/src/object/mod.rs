pub mod network_object;
pub mod object_events;
