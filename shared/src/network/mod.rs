pub mod error;
pub mod network_registry;
pub mod peer_index_allocator;
