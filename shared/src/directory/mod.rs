pub mod error;
pub mod peer_directory;
