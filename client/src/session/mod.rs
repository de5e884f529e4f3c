pub mod error;
pub mod session;
pub mod session_config;
