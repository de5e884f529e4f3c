pub mod error;
pub mod network_id_assigner;
pub mod ownership_record;
pub mod ownership_table;
