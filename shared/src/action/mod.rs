pub mod action;
pub mod action_log;
pub mod dispatcher;
