//! form-relay — forwards form-submission webhooks to a work-management board.

pub mod board;
pub mod config;
pub mod error;
pub mod forms;
pub mod server;
