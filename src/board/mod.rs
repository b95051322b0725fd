//! Board side of the relay: column mapping and the remote API client.

pub mod client;
pub mod columns;

pub use client::{BoardApi, BoardClient, BoardColumn, CreatedItem};
pub use columns::{ColumnValues, EVENT_BOARD_COLUMNS, map_submission};
