//! HTTP surface of the relay.

pub mod routes;

pub use routes::{AppState, relay_routes};
