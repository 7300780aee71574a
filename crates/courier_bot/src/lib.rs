//! Courier bot: transport wiring, session stores, the download pipeline, and
//! background workers around the pure funnel in `courier_core`.
pub mod config;
pub mod handlers;
pub mod pipeline;
pub mod store;
pub mod texts;
pub mod transport;
pub mod workers;

/// Telegram chat id; sessions, cancellation flags, and demos are keyed by it.
pub type UserId = i64;
