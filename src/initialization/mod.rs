//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources a run needs:
//! - Logger (plain or JSON)
//! - HTTP client for the geocoding provider
//!
//! Queue and store connections are opened by their own factories
//! ([`crate::queue::connect_queue`], [`crate::storage::connect_store`]).

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
