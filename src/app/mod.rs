//! Main application modules.
//!
//! This module provides progress logging, signal-driven shutdown, and
//! statistics printing used by [`crate::run_ingestion`].

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::spawn_progress_logger;
pub use shutdown::{listen_for_shutdown, shutdown_gracefully};
pub use statistics::print_final_statistics;
