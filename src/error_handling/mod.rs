//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error types for every pipeline stage boundary
//! - Processing statistics tracking (received, stored, skipped per category)
//! - Retry strategy configuration for the geocoding provider

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{get_retry_strategy, is_retriable};
pub use stats::ProcessingStats;
pub use types::{
    DatabaseError, DecodeError, ErrorType, GeocodeError, InitializationError, MessageError,
    PersistenceError, PipelineError, QueueError, ResolveError, ValidationError,
};
