//! Inbound message queue boundary.
//!
//! The pipeline pulls raw payloads through [`MessageSource`]; [`KafkaSource`] is
//! the production implementation.

mod kafka;

use std::future::Future;

use crate::error_handling::QueueError;

pub use kafka::{connect_queue, KafkaSource};

/// A startable, stoppable stream of raw record payloads.
pub trait MessageSource {
    /// Subscribes and begins delivery.
    fn start(&mut self) -> impl Future<Output = Result<(), QueueError>>;

    /// Waits for the next record payload.
    ///
    /// `None` means the stream has ended and no more records will arrive.
    fn next_record(&mut self) -> impl Future<Output = Option<Result<Vec<u8>, QueueError>>>;

    /// Releases the subscription and the underlying connection.
    ///
    /// Must be safe to call when `start` failed or was never called, and must be
    /// a no-op on every call after the first.
    fn stop(&mut self);
}
