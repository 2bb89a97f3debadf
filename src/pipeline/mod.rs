//! The consume, resolve, validate, persist loop.
//!
//! Messages are handled one at a time, in queue order. Every per-message failure
//! is logged, counted and skipped; only a fatal queue failure or a panic ends
//! the loop.
//! The queue subscription is released exactly once, whichever way the pipeline
//! exits (including being dropped mid-run).

mod state;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ErrorType, MessageError, PipelineError, ProcessingStats};
use crate::geocode::Geocoder;
use crate::models::CoordinateMessage;
use crate::normalize::normalize;
use crate::queue::MessageSource;
use crate::resolver::LocationResolver;
use crate::storage::{persist_batch, PlaceStore};

pub use state::PipelineState;

/// Owns the queue consumer, the resolver and the store for one run.
pub struct IngestionPipeline<Q: MessageSource, G, S> {
    source: Q,
    resolver: LocationResolver<G>,
    store: S,
    state: PipelineState,
    stats: Arc<ProcessingStats>,
    shutdown: CancellationToken,
    released: bool,
}

impl<Q: MessageSource, G: Geocoder, S: PlaceStore> IngestionPipeline<Q, G, S> {
    pub fn new(source: Q, resolver: LocationResolver<G>, store: S) -> Self {
        Self {
            source,
            resolver,
            store,
            state: PipelineState::Idle,
            stats: Arc::new(ProcessingStats::new()),
            shutdown: CancellationToken::new(),
            released: false,
        }
    }

    /// Token that, once cancelled, makes [`run`](Self::run) return after the
    /// message currently in flight.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stats(&self) -> Arc<ProcessingStats> {
        Arc::clone(&self.stats)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Starts the queue consumer.
    ///
    /// On failure the consumer is released, the pipeline stays `Idle` and the
    /// error should be treated as fatal for the run.
    pub async fn start(&mut self) -> Result<(), PipelineError> {
        if self.state != PipelineState::Idle || self.released {
            return Err(PipelineError::InvalidState(self.state.as_str()));
        }

        if let Err(e) = self.source.start().await {
            error!("Failed to start queue consumer: {e}");
            self.release();
            return Err(PipelineError::Start(e));
        }

        self.state = PipelineState::Running;
        info!("Pipeline running");
        Ok(())
    }

    /// Processes records until the queue ends, shutdown is requested, or a
    /// fatal error occurs, then stops the pipeline.
    pub async fn run(&mut self) -> Result<(), PipelineError> {
        if self.state != PipelineState::Running {
            return Err(PipelineError::InvalidState(self.state.as_str()));
        }

        let outcome = self.consume().await;
        self.state = PipelineState::Draining;
        if let Err(ref e) = outcome {
            error!("Pipeline stopped on fatal error: {e}");
        }
        self.stop();
        outcome
    }

    async fn consume(&mut self) -> Result<(), PipelineError> {
        loop {
            if self.shutdown.is_cancelled() {
                info!("Shutdown requested");
                return Ok(());
            }

            let record = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested while waiting for the next record");
                    return Ok(());
                }
                record = self.source.next_record() => record,
            };

            let payload = match record {
                Some(Ok(payload)) => payload,
                Some(Err(e)) if e.is_fatal() => return Err(PipelineError::Source(e)),
                Some(Err(e)) => {
                    warn!("Queue consumer reported a recoverable error, polling again: {e}");
                    continue;
                }
                None => {
                    info!("Queue closed, no more records");
                    return Ok(());
                }
            };

            AssertUnwindSafe(self.handle_record(&payload))
                .catch_unwind()
                .await
                .map_err(|panic| PipelineError::Panicked(panic_message(panic.as_ref())))?;
        }
    }

    /// Processes one payload and records the outcome in the statistics.
    async fn handle_record(&self, payload: &[u8]) {
        self.stats.increment_received();
        match self.process_record(payload).await {
            Ok(()) => self.stats.increment_stored(),
            Err(e) => {
                let error_type = e.error_type();
                if error_type == ErrorType::EmptyCoordinates {
                    debug!("Skipping message: {e}");
                } else {
                    warn!("Skipping message ({error_type}): {e}");
                }
                self.stats.increment_error(error_type);
            }
        }
    }

    /// Decodes, resolves, validates and persists a single payload.
    pub async fn process_record(&self, payload: &[u8]) -> Result<(), MessageError> {
        let coordinates = CoordinateMessage::decode(payload)?;
        let raw = self.resolver.resolve(&coordinates).await?;
        let place = normalize(&raw)?;
        let ids = persist_batch(&self.store, std::slice::from_ref(&place)).await?;
        debug!(
            "Stored ({}, {}) as {:?} in {}",
            coordinates.latitude, coordinates.longitude, ids, place.country
        );
        Ok(())
    }

    /// Releases the queue consumer and moves to `Stopped`.
    ///
    /// Safe to call in any state, any number of times; the consumer is
    /// stopped only once.
    pub fn stop(&mut self) {
        self.release();
        if self.state != PipelineState::Stopped {
            self.state = PipelineState::Stopped;
            info!("Pipeline stopped");
        }
    }

    /// Requests that a running loop exit at the next record boundary.
    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl<Q: MessageSource, G, S> IngestionPipeline<Q, G, S> {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.source.stop();
        }
    }
}

impl<Q: MessageSource, G, S> Drop for IngestionPipeline<Q, G, S> {
    fn drop(&mut self) {
        self.release();
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
