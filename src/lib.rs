//! geo_searcher library: coordinate ingestion and reverse geocoding
//!
//! This library consumes coordinate messages (`{"lat": .., "long": ..}`) from a
//! Kafka topic, resolves each pair to a place through a Nominatim reverse lookup,
//! validates the resulting address and stores it in a SQLite-backed document
//! collection.
//!
//! # Example
//!
//! ```no_run
//! use geo_searcher::{run_ingestion, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     kafka_host: "localhost".to_string(),
//!     kafka_topic: "coordinates".to_string(),
//!     ..Default::default()
//! };
//!
//! let report = run_ingestion(config).await?;
//! println!("Stored {} of {} messages", report.stored, report.received);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod config;
pub mod error_handling;
pub mod geocode;
pub mod initialization;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod queue;
pub mod resolver;
pub mod storage;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use pipeline::{IngestionPipeline, PipelineState};
pub use run::{run_ingestion, IngestReport};

// Internal run module (wires collaborators into the pipeline)
mod run {
    use std::time::Instant;

    use anyhow::{Context, Result};
    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::app::{
        listen_for_shutdown, print_final_statistics, shutdown_gracefully, spawn_progress_logger,
    };
    use crate::config::Config;
    use crate::geocode::NominatimGeocoder;
    use crate::initialization::init_client;
    use crate::pipeline::IngestionPipeline;
    use crate::queue::connect_queue;
    use crate::resolver::LocationResolver;
    use crate::storage::{connect_store, PlaceStore};

    /// Results of an ingestion run.
    #[derive(Debug, Clone)]
    pub struct IngestReport {
        /// Messages pulled from the queue
        pub received: usize,
        /// Places written to the store
        pub stored: usize,
        /// Messages dropped by a per-message failure
        pub skipped: usize,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs the ingestion pipeline with the provided configuration.
    ///
    /// Connects the store, the geocoding client and the Kafka consumer, then
    /// processes messages until the queue ends, SIGINT/SIGTERM is received, or
    /// the pipeline hits a fatal error.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The configuration is invalid
    /// - The store, HTTP client or queue consumer cannot be created
    /// - The queue subscription cannot be started
    /// - The consume loop ends on a queue failure or a panic
    pub async fn run_ingestion(config: Config) -> Result<IngestReport> {
        config.validate()?;
        let start_time = Instant::now();

        let store = connect_store(&config.store())
            .await
            .context("Failed to open document store")?;
        store
            .ping()
            .await
            .context("Document store is not reachable")?;

        let geocoder_settings = config.geocoder();
        let client = init_client(&geocoder_settings).context("Failed to create HTTP client")?;
        let geocoder = NominatimGeocoder::new(client, &geocoder_settings.base_url);
        let resolver = LocationResolver::new(geocoder, geocoder_settings.language, config.retry());

        let kafka = config.kafka();
        let source = connect_queue(&kafka).context("Failed to create Kafka consumer")?;
        info!(
            "Consuming {} from {} as group {}",
            kafka.topic,
            kafka.bootstrap_servers(),
            kafka.group_id
        );

        let mut pipeline = IngestionPipeline::new(source, resolver, store);
        let stats = pipeline.stats();

        let background = CancellationToken::new();
        let signal_listener = listen_for_shutdown(pipeline.shutdown_token());
        let progress_logger =
            spawn_progress_logger(start_time, stats.clone(), background.clone());

        let outcome = match pipeline.start().await {
            Ok(()) => pipeline.run().await,
            Err(e) => Err(e),
        };

        // Release the listener too: it also exits once the pipeline token is cancelled.
        pipeline.request_shutdown();
        shutdown_gracefully(background, vec![progress_logger, signal_listener]).await;
        pipeline.store().close().await;
        drop(pipeline);

        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        print_final_statistics(&stats, elapsed_seconds);
        outcome?;

        Ok(IngestReport {
            received: stats.received(),
            stored: stats.stored(),
            skipped: stats.total_skipped(),
            elapsed_seconds,
        })
    }
}
