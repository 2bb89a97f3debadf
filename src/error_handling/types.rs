//! Error type definitions.
//!
//! Each stage boundary of the pipeline has its own error type so the consume loop
//! can decide per failure whether to skip the message or stop.

use log::SetLoggerError;
use rdkafka::error::KafkaError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// Collection name is not a plain SQL identifier.
    #[error("Invalid collection name: {0:?}")]
    InvalidCollection(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Queue transport failure.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Kafka metadata fetch failed: {0}")]
    MetadataFetch(#[from] tokio::task::JoinError),

    /// `next_record` was polled on a source that was never started or already stopped.
    #[error("Queue consumer is not running")]
    NotRunning,
}

impl QueueError {
    /// Whether the consumer can no longer deliver records.
    ///
    /// Per-partition consume errors (for example a topic that does not exist yet)
    /// are reported through the same channel as records but leave the consumer
    /// usable, so the caller should log them and poll again.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            QueueError::Kafka(KafkaError::MessageConsumption(_) | KafkaError::PartitionEOF(_))
        )
    }
}

/// Inbound payload could not be read as a coordinate message.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload is not a coordinate message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a single reverse lookup against the provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// The provider did not answer in time. Retried by the resolver.
    #[error("geocoding provider timed out")]
    Timeout,

    #[error("geocoding provider error: {0}")]
    Provider(String),
}

/// Terminal resolution failures surfaced to the pipeline.
///
/// Timeouts never appear here directly; they are retried inside the resolver
/// and become [`ResolveError::Provider`] once the retry budget is spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Sentinel `(0, 0)` coordinates; the provider is not called.
    #[error("empty coordinates")]
    EmptyCoordinates,

    #[error("{0}")]
    Provider(String),
}

/// A required field is missing from the resolved address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
}

/// Storing a batch of places failed.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store acknowledged fewer documents than were submitted.
    #[error("partial insert: {inserted} of {expected} documents stored")]
    PartialInsert { expected: usize, inserted: usize },
}

/// Per-message failure. Every variant means "skip this message and continue".
#[derive(Error, Debug)]
pub enum MessageError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl MessageError {
    /// Statistics category for this failure.
    pub fn error_type(&self) -> ErrorType {
        match self {
            MessageError::Decode(_) => ErrorType::DecodeError,
            MessageError::Resolve(ResolveError::EmptyCoordinates) => {
                ErrorType::EmptyCoordinates
            }
            MessageError::Resolve(ResolveError::Provider(_)) => ErrorType::ProviderError,
            MessageError::Validation(_) => ErrorType::ValidationError,
            MessageError::Persistence(_) => ErrorType::PersistenceError,
        }
    }
}

/// Failures that end the consume loop.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The queue subscription could not be established.
    #[error("failed to start queue consumer: {0}")]
    Start(#[source] QueueError),

    /// Receiving from the queue failed.
    #[error("queue consumer failed: {0}")]
    Source(#[source] QueueError),

    /// Per-message processing panicked.
    #[error("message processing panicked: {0}")]
    Panicked(String),

    /// `start` was called on a pipeline that is not idle.
    #[error("pipeline cannot start from state {0}")]
    InvalidState(&'static str),
}

/// Categories of per-message failures tracked in [`super::ProcessingStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    DecodeError,
    EmptyCoordinates,
    ProviderError,
    ValidationError,
    PersistenceError,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::DecodeError => "Malformed payload",
            ErrorType::EmptyCoordinates => "Empty coordinates",
            ErrorType::ProviderError => "Geocoding provider error",
            ErrorType::ValidationError => "Missing required field",
            ErrorType::PersistenceError => "Persistence error",
        }
    }
}
