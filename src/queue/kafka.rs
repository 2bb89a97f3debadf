//! Kafka consumer built on `rdkafka`'s `StreamConsumer`.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;

use super::MessageSource;
use crate::config::{KafkaSettings, KAFKA_SESSION_TIMEOUT_MS};
use crate::error_handling::QueueError;

/// Broker metadata must arrive within this window for `start` to succeed.
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Single consumer-group member reading one topic.
///
/// Offsets are committed automatically by the client; a message is not
/// redelivered after it has been handed to the pipeline.
pub struct KafkaSource {
    consumer: Option<Arc<StreamConsumer>>,
    topic: String,
    subscribed: bool,
}

/// Creates a consumer for `settings` without contacting the broker.
///
/// The connection is established lazily; [`MessageSource::start`] verifies it.
pub fn connect_queue(settings: &KafkaSettings) -> Result<KafkaSource, QueueError> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", settings.bootstrap_servers())
        .set("group.id", &settings.group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest")
        .set("enable.partition.eof", "false")
        .set("session.timeout.ms", KAFKA_SESSION_TIMEOUT_MS.to_string())
        .create()?;

    debug!(
        "Created Kafka consumer for {} (group {})",
        settings.bootstrap_servers(),
        settings.group_id
    );

    Ok(KafkaSource {
        consumer: Some(Arc::new(consumer)),
        topic: settings.topic.clone(),
        subscribed: false,
    })
}

impl KafkaSource {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

impl MessageSource for KafkaSource {
    async fn start(&mut self) -> Result<(), QueueError> {
        let consumer = self.consumer.clone().ok_or(QueueError::NotRunning)?;

        // Metadata fetch blocks on the network; keep it off the runtime threads.
        let topic = self.topic.clone();
        let client = Arc::clone(&consumer);
        tokio::task::spawn_blocking(move || {
            client
                .fetch_metadata(Some(&topic), METADATA_TIMEOUT)
                .map(|_| ())
        })
        .await??;

        consumer.subscribe(&[self.topic.as_str()])?;
        self.subscribed = true;
        info!("Subscribed to Kafka topic {}", self.topic);
        Ok(())
    }

    async fn next_record(&mut self) -> Option<Result<Vec<u8>, QueueError>> {
        let consumer = match (&self.consumer, self.subscribed) {
            (Some(consumer), true) => consumer,
            _ => return Some(Err(QueueError::NotRunning)),
        };

        match consumer.recv().await {
            Ok(message) => {
                debug!(
                    "Received record from {}[{}]@{}",
                    message.topic(),
                    message.partition(),
                    message.offset()
                );
                Some(Ok(message.payload().map(<[u8]>::to_vec).unwrap_or_default()))
            }
            Err(e) => {
                let e = QueueError::from(e);
                if !e.is_fatal() {
                    warn!("Kafka consume error on topic {}: {e}", self.topic);
                }
                Some(Err(e))
            }
        }
    }

    /// Leaves the consumer group and releases the client.
    ///
    /// Both steps block until librdkafka has finished the group handshake, so
    /// inside a runtime they run on the blocking pool and `stop` returns at once.
    fn stop(&mut self) {
        let Some(consumer) = self.consumer.take() else {
            return;
        };
        let subscribed = std::mem::take(&mut self.subscribed);
        let topic = self.topic.clone();
        let close = move || {
            if subscribed {
                consumer.unsubscribe();
            }
            drop(consumer);
            info!("Kafka consumer for topic {topic} released");
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(close);
            }
            Err(_) => close(),
        }
    }
}
