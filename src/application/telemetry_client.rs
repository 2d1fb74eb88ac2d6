// Telemetry client - Gathers one reading per configured source
use crate::application::telemetry_transport::TelemetryTransport;
use crate::domain::reading::{Reading, Snapshot, TimestampedReading};
use crate::domain::staleness::parse_last_updated;
use crate::domain::telemetry_source::{
    parse_state, parse_timestamp_fields, SourceError, TelemetrySource,
};
use futures::future::join_all;
use std::sync::Arc;

enum Evaluated {
    Plain(Reading),
    Timestamped(TimestampedReading),
}

#[derive(Clone)]
pub struct TelemetryClient {
    transport: Arc<dyn TelemetryTransport>,
    sources: Vec<TelemetrySource>,
}

impl TelemetryClient {
    pub fn new(transport: Arc<dyn TelemetryTransport>, sources: Vec<TelemetrySource>) -> Self {
        Self { transport, sources }
    }

    pub fn sources(&self) -> &[TelemetrySource] {
        &self.sources
    }

    /// Fetch every source concurrently and join before returning.
    /// Never fails: a broken source only yields an error reading.
    pub async fn gather(&self) -> Snapshot {
        let results = join_all(self.sources.iter().map(|source| async move {
            let evaluated = if source.timestamped {
                Evaluated::Timestamped(self.read_timestamped(source).await)
            } else {
                Evaluated::Plain(self.read(source).await)
            };
            (source.id.clone(), evaluated)
        }))
        .await;

        let mut snapshot = Snapshot::default();
        for (id, evaluated) in results {
            match evaluated {
                Evaluated::Plain(reading) => {
                    snapshot.readings.insert(id, reading);
                }
                Evaluated::Timestamped(reading) => {
                    snapshot.timestamped.insert(id, reading);
                }
            }
        }
        snapshot
    }

    pub async fn read(&self, source: &TelemetrySource) -> Reading {
        match self.fetch(source).await {
            Ok(body) => self.evaluate(source, &body),
            Err(e) => {
                tracing::warn!("Source {} failed: {}", source.id, e);
                Reading::error(&source.label)
            }
        }
    }

    pub async fn read_timestamped(&self, source: &TelemetrySource) -> TimestampedReading {
        let body = match self.fetch(source).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Source {} failed: {}", source.id, e);
                return TimestampedReading::new(Reading::error(&source.label), None, None);
            }
        };

        let reading = self.evaluate(source, &body);
        let (reported_state, last_updated_text) = parse_timestamp_fields(&body);
        let last_updated = last_updated_text.as_deref().and_then(parse_last_updated);

        if last_updated.is_none() {
            tracing::warn!(
                "Source {} has no usable last_updated ({:?})",
                source.id,
                last_updated_text
            );
        }

        TimestampedReading::new(reading, last_updated, reported_state)
    }

    async fn fetch(&self, source: &TelemetrySource) -> Result<String, SourceError> {
        tracing::debug!("Fetching {} from {}", source.id, source.endpoint_path);
        self.transport
            .get(&source.endpoint_path)
            .await
            .map_err(|e| SourceError::Fetch(format!("{:#}", e)))
    }

    fn evaluate(&self, source: &TelemetrySource, body: &str) -> Reading {
        let state = parse_state(body);
        if let Some(e) = state.error() {
            tracing::warn!("Source {} failed: {}", source.id, e);
        }
        source.to_reading(&state)
    }
}
