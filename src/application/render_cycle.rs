// Render cycle - fetch, gate, lay out, compose, publish
use crate::application::compositor::Compositor;
use crate::application::output_publisher::{OutputPublisher, PublishOutcome};
use crate::application::telemetry_client::TelemetryClient;
use crate::domain::layout::{reading_id, LayoutPlan};
use crate::domain::reading::ReadingStatus;
use crate::domain::staleness::{Freshness, StalenessGate};
use anyhow::Context;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    pub ok: usize,
    pub unavailable: usize,
    pub failed: usize,
    pub net_freshness: Freshness,
    pub outcome: PublishOutcome,
}

#[derive(Clone)]
pub struct RenderCycle {
    client: TelemetryClient,
    gate: StalenessGate,
    compositor: Compositor,
    publisher: OutputPublisher,
}

impl RenderCycle {
    pub fn new(
        client: TelemetryClient,
        gate: StalenessGate,
        compositor: Compositor,
        publisher: OutputPublisher,
    ) -> Self {
        Self {
            client,
            gate,
            compositor,
            publisher,
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> anyhow::Result<CycleSummary> {
        let snapshot = self.client.gather().await;
        for (id, reading) in &snapshot.readings {
            tracing::debug!(
                "{} ({}): {} {:?} raw={:?}",
                id,
                reading.label,
                reading.value,
                reading.status,
                reading.raw_numeric
            );
        }
        for (id, timestamped) in &snapshot.timestamped {
            tracing::debug!(
                "{} ({}): {} reported={:?} last_updated={:?}",
                id,
                timestamped.reading.label,
                timestamped.reading.value,
                timestamped.reported_state,
                timestamped.last_updated
            );
        }

        let net_freshness = self.gate.evaluate(
            snapshot
                .timestamped
                .get(reading_id::NET_METERING)
                .and_then(|r| r.last_updated),
            now,
        );
        if !net_freshness.is_fresh() {
            tracing::warn!(
                "Net metering is {:?} (threshold {} min), flagging it on the panel",
                net_freshness,
                self.gate.threshold().num_minutes()
            );
        }

        let plan = LayoutPlan::build(&snapshot, net_freshness);
        let planes = self
            .compositor
            .compose(&plan)
            .context("Failed to compose panel")?;
        let outcome = self.publisher.publish(&planes).await?;

        let summary = CycleSummary {
            ok: snapshot.count_by_status(ReadingStatus::Ok),
            unavailable: snapshot.count_by_status(ReadingStatus::Unavailable),
            failed: snapshot.count_by_status(ReadingStatus::Error),
            net_freshness,
            outcome,
        };
        tracing::info!(
            "Render cycle done: {} ok, {} unavailable, {} failed, net metering {:?}, wrote {} and {} (preview {:?}, exit {:?})",
            summary.ok,
            summary.unavailable,
            summary.failed,
            summary.net_freshness,
            summary.outcome.black_path.display(),
            summary.outcome.accent_path.display(),
            summary.outcome.preview_path,
            summary.outcome.exit_code
        );

        Ok(summary)
    }
}
