// Main entry point - Dependency injection and one render cycle
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{sync::Arc, time::Duration};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::compositor::Compositor;
use crate::application::output_publisher::OutputPublisher;
use crate::application::render_cycle::RenderCycle;
use crate::application::telemetry_client::TelemetryClient;
use crate::application::text_rasterizer::TextRasterizer;
use crate::domain::layout::REQUIRED_FONTS;
use crate::domain::staleness::StalenessGate;
use crate::infrastructure::config::{load_display_config, load_sources_config};
use crate::infrastructure::http_transport::HttpTransport;
use crate::infrastructure::mono_fonts::MonoFontRasterizer;
use crate::infrastructure::process_runner::ProcessRunner;
use crate::presentation::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let display_config = load_display_config(&cli.config_dir)
        .with_context(|| format!("Failed to load display config from {}", cli.config_dir.display()))?;
    let sources_config = load_sources_config(&cli.config_dir)
        .with_context(|| format!("Failed to load sources from {}", cli.config_dir.display()))?;

    // Fonts must resolve before anything is fetched or written
    let rasterizer = MonoFontRasterizer::new(&display_config.fonts);
    rasterizer.ensure_fonts(&REQUIRED_FONTS)?;

    // Adapters (infrastructure layer)
    let transport = Arc::new(HttpTransport::new(
        display_config.telemetry.base_url.clone(),
        Duration::from_secs(display_config.telemetry.timeout_secs),
    )?);
    let runner = Arc::new(ProcessRunner);

    // Services (application layer)
    let client = TelemetryClient::new(transport, sources_config.into_sources());
    let gate = StalenessGate::new(chrono::Duration::minutes(display_config.staleness.threshold_minutes));
    let compositor = Compositor::new(display_config.panel.size(), Arc::new(rasterizer));
    let publisher = OutputPublisher::new(display_config.output.clone(), runner, cli.run_mode());

    tracing::info!(
        "Rendering {} sources from {} in {:?} mode",
        client.sources().len(),
        display_config.telemetry.base_url,
        cli.run_mode()
    );

    let cycle = RenderCycle::new(client, gate, compositor, publisher);
    cycle.run(chrono::Utc::now()).await?;

    Ok(())
}
