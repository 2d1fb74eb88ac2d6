use crate::domain::layout::PanelSize;
use anyhow::ensure;
use crate::domain::staleness::DEFAULT_THRESHOLD_MINUTES;
use crate::domain::telemetry_source::{NumericFormat, TelemetrySource};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub panel: PanelSettings,
    pub fonts: FontSettings,
    #[serde(default)]
    pub staleness: StalenessSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            width: PanelSize::PORTRAIT.width,
            height: PanelSize::PORTRAIT.height,
        }
    }
}

impl PanelSettings {
    pub fn size(&self) -> PanelSize {
        PanelSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Glyph family names for the regular and bold faces.
#[derive(Debug, Deserialize, Clone)]
pub struct FontSettings {
    pub regular: String,
    pub bold: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StalenessSettings {
    pub threshold_minutes: i64,
}

impl Default for StalenessSettings {
    fn default() -> Self {
        Self {
            threshold_minutes: DEFAULT_THRESHOLD_MINUTES,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_black_file")]
    pub black_file: String,
    #[serde(default = "default_accent_file")]
    pub accent_file: String,
    #[serde(default = "default_preview_file")]
    pub preview_file: String,
    /// Working directory of the refresh program
    pub refresh_dir: PathBuf,
    /// Where the refresh program picks up its rasters, relative to `refresh_dir`
    #[serde(default = "default_picture_subdir")]
    pub picture_subdir: PathBuf,
    pub refresh_command: String,
    #[serde(default)]
    pub refresh_args: Vec<String>,
    /// Image viewer for preview mode; no viewer means the preview is only written
    #[serde(default)]
    pub viewer: Option<String>,
}

impl OutputSettings {
    pub fn black_path(&self) -> PathBuf {
        self.dir.join(&self.black_file)
    }

    pub fn accent_path(&self) -> PathBuf {
        self.dir.join(&self.accent_file)
    }

    pub fn preview_path(&self) -> PathBuf {
        self.dir.join(&self.preview_file)
    }

    pub fn picture_dir(&self) -> PathBuf {
        self.refresh_dir.join(&self.picture_subdir)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub id: String,
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_divisor")]
    pub divisor: f64,
    #[serde(default)]
    pub precision: usize,
    #[serde(default)]
    pub timestamped: bool,
}

impl From<SourceConfig> for TelemetrySource {
    fn from(config: SourceConfig) -> Self {
        TelemetrySource {
            id: config.id,
            label: config.label,
            endpoint_path: config.path,
            unit_suffix: config.unit,
            numeric_format: NumericFormat {
                divisor: config.divisor,
                precision: config.precision,
                prefix: config.prefix,
            },
            timestamped: config.timestamped,
        }
    }
}

impl DisplayConfig {
    /// Reject settings that would load fine but break every cycle.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.telemetry.timeout_secs > 0,
            "telemetry.timeout_secs must be at least 1"
        );
        ensure!(
            self.staleness.threshold_minutes > 0,
            "staleness.threshold_minutes must be positive, got {}",
            self.staleness.threshold_minutes
        );
        ensure!(
            self.panel.width > 0 && self.panel.height > 0,
            "panel size {}x{} is empty",
            self.panel.width,
            self.panel.height
        );
        Ok(())
    }
}

impl SourcesConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        for source in &self.sources {
            ensure!(
                source.divisor.is_finite() && source.divisor != 0.0,
                "source {} has divisor {}, expected a non-zero number",
                source.id,
                source.divisor
            );
        }
        Ok(())
    }

    pub fn into_sources(self) -> Vec<TelemetrySource> {
        self.sources.into_iter().map(TelemetrySource::from).collect()
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_black_file() -> String {
    "black.bmp".to_string()
}

fn default_accent_file() -> String {
    "red.bmp".to_string()
}

fn default_preview_file() -> String {
    "preview.bmp".to_string()
}

fn default_picture_subdir() -> PathBuf {
    PathBuf::from("pic")
}

fn default_divisor() -> f64 {
    1.0
}

/// Load `display.toml` from `dir`, with `EPAPER__SECTION__KEY` environment overrides.
pub fn load_display_config(dir: &Path) -> anyhow::Result<DisplayConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(&dir.join("display").to_string_lossy()))
        .add_source(config::Environment::with_prefix("EPAPER").separator("__"))
        .build()?;

    let display: DisplayConfig = settings.try_deserialize()?;
    display.validate()?;
    Ok(display)
}

pub fn load_sources_config(dir: &Path) -> anyhow::Result<SourcesConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(&dir.join("sources").to_string_lossy()))
        .build()?;

    let sources: SourcesConfig = settings.try_deserialize()?;
    sources.validate()?;
    Ok(sources)
}
