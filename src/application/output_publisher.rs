// Output publisher - Writes the rasters and hands them to the display pipeline
use crate::application::command_runner::CommandRunner;
use crate::application::compositor::Planes;
use crate::infrastructure::bmp_codec::{encode_plane, encode_preview};
use crate::infrastructure::config::OutputSettings;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Push the rasters to the panel through the refresh program
    Production,
    /// Write a combined preview and open it locally; the panel is left alone
    Preview,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub black_path: PathBuf,
    pub accent_path: PathBuf,
    pub preview_path: Option<PathBuf>,
    /// Exit code of the refresh program or viewer, when one ran to completion
    pub exit_code: Option<i32>,
}

#[derive(Clone)]
pub struct OutputPublisher {
    settings: OutputSettings,
    runner: Arc<dyn CommandRunner>,
    mode: RunMode,
}

impl OutputPublisher {
    pub fn new(settings: OutputSettings, runner: Arc<dyn CommandRunner>, mode: RunMode) -> Self {
        Self {
            settings,
            runner,
            mode,
        }
    }

    pub async fn publish(&self, planes: &Planes) -> Result<PublishOutcome> {
        tokio::fs::create_dir_all(&self.settings.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.settings.dir.display()))?;

        let black_path = self.settings.black_path();
        let accent_path = self.settings.accent_path();
        write_file(&black_path, &encode_plane(&planes.black)).await?;
        write_file(&accent_path, &encode_plane(&planes.accent)).await?;

        let mut outcome = PublishOutcome {
            black_path,
            accent_path,
            preview_path: None,
            exit_code: None,
        };

        match self.mode {
            RunMode::Preview => self.preview(planes, &mut outcome).await?,
            RunMode::Production => self.hand_off(&mut outcome).await?,
        }

        Ok(outcome)
    }

    async fn preview(&self, planes: &Planes, outcome: &mut PublishOutcome) -> Result<()> {
        let preview_path = self.settings.preview_path();
        let preview = encode_preview(&planes.black, &planes.accent)
            .context("Failed to encode preview")?;
        write_file(&preview_path, &preview).await?;

        if let Some(viewer) = &self.settings.viewer {
            let args = vec![preview_path.to_string_lossy().into_owned()];
            outcome.exit_code = self.launch(viewer, &args, None).await;
        }

        outcome.preview_path = Some(preview_path);
        Ok(())
    }

    async fn hand_off(&self, outcome: &mut PublishOutcome) -> Result<()> {
        let picture_dir = self.settings.picture_dir();
        for source in [&outcome.black_path, &outcome.accent_path] {
            let file_name = source
                .file_name()
                .with_context(|| format!("{} has no file name", source.display()))?;
            let target = picture_dir.join(file_name);
            tokio::fs::copy(source, &target).await.with_context(|| {
                format!("Failed to copy {} to {}", source.display(), target.display())
            })?;
        }

        outcome.exit_code = self
            .launch(
                &self.settings.refresh_command,
                &self.settings.refresh_args,
                Some(self.settings.refresh_dir.as_path()),
            )
            .await;
        Ok(())
    }

    /// Failures of the external program are logged, never returned.
    async fn launch(&self, program: &str, args: &[String], cwd: Option<&Path>) -> Option<i32> {
        match self.runner.run(program, args, cwd).await {
            Ok(Some(0)) => {
                tracing::info!("{} finished", program);
                Some(0)
            }
            Ok(Some(code)) => {
                tracing::warn!("{} exited with status {}", program, code);
                Some(code)
            }
            Ok(None) => {
                tracing::warn!("{} was terminated by a signal", program);
                None
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                None
            }
        }
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
