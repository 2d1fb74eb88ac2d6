// Command line arguments
use crate::application::output_publisher::RunMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "epaper-telemetry", version, about = "Render home telemetry onto a two-colour e-paper panel")]
pub struct Cli {
    /// Write a combined preview and open it in the viewer instead of refreshing the panel
    #[arg(long)]
    pub test: bool,

    /// Directory holding display.toml and sources.toml
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,
}

impl Cli {
    pub fn run_mode(&self) -> RunMode {
        if self.test {
            RunMode::Preview
        } else {
            RunMode::Production
        }
    }
}
