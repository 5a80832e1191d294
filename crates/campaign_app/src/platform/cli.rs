use std::path::PathBuf;

use campaign_core::CampaignId;
use clap::{Parser, Subcommand};

use super::logging::LogDestination;
use super::settings::Settings;

#[derive(Debug, Parser)]
#[command(
    name = "livequery",
    version,
    about = "Follow a live query campaign and summarize its results"
)]
pub struct Cli {
    /// RON settings file.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    /// Where log output goes; overrides the settings file.
    #[arg(long, value_enum, global = true)]
    pub log: Option<LogDestination>,
    /// Export results and errors here once the stream ends.
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay newline-delimited JSON frames from a file.
    Replay {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        campaign_id: CampaignId,
    },
    /// Subscribe to a running campaign over a WebSocket.
    Watch {
        #[arg(long)]
        url: String,
        #[arg(long)]
        campaign_id: CampaignId,
    },
}

impl Cli {
    pub fn campaign_id(&self) -> CampaignId {
        match &self.command {
            Command::Replay { campaign_id, .. } | Command::Watch { campaign_id, .. } => *campaign_id,
        }
    }

    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(log) = self.log {
            settings.log_destination = log;
        }
        if let Some(dir) = &self.export_dir {
            settings.export_dir = Some(dir.clone());
        }
    }
}
