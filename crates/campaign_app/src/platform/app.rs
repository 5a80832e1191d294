use std::time::Duration;

use anyhow::Context;
use campaign_core::{update, Campaign, CampaignState, Msg};
use campaign_engine::{
    export_campaign, EngineEvent, EngineHandle, ExportOptions, ReplayEventSource, SourceError,
    StreamSummary, WsEventSource,
};
use chrono::Utc;
use clap::Parser;
use engine_logging::{engine_info, engine_warn};

use super::cli::{Cli, Command};
use super::effects::{EffectRunner, Notifier, TerminalNotifier};
use super::{logging, render, settings};

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = settings::load(cli.settings.as_deref());
    let mut settings = loaded.as_ref().cloned().unwrap_or_default();
    cli.apply_overrides(&mut settings);
    logging::initialize(settings.log_destination);
    if let Err(err) = &loaded {
        engine_warn!("Using default settings: {:#}", err);
    }

    let campaign_id = cli.campaign_id();
    engine_logging::set_active_campaign(campaign_id);

    let engine = EngineHandle::new();
    match &cli.command {
        Command::Replay { file, .. } => engine.start(ReplayEventSource::new(file)),
        Command::Watch { url, .. } => engine.start(WsEventSource::new(
            url.clone(),
            campaign_id,
            settings.stream.clone(),
        )),
    }

    let mut campaign = Campaign::new(campaign_id);
    campaign.created_at = Some(Utc::now());
    let (state, _) = update(CampaignState::new(), Msg::CampaignCreated(campaign));

    let runner = EffectRunner::new(TerminalNotifier);
    let (state, outcome) = drive(
        &engine,
        state,
        &runner,
        Duration::from_millis(settings.render_interval_ms),
    );

    let mut campaign = state.into_campaign();
    campaign.updated_at = Some(Utc::now());
    print!("{}", render::summary(&campaign));

    if let Some(dir) = &settings.export_dir {
        let summary = export_campaign(dir, &campaign, &ExportOptions::default())
            .with_context(|| format!("failed to export campaign {} to {dir:?}", campaign.id))?;
        println!(
            "exported {} and {}",
            summary.results_path.display(),
            summary.errors_path.display()
        );
    }

    let stream = outcome.context("event stream failed")?;
    engine_info!(
        "Done: frames={} skipped={} cancelled={}",
        stream.frames,
        stream.skipped,
        stream.cancelled
    );
    Ok(())
}

/// Feed engine events through the reducer until the stream ends.
fn drive<N: Notifier>(
    engine: &EngineHandle,
    mut state: CampaignState,
    runner: &EffectRunner<N>,
    render_interval: Duration,
) -> (CampaignState, Result<StreamSummary, SourceError>) {
    loop {
        let msg = match engine.recv_timeout(render_interval) {
            Some(EngineEvent::Frame(frame)) => Msg::Stream {
                seq: frame.seq,
                event: frame.event,
            },
            Some(EngineEvent::FrameSkipped { reason }) => {
                engine_warn!("Frame skipped: {}", reason);
                continue;
            }
            Some(EngineEvent::StreamEnded { result }) => {
                if state.consume_dirty() {
                    println!("{}", render::progress_line(&state.view()));
                }
                return (state, result);
            }
            None => Msg::NoOp,
        };

        let (next, effects) = update(state, msg);
        state = next;
        if runner.run(effects).stop_stream {
            engine.stop();
        }
        if state.consume_dirty() {
            println!("{}", render::progress_line(&state.view()));
        }
    }
}
