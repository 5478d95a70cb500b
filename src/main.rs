//! Horde Survival headless runner
//!
//! Plays seeded rounds at 60 Hz with the idle autopilot, auto-picking every
//! upgrade and artifact offer, then prints the final snapshot as JSON.
//!
//! Flags: `--seed N`, `--tuning PATH`, `--save PATH`, `--rounds N`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use horde_survival::consts::SIM_DT;
use horde_survival::sim::{GameEvent, GamePhase, Session, TickInput, tick};
use horde_survival::{ArtifactStore, Tuning};

/// Run seeded horde-survival rounds without a renderer
#[derive(Debug, Parser)]
#[command(name = "horde-survival", version)]
struct Options {
    /// Run seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,
    /// Balance table (JSON); defaults apply when omitted or unreadable
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Owned-artifact list to load and update after each victory
    #[arg(long)]
    save: Option<PathBuf>,
    /// Rounds to finish (victory or game over) before stopping
    #[arg(long, default_value_t = 1)]
    rounds: u32,
}

fn main() -> ExitCode {
    env_logger::init();

    let options = Options::parse();

    let tuning = options
        .tuning
        .as_deref()
        .map(Tuning::load)
        .unwrap_or_default();
    let store = options.save.clone().map(ArtifactStore::new);
    let owned = store.as_ref().map(|s| s.load()).unwrap_or_default();

    log::info!("Horde Survival (headless) starting, seed {}", options.seed);
    let mut session = Session::new(options.seed, tuning, owned);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let ticks_per_round = (session.tuning.session.length_secs / SIM_DT).ceil() as u64 + 60;
    let mut finished = 0;
    let mut last = None;

    for _ in 0..ticks_per_round * options.rounds as u64 {
        if let Some(report) = tick(&mut session, &input, SIM_DT) {
            for event in &report.events {
                match event {
                    GameEvent::Victory { .. } | GameEvent::GameOver => finished += 1,
                    GameEvent::LevelUp { .. } => {}
                }
            }
            last = Some(report.snapshot);
        }

        match session.phase {
            GamePhase::LevelUp => {
                if let Some(&pick) = session.upgrade_offer().first() {
                    session.choose_upgrade(pick);
                }
            }
            GamePhase::Victory | GamePhase::GameOver if finished >= options.rounds => break,
            GamePhase::Victory => {
                let pick = session.artifact_offer().first().copied();
                session.choose_artifact(pick);
                if let Some(store) = &store {
                    if let Err(err) = store.save(session.owned_artifacts()) {
                        log::error!("Failed to save artifacts: {err}");
                    }
                }
            }
            GamePhase::GameOver => session.restart(),
            GamePhase::Playing | GamePhase::Paused => {}
        }
    }

    let snapshot = last.unwrap_or_else(|| session.snapshot());
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            log::error!("Failed to encode snapshot: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
