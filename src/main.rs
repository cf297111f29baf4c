//! Fish Launch headless runner
//!
//! Drives a session at a fixed frame rate with the autopilot standing in for
//! the player, then exports the trial log.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use fish_launch::Settings;
use fish_launch::autopilot::{Autopilot, AutopilotConfig};
use fish_launch::consts::*;
use fish_launch::persistence::{DATA_FILE_NAME, write_export};
use fish_launch::platform::{Command, InputState};
use fish_launch::sim::{GameSession, tick};
use fish_launch::ui::FrameView;

#[derive(Parser, Debug)]
#[command(name = "fish-launch")]
#[command(about = "Run a headless Fish Launch session and export its trial log")]
struct Args {
    /// RNG seed for the session
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Simulated play time in seconds
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    #[arg(long, default_value_t = SCREEN_WIDTH)]
    width: f32,

    #[arg(long, default_value_t = SCREEN_HEIGHT)]
    height: f32,

    /// JSON settings file overriding the default balance
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Export path
    #[arg(long, default_value = DATA_FILE_NAME)]
    out: PathBuf,

    /// Let birds fly without anyone shooting
    #[arg(long)]
    no_autopilot: bool,
}

/// Game instance holding all state
struct Game {
    session: GameSession,
    input: InputState,
    autopilot: Option<Autopilot>,
    accumulator: f32,
    out: PathBuf,
}

impl Game {
    /// Run simulation ticks for one display frame
    fn update(&mut self, dt: f32) -> Result<()> {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if let Some(pilot) = self.autopilot.as_mut() {
                for event in pilot.next_events(&self.session) {
                    self.input.handle(event);
                }
            }
            tick(&mut self.session, self.input.tick_input(), SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.clear_one_shots();
        }

        for command in self.input.drain_commands() {
            match command {
                Command::Export => self.export()?,
                Command::ToggleStats => {
                    log::info!("Stats overlay: {}", self.input.show_stats);
                }
            }
        }
        Ok(())
    }

    fn export(&self) -> Result<()> {
        write_export(&self.out, self.session.recorder.log())
            .with_context(|| format!("writing {}", self.out.display()))?;
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Fish Launch (headless) starting...");

    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let session = GameSession::new(args.seed, settings, args.width, args.height);
    log::info!("Session initialized with seed: {}", args.seed);

    let mut game = Game {
        session,
        input: InputState::new(),
        autopilot: (!args.no_autopilot)
            .then(|| Autopilot::new(args.seed, AutopilotConfig::default())),
        accumulator: 0.0,
        out: args.out.clone(),
    };

    let frames = (args.seconds.max(0.0) / SIM_DT).round() as u64;
    for _ in 0..frames {
        game.update(SIM_DT)?;
    }
    game.export()?;

    let view = FrameView::capture(&game.session, true);
    let [score, level, streak] = view.hud.lines();
    println!("Frames:  {}", game.session.frame);
    println!("{score}  {level}  {streak}");
    if let Some(stats) = view.stats {
        println!(
            "Shots:   {} ({} caught, accuracy {:.0}%)",
            stats.shots,
            stats.hits,
            stats.accuracy.unwrap_or(0.0) * 100.0
        );
        println!(
            "Birds:   size {:.0}, max speed {:.1}",
            stats.bird_size, stats.bird_max_speed
        );
    }
    println!(
        "Wrote {} records to {}",
        game.session.recorder.log().len(),
        args.out.display()
    );
    Ok(())
}
