use anyhow::{Context, Result};
use log::info;

mod core;
mod engine;
mod game;

use crate::core::GameConfig;
use crate::engine::game_loop::TICK_MS;
use crate::engine::input::{Action, InputEvent};
use crate::game::{GameController, NavParams, Navigator, PlayerToken, Screen, ScreenStack, TickOutcome};

/// Frame cap for the headless run (five minutes at 60 Hz)
const MAX_FRAMES: u64 = 60 * 60 * 5;

/// Frames between progress log lines
const REPORT_EVERY: u64 = 600;

/// Scripted left/right sweeps standing in for touch input
fn scripted_input(frame: u64) -> Option<InputEvent> {
    match frame % 240 {
        0 => Some(InputEvent::Press(Action::MoveLeft)),
        90 => Some(InputEvent::Release(Action::MoveLeft)),
        120 => Some(InputEvent::Press(Action::MoveRight)),
        210 => Some(InputEvent::Release(Action::MoveRight)),
        _ => None,
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Hell Descent (headless)...");

    // Usage: hell-descent [config.json] [player-token]
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => GameConfig::default(),
    };
    let token = args.next().map(PlayerToken::new).unwrap_or_default();

    let mut nav = ScreenStack::new();
    nav.navigate_to(Screen::Selection, NavParams::default());
    nav.navigate_to(Screen::Game, NavParams::with_player(token.clone()));

    let mut game = GameController::new(config, token).context("Failed to start session")?;

    for frame in 0..MAX_FRAMES {
        if let Some(event) = scripted_input(frame) {
            game.handle_input(event);
        }

        match game.tick(TICK_MS)? {
            TickOutcome::Running { score, lives } if frame % REPORT_EVERY == 0 => {
                let clock = game.clock();
                let player = game.player();
                let depth = player.position(game.world())?.y;
                info!(
                    "Frame {} ({:.1} s): score {}, lives {}, player at y {:.0}, {} surfaces, {} fireballs, scrolled {:.0} px",
                    clock.frame_count(),
                    clock.elapsed_ms() / 1000.0,
                    score,
                    lives,
                    depth,
                    game.world().registry().surfaces().count(),
                    game.projectiles().live().len(),
                    game.scroll_offset()
                );
                if player.status.touching_spike {
                    info!("Player is standing on spikes");
                }
                if let Some(treadmill) = player.status.current_treadmill {
                    info!("Player is riding treadmill {:?}", treadmill);
                }
            }
            TickOutcome::GameOver(notice) => {
                info!(
                    "Game over ({:?}) after {} frames, final score {}",
                    notice.reason, frame, notice.final_score
                );
                game.exit_to_selection(&mut nav);
                break;
            }
            _ => {}
        }
    }

    if game.notice().is_none() {
        info!(
            "Frame cap reached with score {} and {} lives",
            game.session().score(),
            game.session().lives()
        );
        game.go_back(&mut nav);
    }

    info!(
        "Ended on {:?} screen after {} screen changes",
        nav.current(),
        nav.history().len()
    );
    Ok(())
}
