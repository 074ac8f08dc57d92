//! Headless brawl runner
//!
//! Runs a session without a renderer, driving the player from a short
//! input script and logging every game event.
//!
//! Run with: cargo run -p brawl_game --bin brawl [config.toml]

use brawl_game::prelude::*;

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u64 = 900;

/// Key presses and releases by frame
const SCRIPT: &[(u64, &str, bool)] = &[
    (30, "KeyD", true),
    (45, "KeyD", false),
    (50, "KeyW", true),
    (110, "KeyW", false),
    (120, "KeyF", true),
    (122, "KeyF", false),
    (150, "KeyE", true),
    (152, "KeyE", false),
    (180, "KeyQ", true),
    (182, "KeyQ", false),
    (240, "KeyG", true),
    (242, "KeyG", false),
    (300, "Space", true),
    (302, "Space", false),
];

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let scene = HeadlessScene::new();
    let mut session = Session::new(config, Box::new(scene.clone()))?;
    let npcs = session.spawn_npcs()?;
    log::info!("{} NPCs in the room", npcs.len());

    for frame in 0..FRAMES {
        for &(_, key, down) in SCRIPT.iter().filter(|(f, _, _)| *f == frame) {
            let input = session.input_mut();
            if down {
                input.key_down(key);
            } else {
                input.key_up(key);
            }
        }
        // Slow sweep to the left while walking
        if (50..110).contains(&frame) {
            session.input_mut().pointer_moved(-2.0, 0.0);
        }

        session.tick(FRAME_DT)?;

        for event in session.drain_events() {
            log::info!("[{:>4}] {:?}", frame, event);
        }
        if session.is_game_over() {
            log::info!("Game over at frame {}", frame);
            break;
        }
    }

    if let Some(player) = session.player() {
        log::info!(
            "Finished after {:.1}s: {} at {:.0} health, score {}",
            session.time(),
            player.name,
            player.health(),
            player.score()
        );
    }
    log::info!("{} visuals still attached", scene.attached_count());
    Ok(())
}
