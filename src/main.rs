//! Balloon Pop headless runner
//!
//! Plays one session against a scripted hand that sweeps across the frame,
//! clenching and opening as it goes, then prints the final tallies.
//!
//! Usage: `balloon-pop [config.json] [--seed N] [--json]`

use balloon_pop::consts::NOMINAL_FPS;
use balloon_pop::sim::{Clock, GameSession, ManualClock};
use balloon_pop::{FrameBounds, GameConfig, GameError, Pointer, PointerState};

const FRAME_WIDTH: f32 = 640.0;
const FRAME_HEIGHT: f32 = 480.0;
const DEFAULT_SEED: u64 = 0x5EED;

struct Args {
    config: Option<String>,
    seed: u64,
    json: bool,
}

fn parse_args() -> Result<Args, GameError> {
    let mut args = Args {
        config: None,
        seed: DEFAULT_SEED,
        json: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| GameError::InvalidConfig("--seed needs a value".into()))?;
                args.seed = value
                    .parse()
                    .map_err(|_| GameError::InvalidConfig(format!("bad seed: {value}")))?;
            }
            "--json" => args.json = true,
            _ => args.config = Some(arg),
        }
    }
    Ok(args)
}

/// Scripted hand: a slow Lissajous sweep, fist closed two thirds of the time.
/// A second hand joins halfway through the run.
fn scripted_pointers(t: f64) -> PointerState {
    let t = t as f32;
    let mut pointers = vec![Pointer::new(
        0.5 + 0.45 * (t * 0.9).sin(),
        0.5 + 0.45 * (t * 1.3).cos(),
        (t * 2.0).rem_euclid(3.0) < 2.0,
    )];
    if t > 10.0 {
        pointers.push(Pointer::new(
            0.5 + 0.4 * (t * 1.7).cos(),
            0.5 + 0.4 * (t * 0.7).sin(),
            true,
        ));
    }
    PointerState::new(pointers)
}

fn main() -> Result<(), GameError> {
    env_logger::init();
    log::info!("Balloon Pop (headless) starting...");

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let clock = ManualClock::new(0.0);
    let frame = FrameBounds::new(FRAME_WIDTH, FRAME_HEIGHT);
    let mut session = GameSession::new(config, frame, args.seed, clock.clone())?;

    log::info!(
        "Playing {:.0}s at {} fps",
        session.config().game_duration,
        NOMINAL_FPS
    );
    let frame_dt = 1.0 / NOMINAL_FPS as f64;
    while !session.is_expired() {
        clock.advance(frame_dt);
        let pointers = scripted_pointers(clock.now());
        let snapshot = session.tick(&pointers)?;
        for capture in &snapshot.captures {
            log::info!(
                "{:6.2}s  popped {} ({}) with hand {}",
                snapshot.elapsed,
                capture.target_id,
                capture.sprite,
                capture.pointer_index
            );
        }
    }

    let report = session.final_report()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
