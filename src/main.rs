//! Vocab Arena headless demo
//!
//! Runs one session with a simple autopilot standing in for the player and a
//! scripted quiz collaborator answering challenges, then prints the results.
//!
//! Usage:
//!   vocab-arena [seed] [--difficulty easy|normal|hard] [--settings <path>]

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use glam::Vec2;

use vocab_arena::audio::{AudioManager, LogAudio};
use vocab_arena::consts::*;
use vocab_arena::highscores::format_elapsed;
use vocab_arena::render::HeadlessSurface;
use vocab_arena::sim::{ArenaDriver, DeviceSnapshot, Interstitial, VocabChallenge};
use vocab_arena::{ArenaError, Difficulty, HighScores, Settings, Tuning};

/// Hard stop for the demo (ten minutes of play)
const MAX_FRAMES: u64 = TICKS_PER_SECOND as u64 * 600;

const WORDS: &[(&str, &str)] = &[
    ("laconic", "using very few words"),
    ("ephemeral", "lasting for a very short time"),
    ("garrulous", "excessively talkative"),
    ("obdurate", "stubbornly refusing to change"),
    ("pellucid", "translucently clear"),
    ("sanguine", "optimistic in a difficult situation"),
];

#[derive(Parser)]
#[command(name = "vocab-arena")]
#[command(about = "Vocab Arena - play one headless session with an autopilot hero")]
struct Args {
    /// Seed for the session RNG
    #[arg(default_value_t = 7)]
    seed: u64,

    /// Difficulty preset (overrides the settings file)
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(value).ok_or_else(|| format!("expected easy, normal or hard, got '{}'", value))
}

fn main() {
    let args = Args::parse();
    env_logger::init();
    log::info!("Vocab Arena (headless) starting...");

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ArenaError> {
    let seed = args.seed;
    let mut settings = args
        .settings
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
    }

    let challenges = WORDS
        .iter()
        .map(|(word, definition)| VocabChallenge {
            definition: Some(definition.to_string()),
            ..VocabChallenge::new(*word)
        })
        .collect();

    // The autopilot flees whatever the main loop marks as the nearest threat
    let threat = Rc::new(Cell::new(Vec2::ZERO));
    let provider = {
        let threat = Rc::clone(&threat);
        move || {
            let away = -threat.get();
            DeviceSnapshot::stick(away.x, away.y)
        }
    };

    let audio = AudioManager::with_settings(Box::new(LogAudio), &settings);
    let mut driver = ArenaDriver::start(seed, &Tuning::default(), &settings, challenges, provider, audio)?;
    let mut surface = HeadlessSurface::default();

    for frame in 0..MAX_FRAMES {
        let now_ms = frame as f64 * 1000.0 / TICKS_PER_SECOND as f64;
        surface.clear();
        let output = driver.frame(now_ms, &mut surface);

        if let Some(snapshot) = output.snapshot.filter(|_| frame % (TICKS_PER_SECOND as u64 * 10) == 0) {
            log::info!(
                "t={} hp {}/{} lvl {} xp {}/{} score {}",
                format_elapsed(snapshot.elapsed_seconds),
                snapshot.hp,
                snapshot.max_hp,
                snapshot.level,
                snapshot.xp,
                snapshot.xp_to_next_level,
                snapshot.score
            );
        }

        answer_interstitial(&mut driver)?;
        enrich_next_word(&mut driver, frame);
        threat.set(nearest_threat(driver.arena()));

        if driver.arena().is_over() {
            break;
        }
    }

    let Some(summary) = driver.stop() else {
        log::info!("Session still running after {} frames; abandoned", MAX_FRAMES);
        return Ok(());
    };

    let path = std::env::temp_dir().join("vocab-arena-highscores.json");
    let mut scores = HighScores::load(&path);
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);
    if let Some(rank) = scores.add(summary.clone(), timestamp) {
        log::info!("Leaderboard rank {}", rank);
        scores.save(&path)?;
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Stand-in for the quiz UI: even-length words are answered correctly
fn answer_interstitial<P: vocab_arena::sim::InputProvider>(
    driver: &mut ArenaDriver<P>,
) -> Result<(), ArenaError> {
    match driver.arena().pending_interstitial() {
        Some(Interstitial::Challenge(challenge)) => {
            let correct = challenge.word.len() % 2 == 0;
            driver.resolve_challenge(correct)
        }
        Some(Interstitial::UpgradeChoice { options }) => {
            let id = options.first().map(|o| o.id);
            match id {
                Some(id) => driver.choose_upgrade(id),
                None => Ok(()),
            }
        }
        None => Ok(()),
    }
}

/// Stand-in for background enrichment: media arrives for the next word later
fn enrich_next_word<P: vocab_arena::sim::InputProvider>(driver: &mut ArenaDriver<P>, frame: u64) {
    if frame % (TICKS_PER_SECOND as u64 * 5) != 0 {
        return;
    }
    let queue = &mut driver.arena_mut().session.challenges;
    let Some(word) = queue.peek().map(|c| c.word.clone()) else {
        return;
    };
    let url = format!("https://images.example/{}.png", word);
    if queue.enrich(&word, &url) {
        log::debug!("Enriched '{}'", word);
    }
}

/// Unit vector toward the closest enemy or hostile shot, weighted by proximity
fn nearest_threat(arena: &vocab_arena::sim::Arena) -> Vec2 {
    let hero = arena.store.hero.pos;
    let mut push = arena
        .store
        .enemies
        .iter()
        .chain(&arena.store.enemy_projectiles)
        .filter(|e| e.pos.distance(hero) < 200.0)
        .fold(Vec2::ZERO, |acc, e| {
            let offset = e.pos - hero;
            acc + offset.normalize_or_zero() / offset.length().max(1.0)
        });

    // Lean back toward the center so the hero is not pinned to a wall
    let center = Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0);
    push += (hero - center) / (ARENA_WIDTH * 40.0);
    push.normalize_or_zero()
}
