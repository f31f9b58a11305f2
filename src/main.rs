/// Entry point and game loop.
///
/// Startup: config → log file → room → clips → audio backend → session.
/// Each frame: drain keyboard + gamepad, turn held-state changes into
/// key-down / key-up calls, advance the session by real elapsed time,
/// draw.

mod config;
mod domain;
mod scene;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::collision::CueGroup;
use domain::outcome::Outcome;
use scene::{layout, Scene};
use sim::audio::{AudioBackend, SampleBank};
use sim::event::GameEvent;
use sim::session::Session;
use ui::clips::ClipLibrary;
use ui::gamepad::GamepadState;
use ui::input::{ControlLatch, InputState, KeyMap, Transition};
use ui::renderer::Renderer;
use ui::sound::{SilentAudio, SoundEngine};

/// Longest step the simulation takes in one frame, in seconds. A stalled
/// terminal must not teleport the player through a wall.
const MAX_STEP: f32 = 0.1;

fn main() {
    let config = GameConfig::load();
    init_tracing(&config.general.log_file);
    for warning in &config.warnings {
        warn!("config: {warning}");
    }

    let scene = match &config.general.scene {
        Some(path) => layout::load_file(path),
        None => layout::load_default(),
    };
    let scene = match scene {
        Ok(scene) => scene,
        Err(e) => {
            error!("scene failed to load: {e}");
            eprintln!("Could not load the room: {e}");
            return;
        }
    };

    let (clips, bank) = ClipLibrary::generate();
    match SoundEngine::new(&clips) {
        Some(engine) => run(engine, scene, bank, &config),
        None => {
            info!("no audio output; playing silently");
            run(SilentAudio::new(&clips), scene, bank, &config)
        }
    }
}

/// Log to a file: the terminal belongs to the renderer.
fn init_tracing(path: &Path) {
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_env("WHODUNIT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file))
        .init();
}

fn run<B: AudioBackend>(mut audio: B, mut scene: Scene, bank: SampleBank, config: &GameConfig) {
    let mut session = match Session::new(&scene, config.rules, config.tuning, &bank) {
        Ok(session) => session,
        Err(e) => {
            error!("scene is not playable: {e}");
            eprintln!("The room is not playable: {e}");
            return;
        }
    };

    let ambience = audio.play_looped(bank.ambience, config.audio.ambience_volume, config.audio.ambience_pitch);
    if ambience.is_none() {
        warn!("ambience loop did not start");
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        error!("terminal init failed: {e}");
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut scene, &mut audio, &mut renderer, config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        error!("game loop stopped: {e}");
        eprintln!("Game error: {e}");
    }
    drop(ambience);

    info!(outcome = ?session.outcome(), "session ended");
    println!();
    match session.outcome() {
        Outcome::InProgress => println!("The case remains open."),
        _ => println!("{}", session.status_line()),
    }
}

fn game_loop<B: AudioBackend>(
    session: &mut Session<B::Playback>,
    scene: &mut Scene,
    audio: &mut B,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.enable_key_release();
    let keys = KeyMap::from_config(&config.keys);
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }

    let mut latch = ControlLatch::new();
    let frame_sleep = Duration::from_millis(config.general.frame_ms);
    let mut last_frame = Instant::now();
    let mut message = String::new();

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_pressed() || gp.quit_pressed() {
            info!("player quit");
            break;
        }

        for transition in latch.transitions(|c| kb.any_held(keys.keys_for(c)) || gp.held(c)) {
            match transition {
                Transition::Down(c) => session.key_down(scene, Some(c)),
                Transition::Up(c) => session.key_up(Some(c)),
            };
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_frame).as_secs_f32().min(MAX_STEP);
        last_frame = now;

        for event in session.update(scene, audio, elapsed) {
            if let Some(text) = describe(&event) {
                message = text;
            }
        }

        renderer.render(scene, session, &message)?;
        std::thread::sleep(frame_sleep);
    }

    Ok(())
}

/// Message-bar text for an event.
fn describe(event: &GameEvent) -> Option<String> {
    match *event {
        GameEvent::CueStarted { group: CueGroup::Alibi, index } => {
            Some(format!("Suspect {} tells you where they were.", index + 1))
        }
        GameEvent::CueStarted { group: CueGroup::Recording, index } => {
            Some(format!("Evidence {} crackles to life.", char::from(b'a' + index as u8)))
        }
        GameEvent::CrimeRecordingHeard => Some("That recording caught the crime itself.".into()),
        GameEvent::Arrested { suspect, .. } => Some(format!("You arrest suspect {}.", suspect + 1)),
        GameEvent::ArrestMissed => Some("Nobody is close enough to arrest.".into()),
    }
}
