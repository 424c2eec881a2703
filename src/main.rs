/// Entry point and game loop.

mod app;
mod config;
mod domain;
mod sim;
mod typing;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use log::{info, warn};

use app::{AppState, Phase};
use config::GameConfig;
use sim::event::GameEvent;
use sim::level::load_levels;
use ui::input::{typed_char, InputState};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "kana-grid.log";

fn main() {
    init_logging();

    let config = GameConfig::load();
    let levels = load_levels(&config);
    let mut app = AppState::new(&config, levels);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if config.play.sound {
        let engine = SoundEngine::new();
        if engine.is_none() {
            warn!("no audio output device, playing silently");
        }
        engine
    } else {
        None
    };

    let result = game_loop(&mut app, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("おつかれさま！またあそんでね。");
}

/// The terminal is in raw alternate-screen mode while playing, so log
/// records go to a file in the temp dir. Stderr only if that fails.
fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    let path = std::env::temp_dir().join(LOG_FILE);
    match std::fs::File::create(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.target(env_logger::Target::Stderr);
        }
    }
    builder.init();
    info!("logging to {}", path.display());
}

fn game_loop(
    app: &mut AppState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let start = Instant::now();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }

        let now_ms = start.elapsed().as_millis() as u64;
        for key in &kb.presses {
            let (quit, events) = handle_key(app, key, now_ms);
            process_sound_events(sound, &events);
            if quit {
                return Ok(());
            }
        }

        if last_tick.elapsed() >= tick_rate {
            let events = app.tick(start.elapsed().as_millis() as u64);
            process_sound_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(app)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::KeyAccepted => sfx.play_key(),
            GameEvent::KeyRejected => sfx.play_wrong(),
            GameEvent::CommandTyped(_) => sfx.play_complete(),
            GameEvent::ActionRejected(_) => sfx.play_blocked(),
            GameEvent::LevelCleared => sfx.play_clear(),
            _ => {}
        }
    }
}

// ── Key handling ──

/// Route one key press. Returns whether to quit, plus the events raised.
fn handle_key(app: &mut AppState, key: &KeyEvent, now_ms: u64) -> (bool, Vec<GameEvent>) {
    match app.phase {
        Phase::LevelSelect => {
            match key.code {
                KeyCode::Up => app.move_select_cursor(-1),
                KeyCode::Down => app.move_select_cursor(1),
                KeyCode::Enter => app.confirm_level_select(),
                KeyCode::Esc => app.close_level_select(),
                KeyCode::Char('q') | KeyCode::Char('Q') => return (true, vec![]),
                _ => {}
            }
            (false, vec![])
        }
        Phase::Playing => (false, handle_playing_key(app, key, now_ms)),
    }
}

fn handle_playing_key(app: &mut AppState, key: &KeyEvent, now_ms: u64) -> Vec<GameEvent> {
    // Function keys work in every sub-state.
    match key.code {
        KeyCode::F(2) => return app.reset(),
        KeyCode::F(3) => return app.undo(),
        KeyCode::F(4) => return app.redo(),
        KeyCode::F(5) => {
            app.open_level_select();
            return vec![];
        }
        KeyCode::F(6) => {
            app.toggle_difficulty();
            return vec![];
        }
        _ => {}
    }

    if app.is_cleared() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('N')) {
            app.next_level();
        }
        return vec![];
    }

    if app.typing.is_some() {
        if key.code == KeyCode::Esc {
            app.cancel_typing();
            return vec![];
        }
        return match typed_char(key) {
            Some(c) => app.type_key(c, now_ms),
            None => vec![],
        };
    }

    match key.code {
        KeyCode::Up => app.move_palette_cursor(-1),
        KeyCode::Down => app.move_palette_cursor(1),
        KeyCode::Enter => {
            app.select_command(app.palette_cursor);
        }
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            app.select_command(index);
        }
        _ => {}
    }
    vec![]
}
