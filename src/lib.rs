//! Quiz Runner - a quiz-gated side-scrolling runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (obstacles, quiz, jump physics, mode policies)
//! - `questions`: Question bank loading and random selection
//! - `highscores`: High score persistence
//! - `settings`: Player preferences
//! - `audio` / `telemetry` / `input`: collaborator ports for the embedding shell

pub mod audio;
pub mod highscores;
pub mod input;
pub mod questions;
pub mod settings;
pub mod sim;
pub mod telemetry;

pub use highscores::HighScore;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// World-space viewport dimensions
    pub const VIEW_WIDTH: f32 = 1850.0;
    pub const VIEW_HEIGHT: f32 = 1000.0;

    /// Target frame rate; all motion is normalized against this frame duration
    pub const TARGET_FPS: f64 = 60.0;
    pub const FIXED_TIME_STEP_MS: f64 = 1000.0 / TARGET_FPS;

    /// The avatar never moves horizontally - the world scrolls past it
    pub const CHARACTER_X: f32 = 300.0;
    /// Ground line; vertical position grows downward, so airborne y is negative
    pub const GROUND_Y: f32 = 0.0;

    /// Jump impulse (upward, hence negative) and per-normalized-tick gravity
    pub const JUMP_POWER: f32 = -20.0;
    pub const GRAVITY: f32 = 0.8;

    /// Horizontal scroll speed in px per normalized tick
    pub const SCROLL_SPEED: f32 = 8.0;

    /// Obstacles spawn this far past the right edge of the viewport
    pub const SPAWN_X_OFFSET: f32 = 500.0;
    /// No spawn while the newest obstacle is still within this of the right edge
    pub const SPAWN_CLEARANCE: f32 = 500.0;
    /// Default wait between the end of one quiz and the next spawn
    pub const OBSTACLE_SPAWN_INTERVAL_MS: f64 = 5000.0;

    /// Fence sprite width; obstacles fully past the left edge are pruned
    pub const FENCE_WIDTH: f32 = 200.0;

    /// Distance ahead of the character at which an obstacle activates its quiz
    pub const QUIZ_TRIGGER_DISTANCE: f32 = 1100.0;
    /// Width of the leading-edge trigger window (a band, not a point, so a
    /// fast frame cannot step over it)
    pub const TRIGGER_BAND_WIDTH: f32 = 100.0;

    /// Default per-question time budget
    pub const QUIZ_TIME_LIMIT_MS: f64 = 10_000.0;

    /// Jump/pass resolution window extends this far ahead of the character...
    pub const JUMP_DISTANCE: f32 = 250.0;
    /// ...and this far behind
    pub const JUMP_BEHIND_MARGIN: f32 = 50.0;

    /// Physical collision band ahead of the character (hearts mode)
    pub const COLLIDE_AHEAD: f32 = 50.0;
    /// Single-life collision band reaches further ahead
    pub const LEGACY_COLLIDE_AHEAD: f32 = 100.0;
    /// An obstacle this far behind the character counts as cleared
    pub const PASS_BEHIND: f32 = 100.0;

    /// Delay between "run-ending condition met" and the result screen
    pub const ENDING_SEQUENCE_MS: f64 = 3000.0;
    /// Extra delay after clearing the final obstacle, so the character has
    /// visually landed before the ending sequence starts
    pub const LAST_CLEAR_DELAY_MS: f64 = 500.0;
}

/// Slow factor applied to scrolling while a quiz with the given time budget
/// is active. Longer questions slow the world further so the obstacle stays
/// clear of the jump window until the answer lands.
pub fn slow_factor_for_duration(duration_secs: u32) -> f32 {
    match duration_secs {
        5 => 0.40,
        10 => 0.20,
        15 => 0.13,
        20 => 0.10,
        _ => 0.20,
    }
}

/// Asset readiness gate. The shell loads sprites and audio; the core only
/// refuses to leave `Initializing` until everything has settled.
pub trait AssetProvider {
    fn is_ready(&self) -> bool;
}

/// Provider for shells with no assets to wait on (tests, headless demo).
pub struct AlwaysReady;

impl AssetProvider for AlwaysReady {
    fn is_ready(&self) -> bool {
        true
    }
}

/// Wall-clock milliseconds since the Unix epoch, for embedding shells that
/// do not bring their own timestamp source.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Console logging setup for browser shells.
#[cfg(target_arch = "wasm32")]
pub fn init_wasm_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
