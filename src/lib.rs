//! czch portfolio - personal landing page compiled to WebAssembly
//!
//! Core modules:
//! - `sim`: Deterministic snake game (grid state machine, buffered input)
//! - `particles`: Reactive starfield behind the page
//! - `terminal`: Tiny command interpreter easter egg
//! - `presence`: Live status card fed by the Lanyard API
//! - `player`: Playlist music player transport
//! - `renderer`: Vertex generation and the WebGPU pipeline
//! - `platform`: Browser/native platform abstraction
//! - `ui`: Navigation and small HTML view helpers

pub mod highscores;
pub mod particles;
pub mod platform;
pub mod player;
pub mod presence;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod terminal;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use highscores::HighScore;
pub use settings::{QualityPreset, ReactiveMode, Settings};

/// Tuning constants
pub mod consts {
    /// Snake board: 240px canvas split into 12px cells
    pub const SNAKE_CANVAS_PX: f32 = 240.0;
    pub const SNAKE_CELL_PX: f32 = 12.0;
    pub const SNAKE_GRID_COUNT: i32 = 20;

    /// Base tick interval (ms) and speed-up per food eaten
    pub const SNAKE_TICK_MS: u32 = 120;
    pub const SNAKE_SPEEDUP_MS: u32 = 2;
    pub const SNAKE_MIN_TICK_MS: u32 = 60;
    /// Maximum ticks caught up in a single frame
    pub const SNAKE_MAX_CATCHUP: u32 = 4;

    /// Points per food
    pub const FOOD_REWARD: u32 = 10;

    /// Swipe must travel further than this (px) to count
    pub const SWIPE_MIN_DISTANCE: f32 = 30.0;

    /// LocalStorage key for the snake best score
    pub const HIGH_SCORE_KEY: &str = "snake-high-score";

    /// Canvas area (px²) per particle
    pub const PARTICLE_DENSITY: f32 = 15_000.0;
    /// Extra particles when the field follows the music
    pub const REACTIVE_DENSITY_MULTIPLIER: f32 = 1.5;

    /// Velocities are expressed in px per frame at this rate
    pub const REFERENCE_FPS: f32 = 60.0;
    pub const VELOCITY_DAMPING: f32 = 0.999;

    /// Pointer influence
    pub const POINTER_RADIUS: f32 = 150.0;
    pub const POINTER_PUSH: f32 = 0.01;
    pub const POINTER_OPACITY_BOOST: f32 = 0.3;

    /// Constellation lines
    pub const CONNECTION_DISTANCE: f32 = 120.0;
    pub const CONNECTION_OPACITY: f32 = 0.15;

    /// Beat flash
    pub const FLASH_DECAY: f32 = 0.85;
    pub const FLASH_OPACITY_BOOST: f32 = 0.5;
    pub const BEAT_THRESHOLD: f32 = 0.6;
    pub const BEAT_COOLDOWN_MS: f64 = 200.0;

    /// Presence polling
    pub const PRESENCE_POLL_MS: i32 = 1000;
    pub const LANYARD_API: &str = "https://api.lanyard.rest/v1/users";
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
