//! Deterministic snake simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Discrete ticks only
//! - Seeded RNG only
//! - Input is buffered, never applied mid-tick
//! - No rendering or platform dependencies

pub mod food;
pub mod input;
pub mod state;
pub mod tick;

pub use food::generate_food;
pub use input::{ButtonInput, DirectionSource, KeyboardInput, SwipeInput, Touch, feed};
pub use state::{Cell, Direction, GamePhase, SnakeConfig, SnakeEvent, SnakeGame};
pub use tick::{SnakeClock, tick};
