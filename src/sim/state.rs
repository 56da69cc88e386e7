//! Snake game state and core simulation types
//!
//! All state mutated by the tick loop lives here. Input handlers only
//! ever touch `next_direction`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::food::generate_food;
use crate::consts::*;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Waiting for start, snake shown at its reset position
    #[default]
    Idle,
    /// Tick loop running
    Playing,
    /// Tick loop suspended, state frozen
    Paused,
    /// Run ended, pre-move snake kept for display
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "gameOver",
        }
    }
}

/// A grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step in `dir`
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn in_bounds(self, grid: i32) -> bool {
        self.x >= 0 && self.x < grid && self.y >= 0 && self.y < grid
    }
}

/// Unit movement direction (screen coordinates, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Game balance knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnakeConfig {
    /// Cells per side (grid is square)
    pub grid: i32,
    /// Starting tick interval (ms)
    pub base_speed_ms: u32,
    /// Fastest allowed tick interval (ms)
    pub min_speed_ms: u32,
    /// Interval reduction per food (ms), 0 disables speed-up
    pub speed_step_ms: u32,
    /// Points per food
    pub reward: u32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            grid: SNAKE_GRID_COUNT,
            base_speed_ms: SNAKE_TICK_MS,
            min_speed_ms: SNAKE_MIN_TICK_MS,
            speed_step_ms: SNAKE_SPEEDUP_MS,
            reward: FOOD_REWARD,
        }
    }
}

impl SnakeConfig {
    /// Config with a custom grid size, other knobs default
    pub fn with_grid(grid: i32) -> Self {
        Self {
            grid: grid.max(2),
            ..Self::default()
        }
    }

    pub fn center(&self) -> Cell {
        Cell::new(self.grid / 2, self.grid / 2)
    }
}

/// Things that happened during a tick (consumed by the shell for UI/persistence)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeEvent {
    /// Head advanced without eating
    Moved,
    /// Food eaten, new score
    AteFood { score: u32 },
    /// Score beat the best so far
    NewHighScore { score: u32 },
    /// Wall, self hit, or no room left for food
    Died { score: u32 },
}

/// Complete snake game state
#[derive(Debug, Clone)]
pub struct SnakeGame {
    pub config: SnakeConfig,
    /// Body, head first
    pub snake: Vec<Cell>,
    pub food: Cell,
    /// Committed direction (None before the first start)
    pub direction: Option<Direction>,
    /// Buffered direction applied at the next tick
    pub next_direction: Option<Direction>,
    pub score: u32,
    /// Best score seen (seeded from storage)
    pub high_score: u32,
    pub phase: GamePhase,
    /// Current tick interval (ms)
    pub speed_ms: u32,
    /// Ticks simulated since the last reset
    pub ticks: u64,
    pub(crate) rng: Pcg32,
}

impl SnakeGame {
    /// Create an idle game with the given seed and previously stored best score
    pub fn new(config: SnakeConfig, seed: u64, high_score: u32) -> Self {
        let mut game = Self {
            config,
            snake: Vec::new(),
            food: Cell::new(0, 0),
            direction: None,
            next_direction: None,
            score: 0,
            high_score,
            phase: GamePhase::Idle,
            speed_ms: config.base_speed_ms,
            ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
        };
        game.reset();
        game
    }

    /// Back to idle: centered snake, food five cells ahead, score cleared
    pub fn reset(&mut self) {
        let center = self.config.center();
        self.snake = vec![center];
        let ahead = Cell::new(center.x + 5, center.y);
        self.food = if ahead.in_bounds(self.config.grid) {
            ahead
        } else {
            generate_food(&mut self.rng, self.config.grid, &self.snake).unwrap_or(center)
        };
        self.direction = None;
        self.next_direction = None;
        self.score = 0;
        self.speed_ms = self.config.base_speed_ms;
        self.ticks = 0;
        self.phase = GamePhase::Idle;
    }

    /// Start button: fresh run from idle, resume from paused
    pub fn start(&mut self) {
        match self.phase {
            GamePhase::Idle => self.begin_run(),
            GamePhase::Paused => self.phase = GamePhase::Playing,
            GamePhase::Playing => {}
            // Only reset/play-again leave game over
            GamePhase::GameOver => {}
        }
    }

    /// Fresh run regardless of phase
    pub fn play_again(&mut self) {
        self.begin_run();
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    /// Toggle between playing and paused (space bar)
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => {}
        }
    }

    fn begin_run(&mut self) {
        self.reset();
        self.food = generate_food(&mut self.rng, self.config.grid, &self.snake)
            .unwrap_or(self.food);
        self.direction = Some(Direction::Right);
        self.next_direction = Some(Direction::Right);
        self.phase = GamePhase::Playing;
        log::debug!("Snake run started (best {})", self.high_score);
    }

    /// Buffer a direction change. Returns whether it was accepted.
    ///
    /// Rejected unless playing, and reversals are dropped rather than queued.
    pub fn steer(&mut self, dir: Direction) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        if self.direction.is_some_and(|current| current.opposite() == dir) {
            return false;
        }
        self.next_direction = Some(dir);
        true
    }

    pub fn head(&self) -> Cell {
        self.snake[0]
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snake.is_empty()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.snake.contains(&cell)
    }
}
