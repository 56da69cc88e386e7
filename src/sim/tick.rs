//! Fixed-interval snake tick
//!
//! Direction adoption, collision check and growth happen together inside one
//! call, so nothing can observe a half-applied move.

use super::food::generate_food;
use super::state::{GamePhase, SnakeEvent, SnakeGame};
use crate::consts::SNAKE_MAX_CATCHUP;

/// Advance the game by one tick
pub fn tick(game: &mut SnakeGame) -> Vec<SnakeEvent> {
    let mut events = Vec::new();
    if game.phase != GamePhase::Playing {
        return events;
    }

    // Commit the buffered direction; a reversal never gets through
    if let Some(next) = game.next_direction {
        if game.direction.is_none_or(|current| current.opposite() != next) {
            game.direction = Some(next);
        } else {
            game.next_direction = game.direction;
        }
    }

    let Some(dir) = game.direction else {
        return events;
    };

    game.ticks += 1;
    let grid = game.config.grid;
    let new_head = game.head().step(dir);

    // Fatal move: keep the pre-move body for the game over screen
    if !new_head.in_bounds(grid) || game.occupies(new_head) {
        game.phase = GamePhase::GameOver;
        log::info!("Snake died with score {}", game.score);
        events.push(SnakeEvent::Died { score: game.score });
        return events;
    }

    game.snake.insert(0, new_head);

    if new_head == game.food {
        game.score += game.config.reward;
        events.push(SnakeEvent::AteFood { score: game.score });

        if game.score > game.high_score {
            game.high_score = game.score;
            events.push(SnakeEvent::NewHighScore { score: game.score });
        }

        game.speed_ms = game
            .speed_ms
            .saturating_sub(game.config.speed_step_ms)
            .max(game.config.min_speed_ms);

        match generate_food(&mut game.rng, grid, &game.snake) {
            Some(food) => game.food = food,
            None => {
                // Board is full
                game.phase = GamePhase::GameOver;
                log::info!("Snake filled the board with score {}", game.score);
                events.push(SnakeEvent::Died { score: game.score });
            }
        }
    } else {
        game.snake.pop();
        events.push(SnakeEvent::Moved);
    }

    events
}

/// Accumulates frame time and runs the ticks that are due
#[derive(Debug, Clone, Default)]
pub struct SnakeClock {
    accumulator_ms: f64,
}

impl SnakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed `dt_ms` of wall time; returns events from every tick that ran.
    ///
    /// Time only accumulates while playing, and at most `SNAKE_MAX_CATCHUP`
    /// ticks run per call (the rest of the backlog is dropped).
    pub fn step(&mut self, game: &mut SnakeGame, dt_ms: f64) -> Vec<SnakeEvent> {
        let mut events = Vec::new();
        if game.phase != GamePhase::Playing {
            self.clear();
            return events;
        }

        self.accumulator_ms += dt_ms.max(0.0);

        let mut substeps = 0;
        while game.phase == GamePhase::Playing
            && self.accumulator_ms >= game.speed_ms as f64
            && substeps < SNAKE_MAX_CATCHUP
        {
            self.accumulator_ms -= game.speed_ms as f64;
            events.extend(tick(game));
            substeps += 1;
        }

        if substeps == SNAKE_MAX_CATCHUP {
            self.accumulator_ms = self.accumulator_ms.min(game.speed_ms as f64);
        }

        events
    }

    pub fn clear(&mut self) {
        self.accumulator_ms = 0.0;
    }
}
