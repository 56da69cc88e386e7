//! Directional input adapters
//!
//! Keyboard, touch swipes and on-screen buttons all reduce to a
//! `Direction`, which is then buffered through `SnakeGame::steer`.

use glam::Vec2;

use super::state::{Direction, SnakeGame};
use crate::consts::SWIPE_MIN_DISTANCE;

/// Something that turns raw UI events into snake directions
pub trait DirectionSource {
    type Event<'a>;

    fn classify(&mut self, event: Self::Event<'_>) -> Option<Direction>;
}

/// Classify `event` and buffer the result. Returns whether the game took it.
pub fn feed<S: DirectionSource>(source: &mut S, event: S::Event<'_>, game: &mut SnakeGame) -> bool {
    match source.classify(event) {
        Some(dir) => game.steer(dir),
        None => false,
    }
}

/// Arrow keys and WASD
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardInput;

impl DirectionSource for KeyboardInput {
    type Event<'a> = &'a str;

    fn classify(&mut self, key: Self::Event<'_>) -> Option<Direction> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Touch phase for swipe detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Touch {
    Start(Vec2),
    End(Vec2),
}

/// Swipe classification by dominant axis
#[derive(Debug, Clone, Copy)]
pub struct SwipeInput {
    start: Option<Vec2>,
    min_distance: f32,
}

impl Default for SwipeInput {
    fn default() -> Self {
        Self::new(SWIPE_MIN_DISTANCE)
    }
}

impl SwipeInput {
    pub fn new(min_distance: f32) -> Self {
        Self {
            start: None,
            min_distance,
        }
    }
}

impl DirectionSource for SwipeInput {
    type Event<'a> = Touch;

    fn classify(&mut self, touch: Touch) -> Option<Direction> {
        match touch {
            Touch::Start(pos) => {
                self.start = Some(pos);
                None
            }
            Touch::End(pos) => {
                let delta = pos - self.start.take()?;
                if delta.x.abs() > delta.y.abs() {
                    if delta.x.abs() <= self.min_distance {
                        return None;
                    }
                    Some(if delta.x > 0.0 {
                        Direction::Right
                    } else {
                        Direction::Left
                    })
                } else {
                    if delta.y.abs() <= self.min_distance {
                        return None;
                    }
                    Some(if delta.y > 0.0 {
                        Direction::Down
                    } else {
                        Direction::Up
                    })
                }
            }
        }
    }
}

/// On-screen d-pad, buttons identified by their `data-dir` value
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonInput;

impl DirectionSource for ButtonInput {
    type Event<'a> = &'a str;

    fn classify(&mut self, button: Self::Event<'_>) -> Option<Direction> {
        match button {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SnakeConfig;

    #[test]
    fn test_keyboard_mapping() {
        let mut keys = KeyboardInput;
        assert_eq!(keys.classify("ArrowUp"), Some(Direction::Up));
        assert_eq!(keys.classify("S"), Some(Direction::Down));
        assert_eq!(keys.classify("a"), Some(Direction::Left));
        assert_eq!(keys.classify("Enter"), None);
    }

    #[test]
    fn test_swipe_dominant_axis() {
        let mut swipe = SwipeInput::default();
        assert_eq!(swipe.classify(Touch::Start(Vec2::new(100.0, 100.0))), None);
        assert_eq!(
            swipe.classify(Touch::End(Vec2::new(60.0, 120.0))),
            Some(Direction::Left)
        );

        swipe.classify(Touch::Start(Vec2::new(100.0, 100.0)));
        assert_eq!(
            swipe.classify(Touch::End(Vec2::new(110.0, 170.0))),
            Some(Direction::Down)
        );
    }

    #[test]
    fn test_short_swipe_ignored() {
        let mut swipe = SwipeInput::default();
        swipe.classify(Touch::Start(Vec2::ZERO));
        assert_eq!(swipe.classify(Touch::End(Vec2::new(30.0, 0.0))), None);
        // End without a start is ignored too
        assert_eq!(swipe.classify(Touch::End(Vec2::new(90.0, 0.0))), None);
    }

    #[test]
    fn test_feed_goes_through_steer() {
        let mut game = SnakeGame::new(SnakeConfig::default(), 3, 0);
        let mut keys = KeyboardInput;
        assert!(!feed(&mut keys, "ArrowUp", &mut game));

        game.start();
        assert!(!feed(&mut keys, "ArrowLeft", &mut game));
        assert!(feed(&mut ButtonInput, "up", &mut game));
        assert_eq!(game.next_direction, Some(Direction::Up));
    }
}
