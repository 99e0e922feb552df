//! One-dimensional treasure hunt
//!
//! The agent starts at the left end of a corridor and the treasure sits at
//! the right end:
//!
//! ```text
//! o_____T
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ports::Environment};

/// Movement along the corridor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

/// Parameters of a [`LineWorld`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineConfig {
    /// Position of the treasure (the corridor has `size + 1` cells)
    pub size: usize,
    /// Reward for stepping onto the treasure
    pub instant_reward: f64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            size: 10,
            instant_reward: 1.0,
        }
    }
}

impl LineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidConfiguration {
                message: "line size must be at least 1".to_string(),
            });
        }
        if !self.instant_reward.is_finite() {
            return Err(Error::InvalidConfiguration {
                message: format!("instant_reward must be finite, got {}", self.instant_reward),
            });
        }
        Ok(())
    }
}

/// Corridor of positions `0..=size` with the treasure at `size`.
#[derive(Debug, Clone)]
pub struct LineWorld {
    size: usize,
    instant_reward: f64,
    position: usize,
}

impl LineWorld {
    pub fn new(size: usize, instant_reward: f64) -> Result<Self> {
        Self::from_config(&LineConfig {
            size,
            instant_reward,
        })
    }

    pub fn from_config(config: &LineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            size: config.size,
            instant_reward: config.instant_reward,
            position: 0,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Current agent position
    pub fn position(&self) -> usize {
        self.position
    }

    fn step(&self, state: usize, direction: Direction) -> usize {
        match direction {
            Direction::Left => state.saturating_sub(1),
            Direction::Right => (state + 1).min(self.size),
        }
    }

    /// Corridor with the agent drawn at `state`
    pub fn render(&self, state: usize) -> String {
        (0..=self.size)
            .map(|i| {
                if i == state {
                    'o'
                } else if i == self.size {
                    'T'
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl Environment for LineWorld {
    type State = usize;
    type Action = Direction;

    fn states(&self) -> Vec<usize> {
        (0..=self.size).collect()
    }

    fn actions(&self) -> Vec<Direction> {
        vec![Direction::Left, Direction::Right]
    }

    fn available_actions(&self, state: &usize) -> Vec<Direction> {
        if *state == 0 {
            vec![Direction::Right]
        } else if *state >= self.size {
            vec![Direction::Left]
        } else {
            vec![Direction::Left, Direction::Right]
        }
    }

    fn reward(&self, state: &usize, action: &Direction) -> f64 {
        if *state != self.size && self.step(*state, *action) == self.size {
            self.instant_reward
        } else {
            0.0
        }
    }

    fn transition(&mut self, state: &usize, action: &Direction) -> usize {
        self.position = self.step(*state, *action);
        self.position
    }

    fn init(&mut self) {
        self.position = 0;
    }

    fn start_state(&self) -> usize {
        0
    }

    fn terminal_states(&self) -> Vec<usize> {
        vec![self.size]
    }

    fn display(&self, state: &usize) {
        println!("{}", self.render(*state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_end_only_moves_right() {
        let world = LineWorld::new(4, 1.0).unwrap();
        assert_eq!(world.available_actions(&0), vec![Direction::Right]);
        assert_eq!(
            world.available_actions(&2),
            vec![Direction::Left, Direction::Right]
        );
    }

    #[test]
    fn test_reward_only_on_reaching_treasure() {
        let world = LineWorld::new(4, 2.5).unwrap();
        assert_eq!(world.reward(&3, &Direction::Right), 2.5);
        assert_eq!(world.reward(&2, &Direction::Right), 0.0);
        assert_eq!(world.reward(&3, &Direction::Left), 0.0);
    }

    #[test]
    fn test_transition_moves_agent() {
        let mut world = LineWorld::new(4, 1.0).unwrap();
        assert_eq!(world.transition(&0, &Direction::Right), 1);
        assert_eq!(world.position(), 1);
        assert_eq!(world.transition(&1, &Direction::Left), 0);
        world.transition(&3, &Direction::Right);
        world.init();
        assert_eq!(world.position(), 0);
    }

    #[test]
    fn test_render() {
        let world = LineWorld::new(5, 1.0).unwrap();
        assert_eq!(world.render(0), "o____T");
        assert_eq!(world.render(2), "__o__T");
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            LineWorld::new(0, 1.0),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
