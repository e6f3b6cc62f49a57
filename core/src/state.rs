use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::SimulationError;

/// Which edge of the board a paddle defends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Sign of `dx` for a ball travelling toward this side.
    pub fn incoming_dx_sign(self) -> i32 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            _ => Err(format!("Invalid side: '{}'. Must be 'left' or 'right'", s)),
        }
    }
}

/// Player one plays the left paddle, player two the right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn side(self) -> Side {
        match self {
            Player::One => Side::Left,
            Player::Two => Side::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ball {
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paddle {
    /// Center row
    pub y: i32,
    pub side: Side,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub player_one: u32,
    pub player_two: u32,
}

impl MatchScore {
    pub fn award(&mut self, player: Player) {
        match player {
            Player::One => self.player_one += 1,
            Player::Two => self.player_two += 1,
        }
    }

    pub fn is_match_over(&self, winning_score: u32) -> bool {
        self.player_one >= winning_score || self.player_two >= winning_score
    }

    pub fn leader(&self) -> Option<Player> {
        match self.player_one.cmp(&self.player_two) {
            std::cmp::Ordering::Greater => Some(Player::One),
            std::cmp::Ordering::Less => Some(Player::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Everything that changes during a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    pub ball: Ball,
    pub left: Paddle,
    pub right: Paddle,
    pub volley_count: u32,
    pub game_over: bool,
}

impl SimulationState {
    /// Centered ball and paddles with the serve speed along both axes.
    /// Call [`SimulationState::new_game`] to randomize the serve.
    pub fn new(config: &SimulationConfig) -> Self {
        let mid = config.min_dy + (config.max_dy - config.min_dy) / 2;
        Self {
            ball: Ball {
                x: config.start_x(),
                y: config.start_y(),
                dx: config.serve_dx(),
                dy: mid,
            },
            left: Paddle { y: config.start_y(), side: Side::Left },
            right: Paddle { y: config.start_y(), side: Side::Right },
            volley_count: 0,
            game_over: false,
        }
    }

    /// Reset for a fresh serve.
    ///
    /// `|dy|` is drawn first, then the sign of `dx`, then the sign of `dy`,
    /// each from `rng`.
    pub fn new_game<R: Rng + ?Sized>(&mut self, config: &SimulationConfig, rng: &mut R) {
        let dy = if config.max_dy > config.min_dy {
            rng.gen_range(config.min_dy..config.max_dy)
        } else {
            config.min_dy
        };
        let dx = config.serve_dx();

        self.ball = Ball {
            x: config.start_x(),
            y: config.start_y(),
            dx: if rng.gen_bool(0.5) { -dx } else { dx },
            dy: if rng.gen_bool(0.5) { -dy } else { dy },
        };
        self.left.y = config.start_y();
        self.right.y = config.start_y();
        self.volley_count = 0;
        self.game_over = false;
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Put the paddle on `side` at `y`, clamped to the board.
    pub fn clamp_paddle(&mut self, config: &SimulationConfig, side: Side, y: i32) {
        self.paddle_mut(side).y = config.clamp_paddle_y(y);
    }

    /// Move a paddle by `delta` pixels (negative is up) and clamp.
    pub fn move_paddle(&mut self, config: &SimulationConfig, side: Side, delta: i32) {
        let y = self.paddle(side).y.saturating_add(delta);
        self.clamp_paddle(config, side, y);
    }

    /// `[ball_x, ball_y, paddle1_y, paddle2_y]`
    pub fn positions(&self) -> [i32; 4] {
        [self.ball.x, self.ball.y, self.left.y, self.right.y]
    }

    /// Check the post-tick invariants. A failure means something bypassed
    /// the physics or the paddle clamp.
    pub fn validate(&self, config: &SimulationConfig) -> Result<(), SimulationError> {
        if self.ball.y < 0 || self.ball.y > config.height - 1 {
            return Err(SimulationError::InvalidState(format!(
                "ball y {} outside 0..={}",
                self.ball.y,
                config.height - 1
            )));
        }
        for paddle in [&self.left, &self.right] {
            if config.clamp_paddle_y(paddle.y) != paddle.y {
                return Err(SimulationError::InvalidState(format!(
                    "{:?} paddle center {} is off the board",
                    paddle.side, paddle.y
                )));
            }
        }
        Ok(())
    }
}
