//! The seam between the engine and whatever moves the paddles.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::history::{mirror, FrameHistoryBuffer};
use crate::state::{Ball, Paddle, SimulationState, Side};

/// A paddle movement request. `Up` decreases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddleCommand {
    Up,
    Down,
    Hold,
}

impl PaddleCommand {
    /// Signed pixel delta for a move of `distance` pixels.
    pub fn delta(self, distance: i32) -> i32 {
        match self {
            PaddleCommand::Up => -distance,
            PaddleCommand::Down => distance,
            PaddleCommand::Hold => 0,
        }
    }
}

/// Read-only view handed to a controller when it must decide.
pub struct Observation<'a> {
    pub side: Side,
    pub config: &'a SimulationConfig,
    pub state: &'a SimulationState,
    pub history: &'a FrameHistoryBuffer,
}

impl<'a> Observation<'a> {
    pub fn ball(&self) -> &Ball {
        &self.state.ball
    }

    pub fn own_paddle(&self) -> &Paddle {
        self.state.paddle(self.side)
    }

    /// True when the ball travels toward this controller's edge.
    pub fn ball_incoming(&self) -> bool {
        self.state.ball.dx * self.side.incoming_dx_sign() > 0
    }

    /// Motion feature as seen from the right-hand paddle. For the left side
    /// the frame difference is mirrored.
    pub fn features(&self) -> Vec<i8> {
        let diff = self.history.difference_feature();
        match self.side {
            Side::Right => diff,
            Side::Left => {
                let (w, h) = (self.config.width as usize, self.config.height as usize);
                // the history always renders width * height pixels
                mirror(&diff, w, h).unwrap_or(diff)
            }
        }
    }
}

/// Anything that can move a paddle: a scripted tracker, a learned policy,
/// a replay. The engine treats all of them the same way.
pub trait PaddleController {
    fn decide(&mut self, observation: &Observation<'_>) -> PaddleCommand;
}

impl<C: PaddleController + ?Sized> PaddleController for Box<C> {
    fn decide(&mut self, observation: &Observation<'_>) -> PaddleCommand {
        (**self).decide(observation)
    }
}

/// One tick of experience for an external learner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub features: Vec<i8>,
    pub action: PaddleCommand,
    /// +1 when the learner's side scored on this tick, -1 when its opponent
    /// did, otherwise 0.
    pub reward: i8,
}

/// Receives one [`TrainingSample`] per tick for the side it learns.
pub trait LearningHook {
    fn side(&self) -> Side;
    fn record(&mut self, sample: TrainingSample);
}
