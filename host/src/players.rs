//! Paddle controllers that live outside the engine.

use pong_core::{forecast_y, Observation, PaddleCommand, PaddleController};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Chases the ball's current height while the ball is coming its way.
#[derive(Debug, Default, Clone, Copy)]
pub struct BallTracker;

impl PaddleController for BallTracker {
    fn decide(&mut self, obs: &Observation<'_>) -> PaddleCommand {
        if !obs.ball_incoming() {
            return PaddleCommand::Hold;
        }
        steer(obs.own_paddle().y, obs.ball().y)
    }
}

/// Heads for the row where the ball will reach this paddle's column,
/// following wall bounces. Moves even while the ball is going away.
#[derive(Debug, Default, Clone, Copy)]
pub struct Forecaster;

impl PaddleController for Forecaster {
    fn decide(&mut self, obs: &Observation<'_>) -> PaddleCommand {
        steer(obs.own_paddle().y, forecast_y(obs.ball(), obs.config))
    }
}

fn steer(paddle_y: i32, target_y: i32) -> PaddleCommand {
    if paddle_y >= target_y {
        PaddleCommand::Up
    } else {
        PaddleCommand::Down
    }
}

/// A learned model: maps the motion feature to the probability of moving up.
pub trait Policy {
    fn probability_up(&mut self, features: &[i8]) -> f64;
}

impl<F: FnMut(&[i8]) -> f64> Policy for F {
    fn probability_up(&mut self, features: &[i8]) -> f64 {
        self(features)
    }
}

/// Untrained stand-in: every action equally likely.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoinFlip;

impl Policy for CoinFlip {
    fn probability_up(&mut self, _features: &[i8]) -> f64 {
        0.5
    }
}

/// Samples Up with the policy's probability, Down otherwise.
pub struct PolicyController<P, R> {
    policy: P,
    rng: R,
}

impl<P: Policy, R: Rng> PolicyController<P, R> {
    pub fn new(policy: P, rng: R) -> Self {
        Self { policy, rng }
    }

    pub fn into_policy(self) -> P {
        self.policy
    }
}

impl<P: Policy, R: Rng> PaddleController for PolicyController<P, R> {
    fn decide(&mut self, obs: &Observation<'_>) -> PaddleCommand {
        let p_up = self.policy.probability_up(&obs.features());
        if p_up > self.rng.gen::<f64>() {
            PaddleCommand::Up
        } else {
            PaddleCommand::Down
        }
    }
}

/// Controllers selectable from the command line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Tracker,
    Forecast,
    Random,
}

impl std::str::FromStr for PlayerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tracker" => Ok(PlayerKind::Tracker),
            "forecast" => Ok(PlayerKind::Forecast),
            "random" => Ok(PlayerKind::Random),
            _ => Err(format!(
                "Invalid player kind: '{}'. Must be 'tracker', 'forecast', or 'random'",
                s
            )),
        }
    }
}

impl std::fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerKind::Tracker => write!(f, "tracker"),
            PlayerKind::Forecast => write!(f, "forecast"),
            PlayerKind::Random => write!(f, "random"),
        }
    }
}

impl PlayerKind {
    /// Build a controller; `seed` only matters for stochastic kinds.
    pub fn build(self, seed: u64) -> Box<dyn PaddleController> {
        use rand::SeedableRng;
        match self {
            PlayerKind::Tracker => Box::new(BallTracker),
            PlayerKind::Forecast => Box::new(Forecaster),
            PlayerKind::Random => Box::new(PolicyController::new(
                CoinFlip,
                rand_chacha::ChaCha8Rng::seed_from_u64(seed),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pong_core::{Ball, FrameHistoryBuffer, Side, SimulationConfig, SimulationState};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn observe<'a>(
        side: Side,
        cfg: &'a SimulationConfig,
        state: &'a SimulationState,
        history: &'a FrameHistoryBuffer,
    ) -> Observation<'a> {
        Observation { side, config: cfg, state, history }
    }

    #[test]
    fn tracker_holds_until_ball_approaches() {
        let cfg = SimulationConfig::default();
        let history = FrameHistoryBuffer::new(&cfg);
        let mut state = SimulationState::new(&cfg);
        state.ball = Ball { x: 60, y: 80, dx: 4, dy: 2 };

        let mut tracker = BallTracker;
        let left = observe(Side::Left, &cfg, &state, &history);
        assert_eq!(tracker.decide(&left), PaddleCommand::Hold);
        let right = observe(Side::Right, &cfg, &state, &history);
        assert_eq!(tracker.decide(&right), PaddleCommand::Down);

        state.ball.y = 50;
        // equal height moves up
        let right = observe(Side::Right, &cfg, &state, &history);
        assert_eq!(tracker.decide(&right), PaddleCommand::Up);
    }

    #[test]
    fn forecaster_aims_at_the_bounce() {
        let cfg = SimulationConfig::default();
        let history = FrameHistoryBuffer::new(&cfg);
        let mut state = SimulationState::new(&cfg);
        // heading down-right; the bottom wall sends it back up before the paddle
        state.ball = Ball { x: 62, y: 90, dx: 4, dy: 6 };
        let target = forecast_y(&state.ball, &cfg);
        assert!(target < 90);

        state.right.y = target - 10;
        let cmd = Forecaster.decide(&observe(Side::Right, &cfg, &state, &history));
        assert_eq!(cmd, PaddleCommand::Down);
    }

    #[test]
    fn policy_controller_samples_probability() {
        let cfg = SimulationConfig::default();
        let history = FrameHistoryBuffer::new(&cfg);
        let state = SimulationState::new(&cfg);
        let obs = observe(Side::Left, &cfg, &state, &history);

        let mut always_up = PolicyController::new(|_: &[i8]| 1.0, ChaCha8Rng::seed_from_u64(1));
        let mut always_down = PolicyController::new(|_: &[i8]| 0.0, ChaCha8Rng::seed_from_u64(1));
        for _ in 0..50 {
            assert_eq!(always_up.decide(&obs), PaddleCommand::Up);
            assert_eq!(always_down.decide(&obs), PaddleCommand::Down);
        }
    }

    #[test]
    fn policy_sees_full_feature_vector() {
        let cfg = SimulationConfig::default();
        let history = FrameHistoryBuffer::new(&cfg);
        let state = SimulationState::new(&cfg);
        let mut seen = 0;
        let mut controller = PolicyController::new(
            |f: &[i8]| {
                seen = f.len();
                0.5
            },
            ChaCha8Rng::seed_from_u64(3),
        );
        controller.decide(&observe(Side::Right, &cfg, &state, &history));
        drop(controller);
        assert_eq!(seen, cfg.pixel_count());
    }

    #[test]
    fn player_kind_parses() {
        assert_eq!("Tracker".parse::<PlayerKind>(), Ok(PlayerKind::Tracker));
        assert_eq!("random".parse::<PlayerKind>().unwrap().to_string(), "random");
        assert!("human".parse::<PlayerKind>().is_err());
    }
}
