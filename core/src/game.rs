//! Serve, scoring and match progression.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::controller::{LearningHook, Observation, PaddleCommand, PaddleController, TrainingSample};
use crate::error::SimulationError;
use crate::history::FrameHistoryBuffer;
use crate::physics::{self, Contacts};
use crate::state::{MatchScore, Player, SimulationState, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Ball is live.
    InPlay,
    /// A point ended the game; the next serve has not happened yet.
    GameOver { scorer: Player },
    /// Someone reached the winning score.
    MatchOver { winner: Player },
}

/// Result of checking the ball against the side lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointOutcome {
    InPlay,
    /// Exit before the volley threshold; the ball was served again.
    Let,
    Scored(Player),
}

/// What happened during one [`Match::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub contacts: Contacts,
    pub outcome: PointOutcome,
    /// Last command applied for each side, `[left, right]`.
    pub commands: [Option<PaddleCommand>; 2],
}

/// One match: owns the state, the score, the frame history and the serve RNG.
pub struct Match<'c, R> {
    config: &'c SimulationConfig,
    state: SimulationState,
    history: FrameHistoryBuffer,
    score: MatchScore,
    phase: MatchPhase,
    rng: R,
}

impl<'c, R: Rng> Match<'c, R> {
    /// Score 0-0 with the first ball already served.
    pub fn new(config: &'c SimulationConfig, rng: R) -> Self {
        let mut m = Self {
            config,
            state: SimulationState::new(config),
            history: FrameHistoryBuffer::new(config),
            score: MatchScore::default(),
            phase: MatchPhase::InPlay,
            rng,
        };
        m.start_game();
        m
    }

    pub fn config(&self) -> &SimulationConfig {
        self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Direct access for scripted setups. Anything written here is checked
    /// by the next [`Match::tick`].
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn history(&self) -> &FrameHistoryBuffer {
        &self.history
    }

    pub fn score(&self) -> MatchScore {
        self.score
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Serve a new ball and blank the history.
    pub fn start_game(&mut self) {
        self.state.new_game(self.config, &mut self.rng);
        self.history.clear();
        if !matches!(self.phase, MatchPhase::MatchOver { .. }) {
            self.phase = MatchPhase::InPlay;
        }
    }

    pub fn move_paddle(&mut self, side: Side, delta: i32) {
        self.state.move_paddle(self.config, side, delta);
    }

    /// Look at the ball position and award a point, call a let, or do nothing.
    pub fn check_point(&mut self) -> PointOutcome {
        if self.state.game_over {
            if let MatchPhase::GameOver { scorer }
            | MatchPhase::MatchOver { winner: scorer } = self.phase
            {
                return PointOutcome::Scored(scorer);
            }
        }

        let x = self.state.ball.x;
        let exited = x > self.config.width || x < 0;

        if self.state.volley_count < self.config.volleys_before_start && exited {
            tracing::debug!(
                volleys = self.state.volley_count,
                required = self.config.volleys_before_start,
                "let, serving again"
            );
            self.start_game();
            return PointOutcome::Let;
        }

        let scorer = if x > self.config.width {
            Player::One
        } else if x < 0 {
            Player::Two
        } else {
            return PointOutcome::InPlay;
        };

        self.state.game_over = true;
        self.score.award(scorer);
        self.phase = if self.score.is_match_over(self.config.winning_score) {
            MatchPhase::MatchOver { winner: scorer }
        } else {
            MatchPhase::GameOver { scorer }
        };
        tracing::debug!(
            ?scorer,
            player_one = self.score.player_one,
            player_two = self.score.player_two,
            volleys = self.state.volley_count,
            "point scored"
        );
        PointOutcome::Scored(scorer)
    }

    pub fn is_game_over(&mut self) -> bool {
        matches!(self.check_point(), PointOutcome::Scored(_))
    }

    pub fn is_match_over(&self) -> bool {
        self.score.is_match_over(self.config.winning_score)
    }

    pub fn winner(&self) -> Option<Player> {
        if self.is_match_over() {
            self.score.leader()
        } else {
            None
        }
    }

    fn apply_controller(
        &mut self,
        side: Side,
        controller: &mut dyn PaddleController,
    ) -> PaddleCommand {
        let command = controller.decide(&Observation {
            side,
            config: self.config,
            state: &self.state,
            history: &self.history,
        });
        self.state.move_paddle(self.config, side, command.delta(self.config.paddle_move()));
        command
    }

    /// Run one tick.
    ///
    /// Snapshot into the history (once the volley threshold is met), advance
    /// the ball, give each controller `paddle_ball_refresh_ratio` turns, check
    /// invariants, then check for a point. A hook gets the features the
    /// controllers saw, the action of its side and the reward.
    pub fn tick(
        &mut self,
        mut left: Option<&mut dyn PaddleController>,
        mut right: Option<&mut dyn PaddleController>,
        hook: Option<&mut dyn LearningHook>,
    ) -> Result<TickReport, SimulationError> {
        if self.state.volley_count >= self.config.volleys_before_start {
            self.history.push(&self.state);
        }

        let features = hook.as_ref().map(|h| {
            Observation {
                side: h.side(),
                config: self.config,
                state: &self.state,
                history: &self.history,
            }
            .features()
        });

        let contacts = physics::step(&mut self.state, self.config);

        let mut commands = [None, None];
        for _ in 0..self.config.paddle_ball_refresh_ratio {
            if let Some(controller) = left.as_deref_mut() {
                commands[0] = Some(self.apply_controller(Side::Left, controller));
            }
            if let Some(controller) = right.as_deref_mut() {
                commands[1] = Some(self.apply_controller(Side::Right, controller));
            }
        }

        self.state.validate(self.config)?;

        let outcome = self.check_point();

        if let (Some(hook), Some(features)) = (hook, features) {
            let side = hook.side();
            let reward = match outcome {
                PointOutcome::Scored(p) if p.side() == side => 1,
                PointOutcome::Scored(_) => -1,
                _ => 0,
            };
            let slot = match side {
                Side::Left => 0,
                Side::Right => 1,
            };
            hook.record(TrainingSample {
                features,
                action: commands[slot].unwrap_or(PaddleCommand::Hold),
                reward,
            });
        }

        Ok(TickReport { contacts, outcome, commands })
    }
}
