//! Deterministic Pong engine on an integer pixel grid.
//!
//! [`game::Match`] owns a [`state::SimulationState`], advances it with
//! [`physics::step`], asks [`controller::PaddleController`]s for paddle moves
//! and keeps a [`history::FrameHistoryBuffer`] of recent frames for learners.
//! Randomness only enters through the RNG handed to the match, so a seeded
//! RNG reproduces a run exactly.

pub mod config;
pub mod controller;
pub mod error;
pub mod game;
pub mod history;
pub mod physics;
pub mod state;

pub use config::{ConfigInts, SimulationConfig};
pub use controller::{LearningHook, Observation, PaddleCommand, PaddleController, TrainingSample};
pub use error::SimulationError;
pub use game::{Match, MatchPhase, PointOutcome, TickReport};
pub use history::{mirror, FrameHistoryBuffer, PixelFrame, PositionFrame};
pub use physics::{forecast_y, step, Contacts};
pub use state::{Ball, MatchScore, Paddle, Player, Side, SimulationState};
