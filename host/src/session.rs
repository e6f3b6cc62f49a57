//! Runs whole matches: serves, ticks, scoring, recording and sample capture.

use pong_core::{
    LearningHook, Match, PaddleController, Player, PointOutcome, Side, SimulationConfig,
    TrainingSample,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::frame_log::FrameLog;
use crate::players::PlayerKind;

/// Run limits and seating for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    pub seed: u64,
    pub matches: u32,
    pub left: PlayerKind,
    pub right: PlayerKind,
    /// A match still undecided after this many ticks is abandoned.
    pub max_ticks_per_match: u64,
    /// Side whose experience is captured as training samples.
    pub learner: Option<Side>,
    pub record: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            matches: 1,
            left: PlayerKind::Tracker,
            right: PlayerKind::Random,
            max_ticks_per_match: 1_000_000,
            learner: None,
            record: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub player_one: u32,
    pub player_two: u32,
    /// `None` when the tick budget ran out first.
    pub winner: Option<Player>,
    pub games: u32,
    pub lets: u32,
    pub ticks: u64,
    pub volleys: u64,
    pub samples: usize,
    /// Sum of rewards handed to the learner.
    pub reward_total: i64,
}

#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub seed: u64,
    pub matches: Vec<MatchSummary>,
    #[serde(skip)]
    pub frame_log: Option<FrameLog>,
    pub frame_digest: Option<String>,
}

impl SessionReport {
    pub fn wins(&self, player: Player) -> usize {
        self.matches.iter().filter(|m| m.winner == Some(player)).count()
    }
}

/// Collects samples for one side; drained after each match.
pub struct SampleBuffer {
    side: Side,
    samples: Vec<TrainingSample>,
}

impl SampleBuffer {
    pub fn new(side: Side) -> Self {
        Self { side, samples: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    pub fn drain(&mut self) -> Vec<TrainingSample> {
        std::mem::take(&mut self.samples)
    }
}

impl LearningHook for SampleBuffer {
    fn side(&self) -> Side {
        self.side
    }

    fn record(&mut self, sample: TrainingSample) {
        self.samples.push(sample);
    }
}

/// Play `opts.matches` matches with the configured controllers.
pub fn run_session(
    config: &SimulationConfig,
    opts: &SessionOptions,
) -> Result<SessionReport, Box<dyn std::error::Error>> {
    let mut seeds = ChaCha8Rng::seed_from_u64(opts.seed);
    let mut left = opts.left.build(seeds.gen());
    let mut right = opts.right.build(seeds.gen());
    let mut buffer = opts.learner.map(SampleBuffer::new);
    let mut frame_log = opts.record.then(|| FrameLog::new(config));

    tracing::info!(
        seed = opts.seed,
        matches = opts.matches,
        left = %opts.left,
        right = %opts.right,
        "starting session"
    );

    let mut summaries = Vec::with_capacity(opts.matches as usize);
    for index in 0..opts.matches {
        let rng = ChaCha8Rng::seed_from_u64(seeds.gen());
        let summary = play_match(
            config,
            rng,
            left.as_mut(),
            right.as_mut(),
            buffer.as_mut(),
            frame_log.as_mut(),
            opts.max_ticks_per_match,
        )?;
        match summary.winner {
            Some(winner) => tracing::info!(
                index,
                ?winner,
                score = %format!("{}-{}", summary.player_one, summary.player_two),
                ticks = summary.ticks,
                "match finished"
            ),
            None => {
                tracing::warn!(index, ticks = summary.ticks, "match abandoned at tick limit")
            }
        }
        if let Some(buf) = buffer.as_mut() {
            // an external learner would fit on these
            buf.drain();
        }
        summaries.push(summary);
    }

    let frame_digest = frame_log.as_ref().map(FrameLog::digest_hex);
    Ok(SessionReport {
        seed: opts.seed,
        matches: summaries,
        frame_log,
        frame_digest,
    })
}

/// Play one match to the winning score or the tick budget.
pub fn play_match<R: Rng>(
    config: &SimulationConfig,
    rng: R,
    left: &mut dyn PaddleController,
    right: &mut dyn PaddleController,
    mut hook: Option<&mut SampleBuffer>,
    mut frame_log: Option<&mut FrameLog>,
    max_ticks: u64,
) -> Result<MatchSummary, Box<dyn std::error::Error>> {
    let mut game = Match::new(config, rng);
    let mut summary = MatchSummary {
        player_one: 0,
        player_two: 0,
        winner: None,
        games: 1,
        lets: 0,
        ticks: 0,
        volleys: 0,
        samples: 0,
        reward_total: 0,
    };
    let samples_before = hook.as_ref().map_or(0, |h| h.len());

    while !game.is_match_over() && summary.ticks < max_ticks {
        if let Some(log) = frame_log.as_deref_mut() {
            log.record(game.state());
        }
        let volleys_before = game.state().volley_count;
        let report = game.tick(
            Some(&mut *left),
            Some(&mut *right),
            hook.as_deref_mut().map(|h| h as &mut dyn LearningHook),
        )?;
        summary.ticks += 1;

        match report.outcome {
            PointOutcome::InPlay => {
                summary.volleys += u64::from(game.state().volley_count - volleys_before);
            }
            PointOutcome::Let => {
                summary.lets += 1;
            }
            PointOutcome::Scored(_) => {
                summary.volleys += u64::from(game.state().volley_count - volleys_before);
                if !game.is_match_over() {
                    game.start_game();
                    summary.games += 1;
                }
            }
        }
    }

    let score = game.score();
    summary.player_one = score.player_one;
    summary.player_two = score.player_two;
    summary.winner = game.winner();
    if let Some(h) = hook {
        let fresh = &h.samples()[samples_before..];
        summary.samples = fresh.len();
        summary.reward_total = fresh.iter().map(|s| i64::from(s.reward)).sum();
    }
    Ok(summary)
}
