use pong_core::{
    mirror, step, ConfigInts, Match, Observation, PaddleCommand, PaddleController, Side,
    SimulationConfig, SimulationState,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Picks Up/Down/Hold at random; stands in for an untrained policy.
struct Jitter(ChaCha8Rng);

impl PaddleController for Jitter {
    fn decide(&mut self, _: &Observation<'_>) -> PaddleCommand {
        match self.0.gen_range(0..3) {
            0 => PaddleCommand::Up,
            1 => PaddleCommand::Down,
            _ => PaddleCommand::Hold,
        }
    }
}

fn paddle_in_bounds(cfg: &SimulationConfig, y: i32) -> bool {
    cfg.paddle_height / 2 <= y && y <= cfg.height - cfg.paddle_height / 2
}

fn velocity_in_bounds(cfg: &SimulationConfig, state: &SimulationState) -> bool {
    let (dx, dy) = (state.ball.dx.abs(), state.ball.dy.abs());
    cfg.min_dx <= dx && dx <= cfg.max_dx && cfg.min_dy <= dy && dy <= cfg.max_dy
}

proptest! {
    #[test]
    fn paddle_stays_on_board(
        paddle_height in 1i32..40,
        moves in proptest::collection::vec(prop_oneof![-60i32..60, any::<i32>()], 1..200),
    ) {
        let ints = ConfigInts { paddle_height, ..ConfigInts::default() };
        let cfg = SimulationConfig::new(ints).unwrap();
        let mut state = SimulationState::new(&cfg);
        for (i, delta) in moves.into_iter().enumerate() {
            let side = if i % 2 == 0 { Side::Left } else { Side::Right };
            state.move_paddle(&cfg, side, delta);
            prop_assert!(paddle_in_bounds(&cfg, state.paddle(side).y));
        }
    }

    #[test]
    fn velocity_stays_in_range(seed in any::<u64>(), ticks in 1usize..600) {
        let cfg = SimulationConfig::default();
        let mut m = Match::new(&cfg, ChaCha8Rng::seed_from_u64(seed));
        let mut left = Jitter(ChaCha8Rng::seed_from_u64(seed ^ 1));
        let mut right = Jitter(ChaCha8Rng::seed_from_u64(seed ^ 2));
        prop_assert!(velocity_in_bounds(&cfg, m.state()));

        for _ in 0..ticks {
            if m.is_match_over() {
                break;
            }
            if m.state().game_over {
                m.start_game();
            }
            m.tick(Some(&mut left), Some(&mut right), None).unwrap();
            prop_assert!(velocity_in_bounds(&cfg, m.state()));
            prop_assert!(m.state().ball.y >= 0 && m.state().ball.y <= cfg.height - 1);
        }
    }

    #[test]
    fn step_keeps_ball_between_walls(
        x in -10i32..135,
        y in 0i32..100,
        dx in prop_oneof![-6i32..=-2, 2i32..=6],
        dy in prop_oneof![-6i32..=-2, 2i32..=6],
        p1 in 7i32..=92,
        p2 in 7i32..=92,
    ) {
        let cfg = SimulationConfig::default();
        let mut state = SimulationState::new(&cfg);
        state.ball.x = x;
        state.ball.y = y;
        state.ball.dx = dx;
        state.ball.dy = dy;
        state.left.y = p1;
        state.right.y = p2;
        step(&mut state, &cfg);
        prop_assert!(state.ball.y >= 0 && state.ball.y <= cfg.height - 1);
        prop_assert!(velocity_in_bounds(&cfg, &state));
    }

    #[test]
    fn mirror_twice_is_identity(
        width in 1usize..20,
        height in 1usize..20,
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let frame: Vec<u8> = (0..width * height)
            .map(|_| rng.gen_range(0..=1))
            .collect();
        let once = mirror(&frame, width, height).unwrap();
        let twice = mirror(&once, width, height).unwrap();
        prop_assert_eq!(twice, frame);
    }
}

#[test]
fn serve_signs_are_fair_and_independent() {
    let cfg = SimulationConfig::default();
    let mut state = SimulationState::new(&cfg);
    let mut rng = ChaCha8Rng::seed_from_u64(2020);
    let mut counts = [[0u32; 2]; 2];
    const SAMPLES: u32 = 10_000;

    for _ in 0..SAMPLES {
        state.new_game(&cfg, &mut rng);
        let sx = (state.ball.dx > 0) as usize;
        let sy = (state.ball.dy > 0) as usize;
        counts[sx][sy] += 1;
    }

    let expected = SAMPLES as f64 / 4.0;
    let chi_square: f64 = counts
        .iter()
        .flatten()
        .map(|&n| (n as f64 - expected).powi(2) / expected)
        .sum();
    // 3 degrees of freedom, p = 0.001
    assert!(chi_square < 16.27, "chi-square {chi_square} for {counts:?}");
}
