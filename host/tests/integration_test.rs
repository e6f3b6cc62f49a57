// End-to-end sessions: seeded runs, recording, sample capture and limits.
use host::{parse_config, run_session, FrameLog, PlayerKind, SessionOptions};
use pong_core::{Player, Side, SimulationConfig};

fn short_matches() -> SimulationConfig {
    parse_config(r#"{"winning_score": 3}"#).expect("config should parse")
}

fn options(seed: u64) -> SessionOptions {
    SessionOptions {
        seed,
        matches: 2,
        left: PlayerKind::Tracker,
        right: PlayerKind::Random,
        max_ticks_per_match: 200_000,
        learner: None,
        record: true,
    }
}

#[test]
fn test_seeded_sessions_replay_identically() {
    let config = short_matches();

    let a = run_session(&config, &options(930397884)).expect("session should run");
    let b = run_session(&config, &options(930397884)).expect("session should run");

    assert_eq!(a.matches, b.matches, "same seed must give same matches");
    assert_eq!(a.frame_digest, b.frame_digest, "same seed must give same frames");
    assert_eq!(a.frame_log, b.frame_log);

    let c = run_session(&config, &options(237054789)).expect("session should run");
    assert_ne!(a.frame_digest, c.frame_digest, "different seeds should diverge");
}

#[test]
fn test_matches_finish_at_winning_score() {
    let config = short_matches();
    let report = run_session(&config, &options(725309225)).expect("session should run");

    assert_eq!(report.matches.len(), 2);
    for m in &report.matches {
        let winner = m.winner.expect("match should finish within the tick budget");
        let (won, lost) = match winner {
            Player::One => (m.player_one, m.player_two),
            Player::Two => (m.player_two, m.player_one),
        };
        assert_eq!(won, 3);
        assert!(lost < 3);
        assert_eq!(m.games, m.player_one + m.player_two);
        assert_eq!(m.lets, 0, "no warm-up volleys are required");
    }
    assert_eq!(report.wins(Player::One) + report.wins(Player::Two), 2);
}

#[test]
fn test_frame_log_covers_every_tick() {
    let config = short_matches();
    let mut opts = options(4);
    opts.matches = 1;
    let report = run_session(&config, &opts).expect("session should run");

    let log = report.frame_log.expect("recording was requested");
    assert_eq!(log.ticks() as u64, report.matches[0].ticks);
    assert_eq!((log.width, log.height, log.paddle_height), (125, 100, 15));
    // every game starts from a centered serve
    assert_eq!(&log.records[0][..2], &[62, 50]);
    assert_eq!(report.frame_digest.as_deref(), Some(log.digest_hex().as_str()));

    let reparsed = FrameLog::parse(&log.to_text()).expect("own output should parse");
    assert_eq!(reparsed, log);
}

#[test]
fn test_learner_rewards_match_the_score() {
    let config = short_matches();
    let mut opts = options(61);
    opts.matches = 1;
    opts.left = PlayerKind::Random;
    opts.right = PlayerKind::Forecast;
    opts.learner = Some(Side::Left);

    let report = run_session(&config, &opts).expect("session should run");
    let m = &report.matches[0];

    assert_eq!(m.samples as u64, m.ticks, "one sample per tick");
    assert_eq!(
        m.reward_total,
        i64::from(m.player_one) - i64::from(m.player_two),
        "+1 per learner point, -1 per opponent point"
    );
}

#[test]
fn test_tick_budget_abandons_match() {
    let config = SimulationConfig::default();
    let opts = SessionOptions {
        seed: 1,
        matches: 1,
        left: PlayerKind::Tracker,
        right: PlayerKind::Tracker,
        max_ticks_per_match: 10,
        learner: None,
        record: false,
    };
    let report = run_session(&config, &opts).expect("session should run");
    let m = &report.matches[0];

    // a serve needs 16 ticks to cross half the board at dx = 4
    assert_eq!(m.ticks, 10);
    assert_eq!(m.winner, None);
    assert_eq!((m.player_one, m.player_two), (0, 0));
    assert!(report.frame_log.is_none());
    assert!(report.frame_digest.is_none());
}

#[test]
fn test_warm_up_exits_are_lets() {
    let config =
        parse_config(r#"{"volleys_before_start": 1000}"#).expect("config should parse");
    let opts = SessionOptions {
        seed: 98,
        matches: 1,
        left: PlayerKind::Random,
        right: PlayerKind::Random,
        max_ticks_per_match: 5_000,
        learner: None,
        record: false,
    };
    let report = run_session(&config, &opts).expect("session should run");
    let m = &report.matches[0];

    assert!(m.lets > 0, "random paddles should miss at least once");
    assert_eq!((m.player_one, m.player_two), (0, 0));
    assert_eq!(m.winner, None);
}
