use host::{
    load_config, run_session, validate_frame_log, FrameLog, PlayerKind, SessionOptions,
    SessionReport,
};
use pong_core::{Player, Side, SimulationConfig};
use std::env;
use std::fs;
use std::str::FromStr;
use std::time::Instant;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    println!("🏓 Pong Simulation Engine");
    println!("{}", "=".repeat(70));
    println!();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "simulate" => {
            let (config_path, opts, record_path, summary_path) = parse_simulate_args(&args);
            simulate_command(
                config_path.as_deref(),
                &opts,
                record_path,
                summary_path.as_deref(),
            );
        }

        "replay" => {
            if args.len() < 3 {
                eprintln!("Usage: {} replay <frame_log>", args[0]);
                eprintln!("Error: Missing required argument");
                std::process::exit(1);
            }
            replay_command(&args[2]);
        }

        "--help" | "-h" => {
            print_usage(&args[0]);
            std::process::exit(0);
        }

        command => {
            eprintln!("❌ Unknown command: {}", command);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  simulate [options]");
    eprintln!("      Play matches between two paddle controllers");
    eprintln!("      --config <file>     JSON config (missing keys use defaults)");
    eprintln!("      --seed <n>          RNG seed (default 0)");
    eprintln!("      --matches <n>       Number of matches (default 1)");
    eprintln!("      --left <kind>       Left controller (default tracker)");
    eprintln!("      --right <kind>      Right controller (default random)");
    eprintln!("      --max-ticks <n>     Abandon a match after n ticks (default 1000000)");
    eprintln!("      --learner <side>    Capture training samples for left|right");
    eprintln!("      --record [file]     Write a frame log");
    eprintln!("                          Defaults to: pong-frames_seed<seed>_<timestamp>.txt");
    eprintln!("      --summary <file>    Write the session summary as JSON");
    eprintln!();
    eprintln!("  replay <frame_log>");
    eprintln!("      Check a recorded frame log and print its digest");
    eprintln!();
    eprintln!("Controller kinds:");
    eprintln!("  tracker:  follows the ball while it approaches");
    eprintln!("  forecast: moves to where the ball will cross its column");
    eprintln!("  random:   untrained stochastic policy (coin flip)");
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("❌ Error: {}", msg);
    std::process::exit(1);
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(v) if !v.starts_with("--") => v.as_str(),
        _ => fail(format!("{} requires a value", flag)),
    }
}

fn parse_number<T: FromStr>(raw: &str, flag: &str) -> T
where
    T::Err: std::fmt::Display,
{
    raw.parse().unwrap_or_else(|e: T::Err| fail(format!("{}: {}", flag, e)))
}

/// Returns the config path, options, record target (`Some(None)` means
/// "use the default name") and summary path.
fn parse_simulate_args(
    args: &[String],
) -> (Option<String>, SessionOptions, Option<Option<String>>, Option<String>) {
    let mut config_path = None;
    let mut opts = SessionOptions::default();
    let mut record_path = None;
    let mut summary_path = None;

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" | "-c" => {
                config_path = Some(flag_value(args, i, flag).to_string());
                i += 2;
            }
            "--seed" => {
                opts.seed = parse_number(flag_value(args, i, flag), flag);
                i += 2;
            }
            "--matches" => {
                opts.matches = parse_number(flag_value(args, i, flag), flag);
                i += 2;
            }
            "--max-ticks" => {
                opts.max_ticks_per_match = parse_number(flag_value(args, i, flag), flag);
                i += 2;
            }
            "--left" => {
                opts.left = PlayerKind::from_str(flag_value(args, i, flag))
                    .unwrap_or_else(|e| fail(e));
                i += 2;
            }
            "--right" => {
                opts.right = PlayerKind::from_str(flag_value(args, i, flag))
                    .unwrap_or_else(|e| fail(e));
                i += 2;
            }
            "--learner" => {
                let side =
                    Side::from_str(flag_value(args, i, flag)).unwrap_or_else(|e| fail(e));
                opts.learner = Some(side);
                i += 2;
            }
            "--record" => {
                opts.record = true;
                match args.get(i + 1) {
                    Some(v) if !v.starts_with("--") => {
                        record_path = Some(Some(v.clone()));
                        i += 2;
                    }
                    _ => {
                        record_path = Some(None);
                        i += 1;
                    }
                }
            }
            "--summary" => {
                summary_path = Some(flag_value(args, i, flag).to_string());
                i += 2;
            }
            other => fail(format!("unknown option '{}'", other)),
        }
    }
    (config_path, opts, record_path, summary_path)
}

fn simulate_command(
    config_path: Option<&str>,
    opts: &SessionOptions,
    record_path: Option<Option<String>>,
    summary_path: Option<&str>,
) {
    let config = match config_path {
        Some(path) => load_config(path).unwrap_or_else(|e| fail(e)),
        None => SimulationConfig::default(),
    };

    println!("📋 Simulating {} match(es)", opts.matches);
    println!(
        "  Board: {}x{}, paddle {}",
        config.width, config.height, config.paddle_height
    );
    println!("  Left: {}  Right: {}", opts.left, opts.right);
    println!("  Seed: {}", opts.seed);
    println!();

    let start = Instant::now();
    let report = run_session(&config, opts).unwrap_or_else(|e| {
        eprintln!();
        eprintln!("❌ Simulation failed: {}", e);
        std::process::exit(1);
    });
    let duration = start.elapsed();

    print_report(&report);
    println!("  Simulation time: {:.2}s", duration.as_secs_f64());

    if let (Some(target), Some(log)) = (record_path, report.frame_log.as_ref()) {
        let default_filename = format!(
            "pong-frames_seed{}_{}.txt",
            opts.seed,
            chrono::Utc::now().timestamp()
        );
        let path = target.unwrap_or(default_filename);
        match log.save(&path) {
            Ok(()) => {
                println!();
                println!("💾 Frame log saved to: {}", path);
                println!("   Use 'replay {}' to check it", path);
            }
            Err(e) => fail(format!("saving frame log: {}", e)),
        }
    }

    if let Some(path) = summary_path {
        if let Err(e) = save_summary(&report, path) {
            fail(format!("saving summary: {}", e));
        }
        println!("📝 Summary saved to: {}", path);
    }
    println!("{}", "=".repeat(70));
}

fn print_report(report: &SessionReport) {
    for (i, m) in report.matches.iter().enumerate() {
        let result = match m.winner {
            Some(Player::One) => "Player 1 wins".to_string(),
            Some(Player::Two) => "Player 2 wins".to_string(),
            None => "abandoned".to_string(),
        };
        println!(
            "  Match {}: {} {}-{} ({} games, {} lets, {} volleys, {} ticks)",
            i, result, m.player_one, m.player_two, m.games, m.lets, m.volleys, m.ticks
        );
        if m.samples > 0 {
            println!("    Samples: {} (reward total {})", m.samples, m.reward_total);
        }
    }
    println!();
    println!(
        "✅ Player 1: {} match(es), Player 2: {} match(es)",
        report.wins(Player::One),
        report.wins(Player::Two)
    );
    if let Some(digest) = &report.frame_digest {
        println!("  Frame digest: 0x{}", digest);
    }
}

fn replay_command(path: &str) {
    println!("📋 Checking frame log");
    println!("  File: {}", path);
    println!();

    let log = FrameLog::load(path)
        .unwrap_or_else(|e| fail(format!("reading '{}': {}", path, e)));
    match validate_frame_log(&log) {
        Ok(_) => {
            println!("✅ Frame log is consistent");
            println!(
                "  Board: {}x{}, paddle {}",
                log.width, log.height, log.paddle_height
            );
            println!("  Ticks: {}", log.ticks());
            println!("  Digest: 0x{}", log.digest_hex());
            println!("{}", "=".repeat(70));
        }
        Err(e) => {
            eprintln!("❌ Frame log rejected: {}", e);
            eprintln!("{}", "=".repeat(70));
            std::process::exit(1);
        }
    }
}

fn save_summary(report: &SessionReport, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
