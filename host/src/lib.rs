//! Outer layer around the Pong engine: controllers, config files, the frame
//! log recorder and match orchestration.

pub mod frame_log;
pub mod players;
pub mod session;

use pong_core::{ConfigInts, SimulationConfig};

pub use frame_log::{FrameLog, FrameLogError};
pub use players::{BallTracker, CoinFlip, Forecaster, PlayerKind, Policy, PolicyController};
pub use session::{
    play_match, run_session, MatchSummary, SampleBuffer, SessionOptions, SessionReport,
};

/// Largest config file accepted.
const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Load a JSON config; missing keys take their defaults.
pub fn load_config(path: &str) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| format!("Error accessing config '{}': {}", path, e))?;
    if metadata.len() > MAX_CONFIG_SIZE {
        return Err(format!(
            "Config file too large: {} bytes (max {} bytes)",
            metadata.len(),
            MAX_CONFIG_SIZE
        )
        .into());
    }
    let raw = std::fs::read_to_string(path)?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let ints: ConfigInts = serde_json::from_str(raw)
        .map_err(|e| format!("Error parsing config JSON: {}", e))?;
    let config = SimulationConfig::new(ints)?;
    tracing::debug!(?config, "loaded config");
    Ok(config)
}

/// Check a recorded log against its own header geometry: ball rows inside
/// the board and paddle centers the clamp would leave alone.
pub fn validate_frame_log(log: &FrameLog) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let config = SimulationConfig::new(ConfigInts {
        width: log.width,
        height: log.height,
        paddle_height: log.paddle_height,
        ..ConfigInts::default()
    })?;
    for (tick, [_, ball_y, p1, p2]) in log.records.iter().copied().enumerate() {
        if ball_y < 0 || ball_y > config.height - 1 {
            return Err(format!("tick {}: ball y {} is off the board", tick, ball_y).into());
        }
        for (name, y) in [("paddle 1", p1), ("paddle 2", p2)] {
            if config.clamp_paddle_y(y) != y {
                return Err(format!("tick {}: {} center {} is off the board", tick, name, y).into());
            }
        }
    }
    Ok(config)
}
