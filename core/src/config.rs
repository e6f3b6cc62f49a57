use core::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Game board width (pixels)
pub const DEFAULT_WIDTH: i32 = 125;

/// Game board height (pixels)
pub const DEFAULT_HEIGHT: i32 = 100;

/// Paddle height (pixels)
pub const DEFAULT_PADDLE_HEIGHT: i32 = 15;

/// Controller rounds per ball advance
pub const DEFAULT_PADDLE_BALL_REFRESH_RATIO: u32 = 5;

/// Pixels a paddle moves per unit command
pub const DEFAULT_PADDLE_STEP: i32 = 1;

/// Largest spin added to `dy` by an edge hit
pub const DEFAULT_MAX_SPIN_INC: i32 = 4;

pub const DEFAULT_MIN_DX: i32 = 2;
pub const DEFAULT_MAX_DX: i32 = 6;
pub const DEFAULT_MIN_DY: i32 = 2;
pub const DEFAULT_MAX_DY: i32 = 6;

/// Points needed to win a match
pub const DEFAULT_WINNING_SCORE: u32 = 21;

/// Volleys that must happen before an exit counts as a point
pub const DEFAULT_VOLLEYS_BEFORE_START: u32 = 0;

/// Frames kept by the history buffer
pub const HISTORY_DEPTH: usize = 2;

/// Raw, unvalidated configuration as read from a file or built in code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigInts {
    pub width: i32,
    pub height: i32,
    pub paddle_height: i32,
    pub paddle_ball_refresh_ratio: u32,
    pub paddle_step: i32,
    pub max_spin_inc: i32,
    pub min_dx: i32,
    pub max_dx: i32,
    pub min_dy: i32,
    pub max_dy: i32,
    pub winning_score: u32,
    pub volleys_before_start: u32,
    pub history_depth: usize,
}

impl Default for ConfigInts {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            paddle_height: DEFAULT_PADDLE_HEIGHT,
            paddle_ball_refresh_ratio: DEFAULT_PADDLE_BALL_REFRESH_RATIO,
            paddle_step: DEFAULT_PADDLE_STEP,
            max_spin_inc: DEFAULT_MAX_SPIN_INC,
            min_dx: DEFAULT_MIN_DX,
            max_dx: DEFAULT_MAX_DX,
            min_dy: DEFAULT_MIN_DY,
            max_dy: DEFAULT_MAX_DY,
            winning_score: DEFAULT_WINNING_SCORE,
            volleys_before_start: DEFAULT_VOLLEYS_BEFORE_START,
            history_depth: HISTORY_DEPTH,
        }
    }
}

/// Validated, immutable simulation settings.
///
/// Fields are read through `Deref` to [`ConfigInts`]; the only way to get one
/// is [`SimulationConfig::new`], so every instance has passed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SimulationConfig(ConfigInts);

impl SimulationConfig {
    pub fn new(ints: ConfigInts) -> Result<Self, SimulationError> {
        if ints.width <= 0 || ints.height <= 0 {
            return Err(SimulationError::config(format!(
                "board must be at least 1x1, got {}x{}",
                ints.width, ints.height
            )));
        }
        if ints.paddle_height <= 0 {
            return Err(SimulationError::config("paddle height must be positive"));
        }
        if ints.winning_score == 0 {
            return Err(SimulationError::config("winning score must be positive"));
        }
        if ints.min_dx > ints.max_dx {
            return Err(SimulationError::config(format!(
                "min_dx {} exceeds max_dx {}",
                ints.min_dx, ints.max_dx
            )));
        }
        if ints.min_dy > ints.max_dy {
            return Err(SimulationError::config(format!(
                "min_dy {} exceeds max_dy {}",
                ints.min_dy, ints.max_dy
            )));
        }
        // A zero speed never reaches a paddle or a wall.
        if ints.min_dx <= 0 || ints.min_dy <= 0 {
            return Err(SimulationError::config("ball speeds must be positive"));
        }
        if ints.paddle_step < 0 || ints.max_spin_inc < 0 {
            return Err(SimulationError::config(
                "paddle step and spin increment must not be negative",
            ));
        }
        if ints.history_depth < 2 {
            return Err(SimulationError::config(format!(
                "history depth must be at least 2, got {}",
                ints.history_depth
            )));
        }
        Ok(Self(ints))
    }

    pub fn ints(&self) -> &ConfigInts {
        &self.0
    }

    pub fn start_x(&self) -> i32 {
        self.width / 2
    }

    pub fn start_y(&self) -> i32 {
        self.height / 2
    }

    /// Serve speed along x: the midpoint of `[min_dx, max_dx]`.
    pub fn serve_dx(&self) -> i32 {
        self.min_dx + (self.max_dx - self.min_dx) / 2
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixels one `Up`/`Down` command moves a paddle.
    pub fn paddle_move(&self) -> i32 {
        self.paddle_step * self.paddle_ball_refresh_ratio as i32
    }

    /// Clamp a candidate paddle center.
    ///
    /// The two checks run in sequence and use half the paddle height as a
    /// real number, so for an odd height the range is
    /// `[h/2, height - h/2 - 1]` in integer terms. When the paddle is taller
    /// than the board the second check wins.
    pub fn clamp_paddle_y(&self, y: i32) -> i32 {
        let h = i64::from(self.paddle_height);
        let height = i64::from(self.height);
        let mut y = i64::from(y);
        if 2 * y <= h {
            y = h / 2;
        }
        if 2 * y + h >= 2 * height {
            y = (2 * height - h) / 2;
        }
        y as i32
    }

    /// Whether `y` lies on the paddle centered at `center` (edges included).
    pub fn on_paddle(&self, center: i32, y: i32) -> bool {
        let h = i64::from(self.paddle_height);
        let (center, y) = (i64::from(center), i64::from(y));
        2 * y >= 2 * center - h && 2 * y <= 2 * center + h
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self(ConfigInts::default())
    }
}

impl Deref for SimulationConfig {
    type Target = ConfigInts;

    fn deref(&self) -> &ConfigInts {
        &self.0
    }
}

impl TryFrom<ConfigInts> for SimulationConfig {
    type Error = SimulationError;

    fn try_from(ints: ConfigInts) -> Result<Self, Self::Error> {
        Self::new(ints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(f: impl FnOnce(&mut ConfigInts)) -> Result<SimulationConfig, SimulationError> {
        let mut ints = ConfigInts::default();
        f(&mut ints);
        SimulationConfig::new(ints)
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = build(|_| {}).unwrap();
        assert_eq!(cfg, SimulationConfig::default());
        assert_eq!(cfg.serve_dx(), 4);
        assert_eq!((cfg.start_x(), cfg.start_y()), (62, 50));
        assert_eq!(cfg.pixel_count(), 12_500);
        assert_eq!(cfg.paddle_move(), 5);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(matches!(
            build(|c| c.width = 0),
            Err(SimulationError::Configuration(_))
        ));
        assert!(matches!(
            build(|c| c.height = -3),
            Err(SimulationError::Configuration(_))
        ));
        assert!(matches!(
            build(|c| c.paddle_height = 0),
            Err(SimulationError::Configuration(_))
        ));
        assert!(matches!(
            build(|c| c.winning_score = 0),
            Err(SimulationError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_inverted_speed_ranges() {
        assert!(build(|c| c.min_dx = 7).is_err());
        assert!(build(|c| c.min_dy = 7).is_err());
        assert!(build(|c| {
            c.min_dy = 6;
            c.max_dy = 6;
        })
        .is_ok());
    }

    #[test]
    fn rejects_shallow_history() {
        let err = build(|c| c.history_depth = 1).unwrap_err();
        assert!(err.to_string().contains("history depth"));
    }

    #[test]
    fn tall_paddle_is_accepted() {
        let cfg = build(|c| c.paddle_height = 120).unwrap();
        // second check wins: 60 first, then 40
        assert_eq!(cfg.clamp_paddle_y(0), 40);
        assert_eq!(cfg.clamp_paddle_y(500), 40);
    }

    #[test]
    fn clamp_matches_half_pixel_bounds() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.clamp_paddle_y(-20), 7);
        assert_eq!(cfg.clamp_paddle_y(7), 7);
        assert_eq!(cfg.clamp_paddle_y(8), 8);
        assert_eq!(cfg.clamp_paddle_y(92), 92);
        assert_eq!(cfg.clamp_paddle_y(93), 92);
        assert_eq!(cfg.clamp_paddle_y(400), 92);
        assert_eq!(cfg.clamp_paddle_y(i32::MAX), 92);
        assert_eq!(cfg.clamp_paddle_y(i32::MIN), 7);
        assert!(!cfg.on_paddle(i32::MAX, 50));
        assert!(cfg.on_paddle(i32::MIN + 1, i32::MIN + 8));
    }

    #[test]
    fn partial_json_takes_defaults() {
        let ints: ConfigInts =
            serde_json::from_str(r#"{"width": 80, "winning_score": 11}"#).unwrap();
        assert_eq!(ints.width, 80);
        assert_eq!(ints.winning_score, 11);
        assert_eq!(ints.height, DEFAULT_HEIGHT);
    }
}
