//! Recent-frame history used to build motion features for a learner.

use std::collections::VecDeque;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::state::{Paddle, SimulationState, Side};

/// Binary grid, row-major, `width * height` cells. 1 marks ball or paddle.
pub type PixelFrame = Vec<u8>;

/// `[ball_x, ball_y, paddle1_y, paddle2_y]`
pub type PositionFrame = [i32; 4];

/// Fixed-depth history of snapshots, newest at index 0.
///
/// Both sequences start zero-filled and always hold exactly `depth` frames.
#[derive(Clone, Debug)]
pub struct FrameHistoryBuffer {
    width: i32,
    height: i32,
    paddle_height: i32,
    depth: usize,
    pixels: VecDeque<PixelFrame>,
    positions: VecDeque<PositionFrame>,
}

impl FrameHistoryBuffer {
    pub fn new(config: &SimulationConfig) -> Self {
        let mut buffer = Self {
            width: config.width,
            height: config.height,
            paddle_height: config.paddle_height,
            depth: config.history_depth,
            pixels: VecDeque::with_capacity(config.history_depth + 1),
            positions: VecDeque::with_capacity(config.history_depth + 1),
        };
        buffer.clear();
        buffer
    }

    /// Forget everything; all slots become blank frames.
    pub fn clear(&mut self) {
        let blank = vec![0u8; self.width as usize * self.height as usize];
        self.pixels.clear();
        self.pixels.resize(self.depth, blank);
        self.positions.clear();
        self.positions.resize(self.depth, [0; 4]);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn push_pixel_frame(&mut self, state: &SimulationState) {
        let frame = self.render(state);
        self.pixels.push_front(frame);
        self.pixels.truncate(self.depth);
    }

    pub fn push_position_frame(&mut self, state: &SimulationState) {
        self.positions.push_front(state.positions());
        self.positions.truncate(self.depth);
    }

    pub fn push(&mut self, state: &SimulationState) {
        self.push_pixel_frame(state);
        self.push_position_frame(state);
    }

    /// Frame `age` ticks old; 0 is the newest.
    pub fn pixel_frame(&self, age: usize) -> Option<&[u8]> {
        self.pixels.get(age).map(Vec::as_slice)
    }

    pub fn position_frame(&self, age: usize) -> Option<&PositionFrame> {
        self.positions.get(age)
    }

    pub fn pixel_frames(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.iter().map(Vec::as_slice)
    }

    pub fn position_frames(&self) -> impl Iterator<Item = &PositionFrame> {
        self.positions.iter()
    }

    /// `newest - second newest`, one entry per pixel in `{-1, 0, 1}`.
    pub fn difference_feature(&self) -> Vec<i8> {
        self.pixels[0]
            .iter()
            .zip(self.pixels[1].iter())
            .map(|(&new, &old)| new as i8 - old as i8)
            .collect()
    }

    /// Rasterize a snapshot. A ball outside the grid draws nothing.
    pub fn render(&self, state: &SimulationState) -> PixelFrame {
        let (w, h) = (self.width, self.height);
        let mut frame = vec![0u8; w as usize * h as usize];

        let ball = &state.ball;
        if (0..w).contains(&ball.x) && (0..h).contains(&ball.y) {
            frame[(w * ball.y + ball.x) as usize] = 1;
        }
        for paddle in [&state.left, &state.right] {
            let column = match paddle.side {
                Side::Left => 0,
                Side::Right => w - 1,
            };
            for row in self.paddle_rows(paddle) {
                frame[(w * row + column) as usize] = 1;
            }
        }
        frame
    }

    /// Rows covered by a paddle: `[center - h/2, center + h/2)` with half
    /// the height taken as a real number, truncated and clipped to the board.
    fn paddle_rows(&self, paddle: &Paddle) -> std::ops::Range<i32> {
        let (y, h, height) = (
            i64::from(paddle.y),
            i64::from(self.paddle_height),
            i64::from(self.height),
        );
        let top = ((2 * y - h) / 2).clamp(0, height);
        let bottom = ((2 * y + h) / 2).clamp(top, height);
        top as i32..bottom as i32
    }
}

/// Reflect a frame left to right. Applying it twice is the identity.
pub fn mirror<T: Copy>(
    frame: &[T],
    width: usize,
    height: usize,
) -> Result<Vec<T>, SimulationError> {
    let expected = width * height;
    if frame.len() != expected {
        return Err(SimulationError::FrameSize { expected, actual: frame.len() });
    }
    let mut out = Vec::with_capacity(expected);
    for row in frame.chunks_exact(width.max(1)) {
        out.extend(row.iter().rev());
    }
    Ok(out)
}
