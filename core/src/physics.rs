//! One discrete tick of ball motion.
//!
//! Everything is integer arithmetic on the pixel grid. The four collision
//! checks are independent and always run in the same order (bottom wall,
//! top wall, left paddle, right paddle), so with odd geometry a later check
//! overrides an earlier one.

use crate::config::SimulationConfig;
use crate::state::{Ball, SimulationState, Side};

/// Which collision checks fired during a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contacts {
    pub bottom_wall: bool,
    pub top_wall: bool,
    pub left_paddle: bool,
    pub right_paddle: bool,
}

impl Contacts {
    pub fn paddle(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_paddle,
            Side::Right => self.right_paddle,
        }
    }
}

/// Advance the ball by one tick and resolve collisions.
pub fn step(state: &mut SimulationState, config: &SimulationConfig) -> Contacts {
    let mut contacts = Contacts::default();
    let ball = &mut state.ball;

    ball.x += ball.dx;
    ball.y += ball.dy;

    contacts.bottom_wall = bounce_walls_bottom(ball, config);
    contacts.top_wall = bounce_walls_top(ball);

    if ball.x <= 0 && config.on_paddle(state.left.y, ball.y) {
        ball.dy = spin(ball.dy, ball.y, state.left.y, config);
        ball.x = 1;
        ball.dx = ball.dx.abs();
        state.volley_count += 1;
        contacts.left_paddle = true;
    }

    if ball.x >= config.width - 1 && config.on_paddle(state.right.y, ball.y) {
        ball.dy = spin(ball.dy, ball.y, state.right.y, config);
        ball.x = config.width - 1;
        ball.dx = -ball.dx.abs();
        state.volley_count += 1;
        contacts.right_paddle = true;
    }

    contacts
}

fn bounce_walls_bottom(ball: &mut Ball, config: &SimulationConfig) -> bool {
    if ball.y >= config.height - 1 {
        ball.y = config.height - 1;
        ball.dy = -ball.dy.abs();
        return true;
    }
    false
}

fn bounce_walls_top(ball: &mut Ball) -> bool {
    if ball.y <= 0 {
        ball.y = 0;
        ball.dy = ball.dy.abs();
        return true;
    }
    false
}

/// Spin offset for a paddle contact, truncated toward zero.
///
/// The distance is measured along the pre-contact direction of travel, so
/// a center hit gives 0 and an edge hit gives up to `max_spin_inc`.
pub fn spin_offset(dy: i32, ball_y: i32, paddle_y: i32, config: &SimulationConfig) -> i32 {
    let distance = if dy <= 0 { paddle_y - ball_y } else { ball_y - paddle_y };
    // max_spin_inc * distance / (paddle_height / 2), without floats
    2 * config.max_spin_inc * distance / config.paddle_height
}

/// New `dy` after a paddle contact: offset first, then clamp inside the
/// branch picked by the pre-contact sign.
fn spin(dy: i32, ball_y: i32, paddle_y: i32, config: &SimulationConfig) -> i32 {
    let offset = spin_offset(dy, ball_y, paddle_y, config);
    let mut dy = dy;
    if dy <= 0 {
        dy += offset;
        if dy <= -config.max_dy {
            dy = -config.max_dy;
        }
        if dy >= -config.min_dy {
            dy = -config.min_dy;
        }
    } else {
        dy += offset;
        if dy <= config.min_dy {
            dy = config.min_dy;
        }
        if dy >= config.max_dy {
            dy = config.max_dy;
        }
    }
    dy
}

/// Where the ball will cross the paddle column it is heading for, using the
/// same wall rules as [`step`] and ignoring paddles.
pub fn forecast_y(ball: &Ball, config: &SimulationConfig) -> i32 {
    if ball.dx == 0 {
        return ball.y;
    }
    let mut probe = *ball;
    loop {
        if probe.dx > 0 && probe.x >= config.width - 1 {
            return probe.y;
        }
        if probe.dx < 0 && probe.x <= 0 {
            return probe.y;
        }
        probe.x += probe.dx;
        probe.y += probe.dy;
        bounce_walls_bottom(&mut probe, config);
        bounce_walls_top(&mut probe);
    }
}
