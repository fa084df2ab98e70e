//! Character jump physics
//!
//! Two states, one impulse. The character never moves horizontally; the
//! jump is a vertical, time-boxed arc that must complete before the
//! obstacle passes underneath.

use glam::Vec2;

use crate::consts::*;
use crate::sim::clock::normalized;

/// Jump state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JumpState {
    Grounded,
    Airborne,
}

/// Avatar position and vertical motion
#[derive(Debug, Clone)]
pub struct CharacterMotion {
    /// x is fixed at `CHARACTER_X`; y is 0 on the ground, negative in the air
    pub pos: Vec2,
    vertical_velocity: f32,
    state: JumpState,
}

impl Default for CharacterMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterMotion {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(CHARACTER_X, GROUND_Y),
            vertical_velocity: 0.0,
            state: JumpState::Grounded,
        }
    }

    pub fn is_airborne(&self) -> bool {
        self.state == JumpState::Airborne
    }

    pub fn is_grounded(&self) -> bool {
        self.state == JumpState::Grounded
    }

    /// Apply the jump impulse. No-op while already airborne.
    pub fn jump(&mut self) {
        if self.state == JumpState::Grounded {
            self.vertical_velocity = JUMP_POWER;
            self.state = JumpState::Airborne;
        }
    }

    /// Integrate velocity and gravity. No-op while grounded; landing snaps
    /// back to the ground line and resets velocity.
    pub fn update(&mut self, delta_ms: f64) {
        if self.state != JumpState::Airborne {
            return;
        }
        let ndt = normalized(delta_ms);
        self.pos.y += self.vertical_velocity * ndt;
        self.vertical_velocity += GRAVITY * ndt;

        if self.pos.y >= GROUND_Y {
            self.pos.y = GROUND_Y;
            self.vertical_velocity = 0.0;
            self.state = JumpState::Grounded;
        }
    }

    /// Reset to grounded at the start of a run
    pub fn reset(&mut self) {
        self.pos = Vec2::new(CHARACTER_X, GROUND_Y);
        self.vertical_velocity = 0.0;
        self.state = JumpState::Grounded;
    }
}
