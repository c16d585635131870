/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! Bird kinematics.

use serde::{Deserialize, Serialize};

use crate::{BirdConfig, Float, Rect};

/// A bird. It only ever moves vertically; the world scrolls past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    /// Left edge. Fixed for the whole episode.
    pub x: Float,

    /// Top edge.
    pub y: Float,

    /// Velocity at the time of the last jump. Negative is up.
    pub velocity: Float,

    /// Ticks since the last jump (or since the bird was created).
    pub tick_count: u32,

    /// y at the time of the last jump.
    pub jump_height: Float,

    /// Cosmetic rotation in degrees. Positive tilts the beak up.
    pub tilt: Float,
}

/// Displacement of a falling body after `ticks` ticks with initial `velocity`.
pub fn raw_displacement(velocity: Float, ticks: u32, gravity: Float) -> Float {
    let t = Float::from(ticks);
    velocity * t + 0.5 * gravity * t * t
}

/// Cap downward displacement and exaggerate upward displacement.
pub fn clamp_displacement(displacement: Float, config: &BirdConfig) -> Float {
    if displacement >= config.max_fall_displacement {
        config.max_fall_displacement
    } else if displacement < 0.0 {
        displacement - config.rise_boost
    } else {
        displacement
    }
}

impl Bird {
    /// Create a bird at rest.
    pub fn new(x: Float, y: Float) -> Self {
        Self {
            x,
            y,
            velocity: 0.0,
            tick_count: 0,
            jump_height: y,
            tilt: 0.0,
        }
    }

    /// Create a bird at the configured start position.
    pub fn at_start(config: &BirdConfig) -> Self {
        Self::new(config.start_x, config.start_y)
    }

    /// Flap. The next tick starts a new parabola from the current y.
    pub fn jump(&mut self, config: &BirdConfig) {
        self.velocity = config.jump_velocity;
        self.tick_count = 0;
        self.jump_height = self.y;
    }

    /// Move one tick along the current parabola. Returns the applied displacement.
    pub fn advance(&mut self, config: &BirdConfig) -> Float {
        self.tick_count += 1;
        let displacement = clamp_displacement(
            raw_displacement(self.velocity, self.tick_count, config.gravity),
            config,
        );
        self.y += displacement;

        if displacement < 0.0 || self.y < self.jump_height + config.tilt_hold_distance {
            if self.tilt < config.max_rotation {
                self.tilt = config.max_rotation;
            }
        } else if self.tilt > config.min_rotation {
            self.tilt = (self.tilt - config.rotation_velocity).max(config.min_rotation);
        }

        displacement
    }

    /// Collision box.
    pub fn bounds(&self, config: &BirdConfig) -> Rect {
        Rect::new(self.x, self.y, config.width, config.height)
    }

    /// Whether the bird has hit the ground at `ground_y` or flown off the top of the screen.
    pub fn is_out_of_bounds(&self, config: &BirdConfig, ground_y: Float) -> bool {
        self.y + config.height >= ground_y || self.y < 0.0
    }
}
