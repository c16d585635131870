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

//! Game geometry and physics constants.
//!
//! The defaults reproduce the classic 600x800 window with sprites scaled up 2x:
//! a 68x48 bird, 104x640 pipes and a 672 pixel wide ground tile at y = 730.

use serde::{Deserialize, Serialize};

use crate::Float;

/// Game configuration error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A size, speed or count must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: Float,
    },

    /// The gap center range is empty.
    #[error("gap center range is empty: [{min}, {max})")]
    InvalidGapRange {
        /// Inclusive lower bound.
        min: Float,
        /// Exclusive upper bound.
        max: Float,
    },

    /// Pipes would spawn at or behind the birds, so they could never be passed.
    #[error("pipe spawn x {spawn_x} must be ahead of the bird start x {bird_x}")]
    SpawnBehindAgent {
        /// Pipe spawn x.
        spawn_x: Float,
        /// Bird start x.
        bird_x: Float,
    },

    /// The ground is not inside the screen.
    #[error("ground y {ground_y} must be inside the screen height {screen_height}")]
    GroundOutsideScreen {
        /// Ground y.
        ground_y: Float,
        /// Screen height.
        screen_height: Float,
    },
}

/// Bird sprite size and kinematics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    /// Start x. Every bird keeps this x for the whole episode.
    pub start_x: Float,

    /// Start y.
    pub start_y: Float,

    /// Collision box width.
    pub width: Float,

    /// Collision box height.
    pub height: Float,

    /// Velocity set by a jump. Negative is up.
    pub jump_velocity: Float,

    /// Acceleration term of the falling body formula.
    pub gravity: Float,

    /// Cap on downward displacement per tick.
    pub max_fall_displacement: Float,

    /// Extra upward displacement added whenever the bird is rising.
    pub rise_boost: Float,

    /// Tilt while rising, in degrees.
    pub max_rotation: Float,

    /// Lowest tilt, in degrees.
    pub min_rotation: Float,

    /// Tilt lost per tick while falling, in degrees.
    pub rotation_velocity: Float,

    /// How far below the last jump height the bird may drop before it tilts down.
    pub tilt_hold_distance: Float,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            start_x: 230.0,
            start_y: 350.0,
            width: 68.0,
            height: 48.0,
            jump_velocity: -10.5,
            gravity: 3.0,
            max_fall_displacement: 16.0,
            rise_boost: 2.0,
            max_rotation: 25.0,
            min_rotation: -90.0,
            rotation_velocity: 20.0,
            tilt_hold_distance: 50.0,
        }
    }
}

/// Pipe sprite size, gap and speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    /// Width of both pipe extents.
    pub width: Float,

    /// Height of a single pipe extent.
    pub height: Float,

    /// Vertical size of the opening between the two extents.
    pub gap: Float,

    /// Pixels moved left per tick.
    pub velocity: Float,

    /// x where new pipes appear.
    pub spawn_x: Float,

    /// Inclusive lower bound of the random gap center.
    pub gap_center_min: Float,

    /// Exclusive upper bound of the random gap center.
    pub gap_center_max: Float,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            width: 104.0,
            height: 640.0,
            gap: 200.0,
            velocity: 5.0,
            spawn_x: 700.0,
            gap_center_min: 50.0,
            gap_center_max: 450.0,
        }
    }
}

/// Scrolling ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    /// Top of the ground. A bird whose bottom edge reaches it is out.
    pub y: Float,

    /// Width of one ground tile.
    pub width: Float,

    /// Pixels moved left per tick. Same as the pipes so the world scrolls together.
    pub velocity: Float,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            y: 730.0,
            width: 672.0,
            velocity: 5.0,
        }
    }
}

/// Everything needed to lay out and move the game objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Screen size.
    pub screen: ScreenConfig,

    /// Bird settings.
    pub bird: BirdConfig,

    /// Pipe settings.
    pub pipe: PipeConfig,

    /// Ground settings.
    pub base: BaseConfig,
}

/// Screen size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Width in pixels.
    pub width: Float,

    /// Height in pixels.
    pub height: Float,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 800.0,
        }
    }
}

fn positive(field: &'static str, value: Float) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

impl GameConfig {
    /// Check that the configuration describes a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("screen.width", self.screen.width)?;
        positive("screen.height", self.screen.height)?;
        positive("bird.width", self.bird.width)?;
        positive("bird.height", self.bird.height)?;
        positive("bird.max_fall_displacement", self.bird.max_fall_displacement)?;
        positive("pipe.width", self.pipe.width)?;
        positive("pipe.height", self.pipe.height)?;
        positive("pipe.gap", self.pipe.gap)?;
        positive("pipe.velocity", self.pipe.velocity)?;
        positive("base.width", self.base.width)?;

        if self.pipe.gap_center_min >= self.pipe.gap_center_max {
            return Err(ConfigError::InvalidGapRange {
                min: self.pipe.gap_center_min,
                max: self.pipe.gap_center_max,
            });
        }
        if self.pipe.spawn_x <= self.bird.start_x {
            return Err(ConfigError::SpawnBehindAgent {
                spawn_x: self.pipe.spawn_x,
                bird_x: self.bird.start_x,
            });
        }
        if self.base.y <= 0.0 || self.base.y > self.screen.height {
            return Err(ConfigError::GroundOutsideScreen {
                ground_y: self.base.y,
                screen_height: self.screen.height,
            });
        }
        Ok(())
    }
}
