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

//! Scrolling ground.
//!
//! Two copies of the ground tile sit side by side and move left together. When
//! one has scrolled fully off the left edge it is put back right after the
//! other one, so the strip never shows a hole.
//!
//! ```text
//!     x1        x2
//!     |---------|---------|
//!  |---------|---------|
//!  ...
//!            |---------|---------|
//!                      x1        x2
//! ```

use serde::{Deserialize, Serialize};

use crate::{BaseConfig, Float};

/// The ground strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    /// Top of the ground.
    pub y: Float,

    /// Left edge of the first tile.
    pub x1: Float,

    /// Left edge of the second tile.
    pub x2: Float,

    width: Float,
    velocity: Float,
}

impl Base {
    /// Create the ground with the first tile at the left edge of the screen.
    pub fn new(config: &BaseConfig) -> Self {
        Self {
            y: config.y,
            x1: 0.0,
            x2: config.width,
            width: config.width,
            velocity: config.velocity,
        }
    }

    /// Scroll one tick.
    pub fn advance(&mut self) {
        self.x1 -= self.velocity;
        self.x2 -= self.velocity;

        if self.x1 + self.width < 0.0 {
            self.x1 = self.x2 + self.width;
        }
        if self.x2 + self.width < 0.0 {
            self.x2 = self.x1 + self.width;
        }
    }
}
