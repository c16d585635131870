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

#![warn(missing_docs)]

//! Flappy Bird game logic.
//!
//! This is a library for the pieces of a Flappy Bird game that matter to the
//! gameplay: the bird's kinematics, the pipes and the scrolling ground. It is
//! intended to be used by a driver that simulates many birds at once. Nothing
//! in here draws anything.
//!
//! Coordinates follow screen conventions: (0, 0) is the top left corner and y
//! grows downwards, so a jump is a negative velocity.

use serde::{Deserialize, Serialize};

pub mod base;
pub mod bird;
pub mod config;
pub mod pipe;

pub use base::Base;
pub use bird::Bird;
pub use config::{BaseConfig, BirdConfig, ConfigError, GameConfig, PipeConfig, ScreenConfig};
pub use pipe::Pipe;

/// Floating point type used for all positions and velocities.
pub type Float = f64;

/// Random number generator used to place pipes.
pub type Rng = rand_pcg::Pcg64;

/// Axis-aligned rectangle. `x`, `y` is the top left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: Float,

    /// Top edge.
    pub y: Float,

    /// Width, extending right from `x`.
    pub width: Float,

    /// Height, extending down from `y`.
    pub height: Float,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: Float, y: Float, width: Float, height: Float) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> Float {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> Float {
        self.y + self.height
    }

    /// Whether two rectangles overlap. Rectangles that only share an edge do not.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_rect_overlapping() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_rect_sharing_an_edge_does_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
    }

    #[test]
    fn test_rect_contained() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 1.0, 1.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    proptest! {
        #[test]
        fn test_rect_intersection_is_symmetric(
            ax in -500.0..500.0f64, ay in -500.0..500.0f64,
            bx in -500.0..500.0f64, by in -500.0..500.0f64,
            aw in 1.0..200.0f64, ah in 1.0..200.0f64,
            bw in 1.0..200.0f64, bh in 1.0..200.0f64,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }
    }
}
