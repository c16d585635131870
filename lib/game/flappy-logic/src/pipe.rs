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

//! Pipes: a pair of vertical extents with a gap between them.
//!
//! ```text
//!  gap_top    ┌──┐
//!             │  │  top extent
//!  gap_center └──┘
//!                   gap
//!  gap_bottom ┌──┐
//!             │  │  bottom extent
//!             └──┘
//! ```

use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{Bird, BirdConfig, Float, PipeConfig, Rect, Rng};

/// A pipe scrolling left at constant speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    /// Left edge.
    pub x: Float,

    /// Bottom edge of the top extent, i.e. where the opening starts.
    pub gap_center: Float,

    /// Top edge of the top extent.
    pub gap_top: Float,

    /// Top edge of the bottom extent, i.e. where the opening ends.
    pub gap_bottom: Float,

    /// Set once a bird has gone past this pipe.
    pub passed: bool,

    width: Float,
    height: Float,
    velocity: Float,
}

impl Pipe {
    /// Create a pipe at `x` with a random gap.
    pub fn new(x: Float, config: &PipeConfig, rng: &mut Rng) -> Self {
        let mut pipe = Self::with_gap_center(x, config.gap_center_min, config);
        pipe.set_height(config, rng);
        pipe
    }

    /// Create a pipe at `x` with the gap at a known place.
    pub fn with_gap_center(x: Float, gap_center: Float, config: &PipeConfig) -> Self {
        Self {
            x,
            gap_center,
            gap_top: gap_center - config.height,
            gap_bottom: gap_center + config.gap,
            passed: false,
            width: config.width,
            height: config.height,
            velocity: config.velocity,
        }
    }

    /// Draw a new gap center and derive both extents from it.
    pub fn set_height(&mut self, config: &PipeConfig, rng: &mut Rng) {
        self.gap_center = rng.gen_range(config.gap_center_min..config.gap_center_max);
        self.gap_top = self.gap_center - config.height;
        self.gap_bottom = self.gap_center + config.gap;
    }

    /// Move one tick to the left.
    pub fn advance(&mut self) {
        self.x -= self.velocity;
    }

    /// Collision box of the top extent.
    pub fn top_bounds(&self) -> Rect {
        Rect::new(self.x, self.gap_top, self.width, self.height)
    }

    /// Collision box of the bottom extent.
    pub fn bottom_bounds(&self) -> Rect {
        Rect::new(self.x, self.gap_bottom, self.width, self.height)
    }

    /// Whether the bird's box overlaps either extent.
    pub fn collides_with(&self, bird: &Bird, config: &BirdConfig) -> bool {
        let bird = bird.bounds(config);
        bird.intersects(&self.top_bounds()) || bird.intersects(&self.bottom_bounds())
    }

    /// Whether the pipe has scrolled fully past the left edge of the screen.
    pub fn is_off_screen(&self) -> bool {
        self.x + self.width < 0.0
    }

    /// Right edge.
    pub fn right(&self) -> Float {
        self.x + self.width
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;

    use super::*;
    use crate::Rng;

    #[test]
    fn test_extents_derive_from_gap_center() {
        let config = PipeConfig::default();
        let pipe = Pipe::with_gap_center(700.0, 200.0, &config);
        assert_abs_diff_eq!(pipe.gap_top, 200.0 - 640.0);
        assert_abs_diff_eq!(pipe.gap_bottom, 400.0);
        assert!(!pipe.passed);
    }

    #[test]
    fn test_advance_moves_left_by_velocity() {
        let config = PipeConfig::default();
        let mut pipe = Pipe::with_gap_center(700.0, 200.0, &config);
        pipe.advance();
        pipe.advance();
        assert_abs_diff_eq!(pipe.x, 690.0);
    }

    #[test]
    fn test_off_screen_only_once_fully_past_left_edge() {
        let config = PipeConfig::default();
        assert!(!Pipe::with_gap_center(-104.0, 200.0, &config).is_off_screen());
        assert!(Pipe::with_gap_center(-104.5, 200.0, &config).is_off_screen());
    }

    #[test]
    fn test_bird_in_gap_does_not_collide() {
        let bird_config = BirdConfig::default();
        let pipe = Pipe::with_gap_center(200.0, 300.0, &PipeConfig::default());
        let bird = Bird::new(230.0, 350.0);
        assert!(!pipe.collides_with(&bird, &bird_config));
    }

    #[test]
    fn test_bird_hitting_top_extent_collides() {
        let bird_config = BirdConfig::default();
        let pipe = Pipe::with_gap_center(200.0, 380.0, &PipeConfig::default());
        let bird = Bird::new(230.0, 350.0);
        assert!(pipe.collides_with(&bird, &bird_config));
    }

    #[test]
    fn test_bird_hitting_bottom_extent_collides() {
        let bird_config = BirdConfig::default();
        let pipe = Pipe::with_gap_center(200.0, 120.0, &PipeConfig::default());
        let bird = Bird::new(230.0, 350.0);
        assert!(pipe.collides_with(&bird, &bird_config));
    }

    #[test]
    fn test_bird_beside_pipe_does_not_collide() {
        let bird_config = BirdConfig::default();
        // Same height as the top extent, but the bird's right edge is at 298.
        let pipe = Pipe::with_gap_center(298.0, 380.0, &PipeConfig::default());
        let bird = Bird::new(230.0, 350.0);
        assert!(!pipe.collides_with(&bird, &bird_config));
    }

    proptest! {
        #[test]
        fn test_random_gap_center_in_range(seed in any::<u64>()) {
            let config = PipeConfig::default();
            let mut rng = Rng::seed_from_u64(seed);
            let pipe = Pipe::new(700.0, &config, &mut rng);
            prop_assert!(pipe.gap_center >= config.gap_center_min);
            prop_assert!(pipe.gap_center < config.gap_center_max);
            prop_assert!((pipe.gap_top - (pipe.gap_center - config.height)).abs() < 1e-9);
            prop_assert!((pipe.gap_bottom - (pipe.gap_center + config.gap)).abs() < 1e-9);
        }
    }
}
