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

//! Flappy Bird as a fitness environment.
//!
//! Every candidate controller flies its own bird, and all birds share one world:
//! the same pipes, the same ground, the same clock. A bird earns fitness for every
//! tick it stays alive and a larger bonus whenever the flock gets past a pipe. It
//! loses fitness when it hits a pipe. The episode is over when no bird is left.

pub mod config;
pub mod environment;
pub mod episode;

pub use config::{
    ConfigError, EnvironmentConfig, RewardConfig, RunConfig, StrategyConfig, StrategyKind,
};
pub use environment::{EpisodeOutcome, EpisodeReport, FlappyEnvironment};
pub use episode::{observe, Agent, AgentKey, Episode, EpisodeState, OBSERVATION_SIZE};

pub use flappy_logic::{Float, Rng};
