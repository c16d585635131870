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

use std::path::{Path, PathBuf};

use flappy_logic::{Float, GameConfig};
use neuroevolution::{NetworkError, PopulationConfig, Topology};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),

    #[error("invalid game config")]
    Game(#[from] flappy_logic::ConfigError),

    #[error("invalid network topology")]
    Topology(#[from] NetworkError),

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("networks must take {expected} inputs and give at least one output, got {inputs} -> {outputs}")]
    ObservationMismatch {
        expected: usize,
        inputs: usize,
        outputs: usize,
    },

    #[error("{field} must be within [0, 1], got {value}")]
    NotAProbability { field: &'static str, value: Float },
}

/// Fitness shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Added to every live bird every tick.
    pub survival: Float,

    /// Subtracted once from a bird that hits a pipe.
    pub collision_penalty: Float,

    /// Added to every live bird when the flock passes a pipe. Deliberately not scaled by
    /// how many pipes a bird has passed.
    pub pass_bonus: Float,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            survival: 0.1,
            collision_penalty: 1.0,
            pass_bonus: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub game: GameConfig,
    pub rewards: RewardConfig,

    /// A bird jumps when its controller's first output is strictly above this.
    pub jump_threshold: Float,

    /// End the episode after this many ticks even if birds are still alive.
    pub max_ticks: Option<u64>,

    /// Slow the simulation down to at most this many ticks per second. `None` runs flat out.
    pub ticks_per_second: Option<u32>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            rewards: RewardConfig::default(),
            jump_threshold: 0.5,
            max_ticks: Some(20_000),
            ticks_per_second: None,
        }
    }
}

impl EnvironmentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;
        if self.max_ticks == Some(0) {
            return Err(ConfigError::NonPositive("max_ticks"));
        }
        if self.ticks_per_second == Some(0) {
            return Err(ConfigError::NonPositive("ticks_per_second"));
        }
        Ok(())
    }
}

/// How each generation is bred from the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// NEAT genomes bred by elimination, crossover and mutation.
    Neat,

    /// A fresh `topology`-shaped population every generation. Useful as a baseline.
    RandomSearch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub kind: StrategyKind,

    /// Chance that a NEAT child is mutated after crossover.
    pub mutation_rate: Float,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            kind: StrategyKind::Neat,
            mutation_rate: 0.25,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::NotAProbability {
                field: "strategy.mutation_rate",
                value: self.mutation_rate,
            });
        }
        Ok(())
    }
}

/// Everything the binary needs for a run, as read from a JSON file. Missing keys fall
/// back to their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub environment: EnvironmentConfig,
    pub population: PopulationConfig,
    pub strategy: StrategyConfig,

    /// Shape of the random search networks. NEAT grows its own.
    pub topology: Topology,
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            environment: EnvironmentConfig::default(),
            population: PopulationConfig::default(),
            strategy: StrategyConfig::default(),
            topology: Topology::default(),
            seed: 42,
        }
    }
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.environment.validate()?;
        self.strategy.validate()?;
        self.topology.validate()?;
        if self.topology.inputs != crate::OBSERVATION_SIZE || self.topology.outputs == 0 {
            return Err(ConfigError::ObservationMismatch {
                expected: crate::OBSERVATION_SIZE,
                inputs: self.topology.inputs,
                outputs: self.topology.outputs,
            });
        }
        if self.population.population_size == 0 {
            return Err(ConfigError::NonPositive("population.population_size"));
        }
        if self.population.generations == 0 {
            return Err(ConfigError::NonPositive("population.generations"));
        }
        Ok(())
    }
}
