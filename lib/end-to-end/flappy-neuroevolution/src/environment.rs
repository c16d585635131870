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

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use flappy_logic::Rng;
use neuroevolution::{Candidate, Controller, Evaluation, FitnessEnvironment, Generation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ConfigError, EnvironmentConfig};
use crate::episode::{Episode, EpisodeState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    /// Every bird was removed.
    Terminated,

    /// The stop flag was raised.
    Aborted,

    /// `max_ticks` was reached with birds still alive.
    TickLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub generation: Generation,
    pub ticks: u64,
    pub score: u32,
    pub survivors: usize,
    pub outcome: EpisodeOutcome,
}

/// Sleeps between ticks so the simulation runs no faster than a fixed rate.
#[derive(Debug)]
struct Throttle {
    interval: Duration,
    next: Instant,
}

impl Throttle {
    fn new(ticks_per_second: u32) -> Self {
        let interval = Duration::from_secs(1) / ticks_per_second.max(1);
        Self {
            interval,
            next: Instant::now() + interval,
        }
    }

    fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next {
            std::thread::sleep(self.next - now);
        }
        self.next = Instant::now() + self.interval;
    }
}

/// Runs one episode per generation. Every candidate starts the episode at zero fitness.
pub struct FlappyEnvironment {
    config: EnvironmentConfig,
    rng: Rng,
    stop: Arc<AtomicBool>,
    last_report: Option<EpisodeReport>,
}

impl FlappyEnvironment {
    pub fn new(config: EnvironmentConfig, rng: Rng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            stop: Arc::new(AtomicBool::new(false)),
            last_report: None,
        })
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Setting the returned flag makes the running episode stop before its next tick, and
    /// every later episode stop before its first.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn last_report(&self) -> Option<&EpisodeReport> {
        self.last_report.as_ref()
    }

    pub fn run_episode<C: Controller>(
        &mut self,
        generation: Generation,
        candidates: &mut [Candidate<C>],
    ) -> EpisodeReport {
        for candidate in candidates.iter_mut() {
            candidate.fitness = 0.0;
        }
        let mut episode = Episode::new(&self.config, generation, candidates.len(), &mut self.rng);
        let mut throttle = self.config.ticks_per_second.map(Throttle::new);

        let outcome = loop {
            if self.stop.load(Ordering::Relaxed) {
                break EpisodeOutcome::Aborted;
            }
            if self
                .config
                .max_ticks
                .is_some_and(|max_ticks| episode.tick() >= max_ticks)
            {
                break EpisodeOutcome::TickLimit;
            }
            if let Some(throttle) = throttle.as_mut() {
                throttle.wait();
            }
            if episode.step(candidates, &mut self.rng) == EpisodeState::Terminated {
                break EpisodeOutcome::Terminated;
            }
        };

        let report = EpisodeReport {
            generation,
            ticks: episode.tick(),
            score: episode.score(),
            survivors: episode.alive(),
            outcome,
        };
        info!(
            generation,
            ticks = report.ticks,
            score = report.score,
            survivors = report.survivors,
            outcome = ?report.outcome,
            "episode finished"
        );
        self.last_report = Some(report.clone());
        report
    }
}

impl<C: Controller> FitnessEnvironment<C> for FlappyEnvironment {
    type Error = Infallible;

    fn evaluate(
        &mut self,
        generation: Generation,
        candidates: &mut [Candidate<C>],
    ) -> Result<Evaluation, Infallible> {
        let report = self.run_episode(generation, candidates);
        Ok(match report.outcome {
            EpisodeOutcome::Aborted => Evaluation::Aborted,
            EpisodeOutcome::Terminated | EpisodeOutcome::TickLimit => Evaluation::Completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use flappy_logic::Float;
    use neuroevolution::{
        FeedForwardNetwork, Population, PopulationConfig, RandomSearch, RunOutcome, Topology,
    };
    use rand::SeedableRng;

    use super::*;

    #[derive(Debug, Clone)]
    struct Constant(Float);

    impl Controller for Constant {
        fn activate(&mut self, _inputs: &[Float]) -> Vec<Float> {
            vec![self.0]
        }
    }

    fn environment(config: EnvironmentConfig) -> FlappyEnvironment {
        FlappyEnvironment::new(config, Rng::seed_from_u64(42)).expect("valid config")
    }

    #[test]
    fn test_episode_runs_until_every_bird_is_gone() {
        let mut env = environment(EnvironmentConfig::default());
        let mut candidates = vec![
            Candidate::new(1, Constant(0.0)),
            Candidate::new(2, Constant(1.0)),
        ];

        let evaluation = env.evaluate(3, &mut candidates);

        assert_eq!(evaluation, Ok(Evaluation::Completed));
        let report = env.last_report().expect("episode ran");
        assert_eq!(
            report,
            &EpisodeReport {
                generation: 3,
                ticks: 33,
                score: 0,
                survivors: 0,
                outcome: EpisodeOutcome::Terminated,
            }
        );
        assert_abs_diff_eq!(candidates[0].fitness, 2.3, epsilon = 1e-9);
        assert_abs_diff_eq!(candidates[1].fitness, 3.3, epsilon = 1e-9);
    }

    #[test]
    fn test_fitness_is_reset_before_the_episode() {
        let mut env = environment(EnvironmentConfig::default());
        let mut candidates = vec![Candidate::new(1, Constant(0.0))];
        candidates[0].fitness = 1000.0;

        env.run_episode(1, &mut candidates);

        assert_abs_diff_eq!(candidates[0].fitness, 2.3, epsilon = 1e-9);
    }

    #[test]
    fn test_stop_flag_aborts_before_the_first_tick() {
        let mut env = environment(EnvironmentConfig::default());
        env.stop_handle().store(true, Ordering::Relaxed);
        let mut candidates = vec![Candidate::new(1, Constant(0.0))];

        let evaluation = env.evaluate(1, &mut candidates);

        assert_eq!(evaluation, Ok(Evaluation::Aborted));
        let report = env.last_report().expect("episode ran");
        assert_eq!(report.ticks, 0);
        assert_eq!(report.survivors, 1);
        assert_eq!(report.outcome, EpisodeOutcome::Aborted);
        assert_eq!(candidates[0].fitness, 0.0);
    }

    #[test]
    fn test_tick_limit_ends_the_episode() {
        let config = EnvironmentConfig {
            max_ticks: Some(10),
            ..EnvironmentConfig::default()
        };
        let mut env = environment(config);
        let mut candidates = vec![Candidate::new(1, Constant(0.0))];

        let evaluation = env.evaluate(1, &mut candidates);

        assert_eq!(evaluation, Ok(Evaluation::Completed));
        let report = env.last_report().expect("episode ran");
        assert_eq!(report.ticks, 10);
        assert_eq!(report.survivors, 1);
        assert_eq!(report.outcome, EpisodeOutcome::TickLimit);
        assert_abs_diff_eq!(candidates[0].fitness, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_throttle_slows_the_episode_down() {
        let config = EnvironmentConfig {
            max_ticks: Some(5),
            ticks_per_second: Some(100),
            ..EnvironmentConfig::default()
        };
        let mut env = environment(config);
        let mut candidates = vec![Candidate::new(1, Constant(0.0))];

        let start = Instant::now();
        env.run_episode(1, &mut candidates);

        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_throttle_holds_back_the_first_tick() {
        let config = EnvironmentConfig {
            max_ticks: Some(1),
            ticks_per_second: Some(20),
            ..EnvironmentConfig::default()
        };
        let mut env = environment(config);
        let mut candidates = vec![Candidate::new(1, Constant(0.0))];

        let start = Instant::now();
        let report = env.run_episode(1, &mut candidates);

        assert_eq!(report.ticks, 1);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EnvironmentConfig {
            max_ticks: Some(0),
            ..EnvironmentConfig::default()
        };
        assert!(matches!(
            FlappyEnvironment::new(config, Rng::seed_from_u64(1)),
            Err(ConfigError::NonPositive("max_ticks"))
        ));
    }

    #[test]
    fn test_random_search_runs_end_to_end() {
        let config = EnvironmentConfig {
            max_ticks: Some(500),
            ..EnvironmentConfig::default()
        };
        let mut env = environment(config);
        let strategy = RandomSearch::new(Topology::default()).expect("valid topology");
        let population_config = PopulationConfig {
            population_size: 10,
            generations: 3,
            fitness_threshold: 1_000.0,
            ..PopulationConfig::default()
        };
        let mut population = Population::new(strategy, population_config, Rng::seed_from_u64(7));

        let summary = population.run(&mut env).expect("infallible environment");

        assert_eq!(summary.outcome, RunOutcome::GenerationLimit);
        assert_eq!(summary.generations, 3);
        let best: &Candidate<FeedForwardNetwork> = summary.best.as_ref().expect("best candidate");
        assert!(best.fitness > 0.0);
        assert_eq!(env.last_report().map(|report| report.generation), Some(3));
    }
}
