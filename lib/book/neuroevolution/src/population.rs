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

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reporting::{GenerationStats, Reporter};
use crate::{Candidate, Controller, Evaluation, FitnessEnvironment, Float, Generation, Rng};

#[derive(Debug, thiserror::Error)]
pub enum PopulationError<E: std::error::Error + 'static> {
    #[error("the strategy produced an empty initial population")]
    EmptyPopulation,

    #[error("every candidate went extinct after generation {0}")]
    CompleteExtinction(Generation),

    #[error("fitness environment failed")]
    Environment(#[source] E),
}

/// Which statistic of a generation is compared against the fitness threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessCriterion {
    Max,
    Min,
    Mean,
}

impl FitnessCriterion {
    pub fn value(self, stats: &GenerationStats) -> Float {
        match self {
            FitnessCriterion::Max => stats.best,
            FitnessCriterion::Min => stats.worst,
            FitnessCriterion::Mean => stats.mean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub population_size: usize,
    pub generations: Generation,
    pub fitness_criterion: FitnessCriterion,
    pub fitness_threshold: Float,

    /// Start over from a fresh initial population if the strategy returns nobody.
    pub reset_on_extinction: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 50,
            fitness_criterion: FitnessCriterion::Max,
            fitness_threshold: 100.0,
            reset_on_extinction: false,
        }
    }
}

/// Produces populations. Everything about how the next population relates to the last
/// one (selection, crossover, mutation, speciation) lives behind this trait.
pub trait Strategy {
    type Controller: Controller;

    /// `size` is `PopulationConfig::population_size`.
    fn initial_population(
        &mut self,
        size: usize,
        rng: &mut Rng,
    ) -> Vec<Candidate<Self::Controller>>;

    /// `evaluated` carries the fitness assigned in the generation that just ran.
    fn next_population(
        &mut self,
        evaluated: &[Candidate<Self::Controller>],
        size: usize,
        rng: &mut Rng,
    ) -> Vec<Candidate<Self::Controller>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The fitness criterion reached the threshold.
    Solved,

    /// Every configured generation ran without reaching the threshold.
    GenerationLimit,

    /// The environment stopped early.
    Aborted,
}

#[derive(Debug, Clone)]
pub struct RunSummary<C> {
    pub outcome: RunOutcome,

    /// Generations that finished evaluation.
    pub generations: Generation,

    /// Fittest candidate seen in any finished generation.
    pub best: Option<Candidate<C>>,
}

pub struct Population<S: Strategy> {
    strategy: S,
    config: PopulationConfig,
    candidates: Vec<Candidate<S::Controller>>,
    generation: Generation,
    best: Option<Candidate<S::Controller>>,
    reporters: Vec<Box<dyn Reporter>>,
    rng: Rng,
}

impl<S> Population<S>
where
    S: Strategy,
    S::Controller: Clone,
{
    pub fn new(mut strategy: S, config: PopulationConfig, mut rng: Rng) -> Self {
        let candidates = strategy.initial_population(config.population_size, &mut rng);
        Self {
            strategy,
            config,
            candidates,
            generation: 0,
            best: None,
            reporters: Vec::new(),
            rng,
        }
    }

    pub fn add_reporter(&mut self, reporter: Box<dyn Reporter>) {
        self.reporters.push(reporter);
    }

    pub fn candidates(&self) -> &[Candidate<S::Controller>] {
        &self.candidates
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn best(&self) -> Option<&Candidate<S::Controller>> {
        self.best.as_ref()
    }

    /// Evaluate up to `config.generations` generations, stopping early once the fitness
    /// criterion reaches the threshold or the environment aborts.
    pub fn run<E>(
        &mut self,
        environment: &mut E,
    ) -> Result<RunSummary<S::Controller>, PopulationError<E::Error>>
    where
        E: FitnessEnvironment<S::Controller>,
    {
        if self.candidates.is_empty() {
            return Err(PopulationError::EmptyPopulation);
        }

        let mut outcome = RunOutcome::GenerationLimit;
        for _ in 0..self.config.generations {
            let generation = self.generation + 1;
            for reporter in &mut self.reporters {
                reporter.start_generation(generation);
            }

            let evaluation = environment
                .evaluate(generation, &mut self.candidates)
                .map_err(PopulationError::Environment)?;
            if evaluation == Evaluation::Aborted {
                for reporter in &mut self.reporters {
                    reporter.aborted(generation);
                }
                outcome = RunOutcome::Aborted;
                break;
            }
            self.generation = generation;

            let Some(stats) = GenerationStats::from_candidates(generation, &self.candidates) else {
                return Err(PopulationError::CompleteExtinction(generation));
            };
            self.track_best();
            for reporter in &mut self.reporters {
                reporter.post_evaluate(&stats);
            }

            if self.config.fitness_criterion.value(&stats) >= self.config.fitness_threshold {
                for reporter in &mut self.reporters {
                    reporter.found_solution(generation, stats.best_id, stats.best);
                }
                outcome = RunOutcome::Solved;
                break;
            }

            let next = self.strategy.next_population(
                &self.candidates,
                self.config.population_size,
                &mut self.rng,
            );
            self.candidates = if !next.is_empty() {
                next
            } else if self.config.reset_on_extinction {
                debug!(generation, "population went extinct, starting over");
                self.strategy
                    .initial_population(self.config.population_size, &mut self.rng)
            } else {
                return Err(PopulationError::CompleteExtinction(generation));
            };
        }

        Ok(RunSummary {
            outcome,
            generations: self.generation,
            best: self.best.clone(),
        })
    }

    fn track_best(&mut self) {
        let Some(leader) = self
            .candidates
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        else {
            return;
        };
        let improved = match &self.best {
            Some(best) => leader.fitness > best.fitness,
            None => true,
        };
        if improved {
            self.best = Some(leader.clone());
        }
    }
}
