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

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Candidate, CandidateId, Float, Generation};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to serialize statistics")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write statistics")]
    Io(#[from] std::io::Error),
}

/// Fitness summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: Generation,
    pub population_size: usize,
    pub best_id: CandidateId,
    pub best: Float,
    pub worst: Float,
    pub mean: Float,
    pub stdev: Float,
}

impl GenerationStats {
    /// Returns `None` for an empty population.
    pub fn from_candidates<C>(
        generation: Generation,
        candidates: &[Candidate<C>],
    ) -> Option<Self> {
        let best = candidates
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))?;
        let worst = candidates
            .iter()
            .map(|c| c.fitness)
            .min_by(|a, b| a.total_cmp(b))?;

        let n = candidates.len() as Float;
        let mean = candidates.iter().map(|c| c.fitness).sum::<Float>() / n;
        let variance = candidates
            .iter()
            .map(|c| (c.fitness - mean).powi(2))
            .sum::<Float>()
            / n;

        Some(Self {
            generation,
            population_size: candidates.len(),
            best_id: best.id,
            best: best.fitness,
            worst,
            mean,
            stdev: variance.sqrt(),
        })
    }
}

/// Hooks called by `Population::run`.
pub trait Reporter {
    fn start_generation(&mut self, _generation: Generation) {}

    fn post_evaluate(&mut self, _stats: &GenerationStats) {}

    fn found_solution(&mut self, _generation: Generation, _best_id: CandidateId, _fitness: Float) {}

    fn aborted(&mut self, _generation: Generation) {}
}

// Lets the caller keep a handle on a reporter after handing it to a population.
impl<R: Reporter> Reporter for Rc<RefCell<R>> {
    fn start_generation(&mut self, generation: Generation) {
        self.borrow_mut().start_generation(generation);
    }

    fn post_evaluate(&mut self, stats: &GenerationStats) {
        self.borrow_mut().post_evaluate(stats);
    }

    fn found_solution(&mut self, generation: Generation, best_id: CandidateId, fitness: Float) {
        self.borrow_mut().found_solution(generation, best_id, fitness);
    }

    fn aborted(&mut self, generation: Generation) {
        self.borrow_mut().aborted(generation);
    }
}

/// Logs progress through `tracing`.
#[derive(Debug, Default)]
pub struct LogReporter {
    generation_start: Option<Instant>,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for LogReporter {
    fn start_generation(&mut self, generation: Generation) {
        info!(generation, "running generation");
        self.generation_start = Some(Instant::now());
    }

    fn post_evaluate(&mut self, stats: &GenerationStats) {
        let elapsed_ms = self
            .generation_start
            .take()
            .map_or(0, |start| start.elapsed().as_millis() as u64);
        info!(
            generation = stats.generation,
            population = stats.population_size,
            best = stats.best,
            best_id = stats.best_id,
            mean = stats.mean,
            stdev = stats.stdev,
            elapsed_ms,
            "population fitness"
        );
    }

    fn found_solution(&mut self, generation: Generation, best_id: CandidateId, fitness: Float) {
        info!(generation, best_id, fitness, "fitness threshold reached");
    }

    fn aborted(&mut self, generation: Generation) {
        warn!(generation, "evaluation aborted");
    }
}

/// Keeps every generation's statistics.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StatisticsReporter {
    generations: Vec<GenerationStats>,
}

impl StatisticsReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generations(&self) -> &[GenerationStats] {
        &self.generations
    }

    pub fn best_fitnesses(&self) -> Vec<Float> {
        self.generations.iter().map(|s| s.best).collect()
    }

    pub fn mean_fitnesses(&self) -> Vec<Float> {
        self.generations.iter().map(|s| s.mean).collect()
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(&self.generations)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Reporter for StatisticsReporter {
    fn post_evaluate(&mut self, stats: &GenerationStats) {
        self.generations.push(stats.clone());
    }
}
