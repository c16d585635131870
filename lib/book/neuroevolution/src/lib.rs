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

//! Neuroevolution harness.
//!
//! A Controller maps an observation to an action signal. It does not know which
//! environment it is in, only that it gets N reals and must return M reals.
//!
//! A FitnessEnvironment runs a whole population of controllers and writes a
//! fitness value into each Candidate.
//!
//! A Population ties the two together across generations. How the next
//! generation is produced is up to a Strategy. This crate ships RandomSearch, a
//! baseline that samples a fresh population every generation. Selection,
//! crossover, mutation and speciation belong to whatever strategy is plugged in.

use serde::{Deserialize, Serialize};

pub mod network;
pub mod population;
pub mod random_search;
pub mod reporting;

pub use network::{Activation, FeedForwardNetwork, NetworkError, Topology};
pub use population::{
    FitnessCriterion, Population, PopulationConfig, PopulationError, RunOutcome, RunSummary,
    Strategy,
};
pub use random_search::RandomSearch;
pub use reporting::{GenerationStats, LogReporter, ReportError, Reporter, StatisticsReporter};

pub type Float = f64;
pub type Rng = rand_pcg::Pcg64;

/// Identifies a candidate across generations.
pub type CandidateId = u64;

/// Generation number. The first generation is 1.
pub type Generation = u32;

/// Anything that turns an observation into an action signal.
pub trait Controller {
    fn activate(&mut self, inputs: &[Float]) -> Vec<Float>;
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn activate(&mut self, inputs: &[Float]) -> Vec<Float> {
        (**self).activate(inputs)
    }
}

/// A controller being evaluated, and the fitness the environment gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<C> {
    pub id: CandidateId,
    pub controller: C,
    pub fitness: Float,
}

impl<C> Candidate<C> {
    pub fn new(id: CandidateId, controller: C) -> Self {
        Self {
            id,
            controller,
            fitness: 0.0,
        }
    }
}

/// How an evaluation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Evaluation {
    /// Every candidate has a final fitness.
    Completed,

    /// The evaluation was asked to stop early. Fitness values are partial.
    Aborted,
}

/// Environment that assigns fitness to a population of controllers.
pub trait FitnessEnvironment<C: Controller> {
    type Error: std::error::Error + 'static;

    /// Evaluate every candidate and store its fitness in `Candidate::fitness`.
    fn evaluate(
        &mut self,
        generation: Generation,
        candidates: &mut [Candidate<C>],
    ) -> Result<Evaluation, Self::Error>;
}
