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

use neuroevolution::{Candidate, CandidateId, Rng, Strategy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::brain::NeatBrain;

/// Evolves `NeatBrain`s with fitness-proportional elimination and crossover.
///
/// `neat` draws from its own `rand` version, so the strategy keeps a separate seeded
/// generator for the genomes it creates and ignores the population's generator.
#[derive(Debug)]
pub struct NeatStrategy {
    mutation_rate: f32,
    rng: StdRng,
    next_id: CandidateId,
}

impl NeatStrategy {
    pub fn new(mutation_rate: f32, seed: u64) -> Self {
        Self {
            mutation_rate,
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
        }
    }

    fn label(&mut self, brains: Vec<NeatBrain>) -> Vec<Candidate<NeatBrain>> {
        brains
            .into_iter()
            .map(|brain| {
                let id = self.next_id;
                self.next_id += 1;
                Candidate::new(id, brain)
            })
            .collect()
    }
}

impl Strategy for NeatStrategy {
    type Controller = NeatBrain;

    fn initial_population(&mut self, size: usize, _rng: &mut Rng) -> Vec<Candidate<NeatBrain>> {
        let brains = (0..size).map(|_| NeatBrain::random(&mut self.rng)).collect();
        self.label(brains)
    }

    fn next_population(
        &mut self,
        evaluated: &[Candidate<NeatBrain>],
        size: usize,
        rng: &mut Rng,
    ) -> Vec<Candidate<NeatBrain>> {
        if evaluated.is_empty() {
            return self.initial_population(size, rng);
        }
        let scored = evaluated
            .iter()
            .map(|candidate| (candidate.controller.clone(), candidate.fitness as f32))
            .collect();
        let mut brains = NeatBrain::evolve(scored, self.mutation_rate);
        brains.truncate(size);
        let bred = brains.len();
        while brains.len() < size {
            brains.push(NeatBrain::random(&mut self.rng));
        }
        debug!(bred, fresh = size - bred, "next neat population");
        self.label(brains)
    }
}

#[cfg(test)]
mod tests {
    use neuroevolution::Float;

    use super::*;

    fn population_rng() -> Rng {
        <Rng as rand_08::SeedableRng>::seed_from_u64(0)
    }

    fn scored(population: Vec<Candidate<NeatBrain>>) -> Vec<Candidate<NeatBrain>> {
        population
            .into_iter()
            .enumerate()
            .map(|(rank, mut candidate)| {
                candidate.fitness = rank as Float;
                candidate
            })
            .collect()
    }

    #[test]
    fn test_initial_population_has_requested_size_and_unique_ids() {
        let mut strategy = NeatStrategy::new(0.25, 1);
        let population = strategy.initial_population(6, &mut population_rng());

        assert_eq!(population.len(), 6);
        let ids: Vec<CandidateId> = population.iter().map(|candidate| candidate.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert!(population.iter().all(|candidate| candidate.fitness == 0.0));
    }

    #[test]
    fn test_next_population_keeps_the_best_and_relabels() {
        let mut strategy = NeatStrategy::new(0.25, 2);
        let mut rng = population_rng();
        let evaluated = scored(strategy.initial_population(8, &mut rng));
        let best = evaluated[7].controller.clone();
        let worst = evaluated[0].controller.clone();

        let next = strategy.next_population(&evaluated, 8, &mut rng);

        assert_eq!(next.len(), 8);
        assert!(next.iter().all(|candidate| candidate.id > 8));
        assert!(next.iter().any(|candidate| candidate.controller == best));
        assert!(next.iter().all(|candidate| candidate.controller != worst));
    }

    #[test]
    fn test_next_population_follows_a_new_size() {
        let mut strategy = NeatStrategy::new(0.25, 3);
        let mut rng = population_rng();
        let evaluated = scored(strategy.initial_population(4, &mut rng));

        assert_eq!(strategy.next_population(&evaluated, 7, &mut rng).len(), 7);
        assert_eq!(strategy.next_population(&evaluated, 2, &mut rng).len(), 2);
    }

    #[test]
    fn test_empty_generation_starts_over() {
        let mut strategy = NeatStrategy::new(0.25, 4);
        let next = strategy.next_population(&[], 3, &mut population_rng());
        assert_eq!(next.len(), 3);
    }
}
