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

use neat::*;
use neuroevolution::{Controller, Float};
use rand::rngs::StdRng;

/// Observation size the networks are built for.
pub const INPUTS: usize = 3;

/// Outputs per activation. Only the first drives the jump decision.
pub const OUTPUTS: usize = 1;

#[derive(Clone, Debug, PartialEq, GenerateRandom, RandomlyMutable, Crossover)]
#[randmut(create_context = GenomeCtx)]
#[crossover(with_context = GenomeCtx)]
struct Genome {
    brain: NeuralNetwork<INPUTS, OUTPUTS>,
}

/// A NEAT network used as a controller.
#[derive(Clone, Debug, PartialEq)]
pub struct NeatBrain {
    genome: Genome,
}

impl NeatBrain {
    pub(crate) fn random(rng: &mut StdRng) -> Self {
        Self {
            genome: Genome::gen_random(rng),
        }
    }

    /// Eliminate the less fit half of `scored` and breed the survivors back up to the
    /// same count.
    pub(crate) fn evolve(scored: Vec<(NeatBrain, f32)>, mutation_rate: f32) -> Vec<NeatBrain> {
        let genomes: Vec<Genome> = scored
            .iter()
            .map(|(brain, _)| brain.genome.clone())
            .collect();
        let fitness: Vec<(Genome, f32)> = scored
            .into_iter()
            .map(|(brain, fitness)| (brain.genome, fitness))
            .collect();

        let mut sim = GeneticSim::new(
            genomes,
            FitnessEliminator::new_with_default(move |genome: &Genome| {
                recorded_fitness(&fitness, genome)
            }),
            CrossoverRepopulator::new(mutation_rate, GenomeCtx::default()),
        );
        sim.next_generation();

        std::mem::take(&mut sim.genomes)
            .into_iter()
            .map(|genome| NeatBrain { genome })
            .collect()
    }
}

// Fitness comes from a shared episode, so it is looked up rather than recomputed per genome.
fn recorded_fitness(table: &[(Genome, f32)], genome: &Genome) -> f32 {
    table
        .iter()
        .find(|(known, _)| known == genome)
        .map_or(f32::MIN, |&(_, fitness)| fitness)
}

impl Controller for NeatBrain {
    fn activate(&mut self, inputs: &[Float]) -> Vec<Float> {
        let mut buffer = [0.0f32; INPUTS];
        for (slot, &value) in buffer.iter_mut().zip(inputs) {
            *slot = value as f32;
        }
        self.genome
            .brain
            .predict(buffer)
            .iter()
            .map(|&value| Float::from(value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn brains(count: usize, seed: u64) -> Vec<NeatBrain> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count).map(|_| NeatBrain::random(&mut rng)).collect()
    }

    #[test]
    fn test_activation_gives_one_finite_output() {
        let mut brain = brains(1, 1).remove(0);
        let outputs = brain.activate(&[350.0, 790.0, 50.0]);
        assert_eq!(outputs.len(), OUTPUTS);
        assert!(outputs[0].is_finite());
    }

    #[test]
    fn test_short_input_is_zero_padded() {
        let mut brain = brains(1, 2).remove(0);
        let padded = brain.activate(&[1.0, 0.0, 0.0]);
        let short = brain.activate(&[1.0]);
        assert_eq!(padded, short);
    }

    #[test]
    fn test_fittest_survive_and_least_fit_are_dropped() {
        let population = brains(8, 3);
        let scored: Vec<(NeatBrain, f32)> = population
            .iter()
            .cloned()
            .zip([0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])
            .collect();

        let next = NeatBrain::evolve(scored, 0.25);

        assert_eq!(next.len(), population.len());
        assert!(next.contains(&population[7]));
        assert!(!next.contains(&population[0]));
    }

    #[test]
    fn test_selection_follows_fitness() {
        let population = brains(8, 4);
        let ascending: Vec<(NeatBrain, f32)> = population
            .iter()
            .cloned()
            .zip([0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])
            .collect();
        let descending: Vec<(NeatBrain, f32)> = population
            .iter()
            .cloned()
            .zip([7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0])
            .collect();

        let up = NeatBrain::evolve(ascending, 0.25);
        let down = NeatBrain::evolve(descending, 0.25);

        assert!(up.contains(&population[7]) && !up.contains(&population[0]));
        assert!(down.contains(&population[0]) && !down.contains(&population[7]));
    }
}
