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

use crate::network::{FeedForwardNetwork, NetworkError, Topology};
use crate::population::Strategy;
use crate::{Candidate, CandidateId, Rng};

/// Samples a brand new population of random networks every generation. Nothing is
/// inherited, so the only memory across generations is the best candidate the
/// population keeps track of. Useful as a baseline to compare real strategies against.
#[derive(Debug, Clone)]
pub struct RandomSearch {
    topology: Topology,
    next_id: CandidateId,
}

impl RandomSearch {
    pub fn new(topology: Topology) -> Result<Self, NetworkError> {
        topology.validate()?;
        Ok(Self {
            topology,
            next_id: 1,
        })
    }

    fn sample(&mut self, size: usize, rng: &mut Rng) -> Vec<Candidate<FeedForwardNetwork>> {
        (0..size)
            .map(|_| {
                let id = self.next_id;
                self.next_id += 1;
                Candidate::new(id, FeedForwardNetwork::random(&self.topology, rng))
            })
            .collect()
    }
}

impl Strategy for RandomSearch {
    type Controller = FeedForwardNetwork;

    fn initial_population(
        &mut self,
        size: usize,
        rng: &mut Rng,
    ) -> Vec<Candidate<FeedForwardNetwork>> {
        self.sample(size, rng)
    }

    fn next_population(
        &mut self,
        _evaluated: &[Candidate<FeedForwardNetwork>],
        size: usize,
        rng: &mut Rng,
    ) -> Vec<Candidate<FeedForwardNetwork>> {
        self.sample(size, rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_populations_have_requested_size_and_fresh_ids() {
        let mut rng = Rng::seed_from_u64(7);
        let mut search = RandomSearch::new(Topology::default()).expect("valid topology");
        let first = search.initial_population(5, &mut rng);
        let second = search.next_population(&first, 5, &mut rng);

        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 5);
        let ids: Vec<CandidateId> = first.iter().chain(&second).map(|c| c.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert!(first.iter().chain(&second).all(|c| c.fitness == 0.0));
        assert_ne!(first[0].controller, second[0].controller);
    }

    #[test]
    fn test_same_seed_same_population() {
        let mut a = RandomSearch::new(Topology::default()).expect("valid topology");
        let mut b = RandomSearch::new(Topology::default()).expect("valid topology");
        let pa = a.initial_population(3, &mut Rng::seed_from_u64(99));
        let pb = b.initial_population(3, &mut Rng::seed_from_u64(99));
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_invalid_topology_is_rejected() {
        let topology = Topology {
            outputs: 0,
            ..Topology::default()
        };
        assert_eq!(
            RandomSearch::new(topology).map(|_| ()),
            Err(NetworkError::EmptyLayer(1))
        );
    }
}
