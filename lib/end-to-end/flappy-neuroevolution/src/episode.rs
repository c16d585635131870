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

use flappy_logic::{Base, Bird, Float, GameConfig, Pipe, Rng};
use neuroevolution::{Candidate, Controller, Generation};
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::config::{EnvironmentConfig, RewardConfig};

/// Number of values `observe` hands to a controller.
pub const OBSERVATION_SIZE: usize = 3;

new_key_type! {
    /// Stable handle to a live agent. Stays valid while other agents are removed.
    pub struct AgentKey;
}

/// A live bird and the index of the candidate flying it.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Position and motion.
    pub bird: Bird,

    /// Index into the candidate slice handed to `Episode::step`.
    pub candidate: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeState {
    /// At least one bird is alive.
    Running,

    /// Every bird is gone. Further steps do nothing.
    Terminated,
}

/// What a controller sees: its height, and its distance to the top and bottom extents
/// of the pipe it is heading for.
pub fn observe(bird: &Bird, pipe: &Pipe) -> [Float; OBSERVATION_SIZE] {
    [
        bird.y,
        (bird.y - pipe.gap_top).abs(),
        (bird.y - pipe.gap_bottom).abs(),
    ]
}

/// One generation's shared world.
///
/// Agents live in a slot map so that removing one never disturbs iteration over the
/// rest. Removals found while scanning pipes are collected first and applied after.
#[derive(Debug, Clone)]
pub struct Episode {
    game: GameConfig,
    rewards: RewardConfig,
    jump_threshold: Float,
    generation: Generation,
    agents: SlotMap<AgentKey, Agent>,
    pipes: Vec<Pipe>,
    base: Base,
    score: u32,
    tick: u64,
    state: EpisodeState,
}

impl Episode {
    /// One bird per candidate index in `0..population`, all at the start position, and a
    /// single pipe at the spawn position.
    pub fn new(
        config: &EnvironmentConfig,
        generation: Generation,
        population: usize,
        rng: &mut Rng,
    ) -> Self {
        let game = config.game.clone();
        let mut agents = SlotMap::with_capacity_and_key(population);
        for candidate in 0..population {
            agents.insert(Agent {
                bird: Bird::at_start(&game.bird),
                candidate,
            });
        }
        let pipes = vec![Pipe::new(game.pipe.spawn_x, &game.pipe, rng)];
        let base = Base::new(&game.base);
        Self {
            rewards: config.rewards.clone(),
            jump_threshold: config.jump_threshold,
            generation,
            agents,
            pipes,
            base,
            score: 0,
            tick: 0,
            state: EpisodeState::Running,
            game,
        }
    }

    /// Generation this episode evaluates.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Pipes passed so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Ticks simulated so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether any bird is still flying.
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// Number of live birds.
    pub fn alive(&self) -> usize {
        self.agents.len()
    }

    /// Live birds in insertion order.
    pub fn agents(&self) -> impl Iterator<Item = (AgentKey, &Agent)> {
        self.agents.iter()
    }

    #[cfg(test)]
    fn agent_mut(&mut self, key: AgentKey) -> Option<&mut Agent> {
        self.agents.get_mut(key)
    }

    /// Pipes on screen, oldest first.
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    #[cfg(test)]
    fn pipes_mut(&mut self) -> &mut Vec<Pipe> {
        &mut self.pipes
    }

    /// The scrolling ground.
    pub fn base(&self) -> &Base {
        &self.base
    }

    /// Index of the pipe agents should steer by: the first one whose right edge the lead
    /// agent has not yet flown past, or the last one if it is past all of them.
    pub fn active_pipe(&self) -> usize {
        let last = self.pipes.len().saturating_sub(1);
        let Some(lead) = self.agents.values().next() else {
            return last;
        };
        self.pipes
            .iter()
            .position(|pipe| lead.bird.x <= pipe.right())
            .unwrap_or(last)
    }

    /// Advance the world by one tick and credit fitness to `candidates`.
    ///
    /// # Panics
    ///
    /// If `candidates` is shorter than the population the episode was created with.
    pub fn step<C: Controller>(
        &mut self,
        candidates: &mut [Candidate<C>],
        rng: &mut Rng,
    ) -> EpisodeState {
        if self.state == EpisodeState::Terminated {
            return self.state;
        }
        if self.agents.is_empty() {
            self.state = EpisodeState::Terminated;
            return self.state;
        }
        if self.pipes.is_empty() {
            self.pipes
                .push(Pipe::new(self.game.pipe.spawn_x, &self.game.pipe, rng));
        }
        self.tick += 1;

        let target = self.active_pipe();
        self.decide(candidates, target);
        self.base.advance();

        let (passed, off_screen) = self.resolve_pipes(candidates);
        if passed {
            self.reward_pass(candidates, rng);
        }
        if !off_screen.is_empty() {
            let mut index = 0;
            self.pipes.retain(|_| {
                let keep = !off_screen.contains(&index);
                index += 1;
                keep
            });
        }
        self.remove_out_of_bounds();

        if self.agents.is_empty() {
            debug!(
                generation = self.generation,
                tick = self.tick,
                score = self.score,
                "all birds gone"
            );
            self.state = EpisodeState::Terminated;
        }
        self.state
    }

    fn decide<C: Controller>(&mut self, candidates: &mut [Candidate<C>], target: usize) {
        let pipe = &self.pipes[target];
        for agent in self.agents.values_mut() {
            agent.bird.advance(&self.game.bird);
            let candidate = &mut candidates[agent.candidate];
            candidate.fitness += self.rewards.survival;

            let output = candidate.controller.activate(&observe(&agent.bird, pipe));
            if output
                .first()
                .is_some_and(|&signal| signal > self.jump_threshold)
            {
                agent.bird.jump(&self.game.bird);
            }
        }
    }

    /// Scan every pipe against every live agent. Returns whether any pipe was passed
    /// this tick and the indices of pipes that were off screen before they moved.
    fn resolve_pipes<C>(&mut self, candidates: &mut [Candidate<C>]) -> (bool, Vec<usize>) {
        let mut collided: FxHashSet<AgentKey> = FxHashSet::default();
        let mut passed = false;
        let mut off_screen = Vec::new();

        for (index, pipe) in self.pipes.iter_mut().enumerate() {
            for (key, agent) in &self.agents {
                if collided.contains(&key) {
                    continue;
                }
                if pipe.collides_with(&agent.bird, &self.game.bird) {
                    candidates[agent.candidate].fitness -= self.rewards.collision_penalty;
                    collided.insert(key);
                    continue;
                }
                if !pipe.passed && pipe.x < agent.bird.x {
                    pipe.passed = true;
                    passed = true;
                }
            }
            if pipe.is_off_screen() {
                off_screen.push(index);
            }
            pipe.advance();
        }

        for key in collided {
            if let Some(agent) = self.agents.remove(key) {
                trace!(
                    generation = self.generation,
                    tick = self.tick,
                    candidate = agent.candidate,
                    "bird hit a pipe"
                );
            }
        }
        (passed, off_screen)
    }

    fn reward_pass<C>(&mut self, candidates: &mut [Candidate<C>], rng: &mut Rng) {
        self.score += 1;
        for agent in self.agents.values() {
            candidates[agent.candidate].fitness += self.rewards.pass_bonus;
        }
        self.pipes
            .push(Pipe::new(self.game.pipe.spawn_x, &self.game.pipe, rng));
        debug!(
            generation = self.generation,
            tick = self.tick,
            score = self.score,
            alive = self.agents.len(),
            "pipe passed"
        );
    }

    fn remove_out_of_bounds(&mut self) {
        let ground = self.game.base.y;
        let bird_config = &self.game.bird;
        let gone: Vec<AgentKey> = self
            .agents
            .iter()
            .filter(|(_, agent)| agent.bird.is_out_of_bounds(bird_config, ground))
            .map(|(key, _)| key)
            .collect();
        for key in gone {
            if let Some(agent) = self.agents.remove(key) {
                trace!(
                    generation = self.generation,
                    tick = self.tick,
                    candidate = agent.candidate,
                    y = agent.bird.y,
                    "bird left the screen"
                );
            }
        }
    }
}
