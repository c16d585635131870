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
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flappy_neuroevolution::{FlappyEnvironment, RunConfig, StrategyKind};
use neuroevolution::{LogReporter, Population, RandomSearch, StatisticsReporter, Strategy};
use neuroevolution_neat::NeatStrategy;
use rand::SeedableRng;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Neat,
    RandomSearch,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Neat => StrategyKind::Neat,
            StrategyArg::RandomSearch => StrategyKind::RandomSearch,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "flappy-evolve")]
#[command(version, about = "Evolve Flappy Bird controllers", long_about = None)]
struct Cli {
    /// JSON run config. Missing keys use their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override how generations are bred
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Override the number of generations
    #[arg(short, long)]
    generations: Option<u32>,

    /// Override the population size
    #[arg(short, long)]
    population: Option<usize>,

    /// Override the random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Cap the simulation at this many ticks per second
    #[arg(long)]
    fps: Option<u32>,

    /// Cap every episode at this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write per-generation statistics to this JSON file
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(strategy) = self.strategy {
            config.strategy.kind = strategy.into();
        }
        if let Some(generations) = self.generations {
            config.population.generations = generations;
        }
        if let Some(population) = self.population {
            config.population.population_size = population;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.fps.is_some() {
            config.environment.ticks_per_second = self.fps;
        }
        if self.max_ticks.is_some() {
            config.environment.max_ticks = self.max_ticks;
        }
        config.validate().context("invalid command line overrides")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing();
    run(&Cli::parse())
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.run_config()?;
    info!(
        strategy = ?config.strategy.kind,
        seed = config.seed,
        population = config.population.population_size,
        generations = config.population.generations,
        "starting run"
    );

    let environment = FlappyEnvironment::new(
        config.environment.clone(),
        rand_pcg::Pcg64::seed_from_u64(config.seed),
    )?;
    match config.strategy.kind {
        StrategyKind::Neat => {
            let mutation_rate = config.strategy.mutation_rate as f32;
            let strategy = NeatStrategy::new(mutation_rate, config.seed.wrapping_add(2));
            evolve(strategy, &config, environment, cli.stats_out.as_deref())
        }
        StrategyKind::RandomSearch => {
            let strategy = RandomSearch::new(config.topology.clone())?;
            evolve(strategy, &config, environment, cli.stats_out.as_deref())
        }
    }
}

fn evolve<S>(
    strategy: S,
    config: &RunConfig,
    mut environment: FlappyEnvironment,
    stats_out: Option<&Path>,
) -> Result<()>
where
    S: Strategy,
    S::Controller: Clone,
{
    let mut population = Population::new(
        strategy,
        config.population.clone(),
        rand_pcg::Pcg64::seed_from_u64(config.seed.wrapping_add(1)),
    );
    let statistics = Rc::new(RefCell::new(StatisticsReporter::new()));
    population.add_reporter(Box::new(LogReporter::new()));
    population.add_reporter(Box::new(Rc::clone(&statistics)));

    let summary = population.run(&mut environment)?;
    match &summary.best {
        Some(best) => info!(
            outcome = ?summary.outcome,
            generations = summary.generations,
            best_id = best.id,
            fitness = best.fitness,
            "run finished"
        ),
        None => warn!(outcome = ?summary.outcome, "run finished without a finished generation"),
    }

    if let Some(path) = stats_out {
        statistics
            .borrow()
            .save(path)
            .with_context(|| format!("writing statistics to {}", path.display()))?;
        info!(path = %path.display(), "statistics saved");
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
