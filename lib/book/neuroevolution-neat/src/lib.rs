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

//! NEAT as a `neuroevolution::Strategy`.
//!
//! Genomes, crossover and mutation come from the `neat` crate. Each generation the
//! evaluated population is fed through a fitness eliminator that keeps the fitter
//! genomes, and a crossover repopulator breeds children from the survivors until the
//! population is full again.

mod brain;
mod strategy;

pub use brain::{NeatBrain, INPUTS, OUTPUTS};
pub use strategy::NeatStrategy;
