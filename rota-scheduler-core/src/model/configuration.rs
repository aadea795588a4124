/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

use serde::{Deserialize, Serialize};

/// Solver parameters. The two `hard_*` toggles switch whole constraint
/// families on or off; everything else bounds the search itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveParams {
    /// Wall-clock limit in seconds. A solve that hits the limit returns the
    /// best feasible assignment found so far.
    pub time_limit_s: u64,
    /// Number of parallel search workers.
    pub workers: usize,
    /// Bar the same consultant from weekend blocks in adjacent weeks.
    pub hard_no_consecutive_weekends: bool,
    /// Bar the same consultant from any block in adjacent weeks.
    pub hard_week_gap: bool,
    /// Base seed for the worker search portfolio. Same seed, same inputs and
    /// same worker count reproduce the same search.
    pub seed: u64,
}

impl Default for SolveParams {
    fn default() -> Self {
        SolveParams {
            time_limit_s: 60,
            workers: 8,
            hard_no_consecutive_weekends: true,
            hard_week_gap: true,
            seed: 0,
        }
    }
}
