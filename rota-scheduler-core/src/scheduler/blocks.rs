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

//! Weekly duty blocks: the unit of assignment handed to one consultant.

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named set of days within a week, assigned as a unit.
///
/// The A-side kinds cover role A on alternating weekdays (AB1 on Mon/Wed,
/// AB2 on Tue/Thu) and across the weekend (WeekendAb on Fri and Sun,
/// WeekendMixed on Sat). DMonThu and WeekendMixed cover role D, which is why
/// WeekendMixed needs both A- and D-eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "AB1")]
    Ab1,
    #[serde(rename = "AB2")]
    Ab2,
    #[serde(rename = "DMonThu")]
    DMonThu,
    #[serde(rename = "WeekendAB")]
    WeekendAb,
    #[serde(rename = "WeekendMixed")]
    WeekendMixed,
}

impl BlockKind {
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Ab1,
        BlockKind::Ab2,
        BlockKind::DMonThu,
        BlockKind::WeekendAb,
        BlockKind::WeekendMixed,
    ];

    /// Position in [`BlockKind::ALL`], used for variable indexing.
    pub fn index(self) -> usize {
        match self {
            BlockKind::Ab1 => 0,
            BlockKind::Ab2 => 1,
            BlockKind::DMonThu => 2,
            BlockKind::WeekendAb => 3,
            BlockKind::WeekendMixed => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Ab1 => "AB1",
            BlockKind::Ab2 => "AB2",
            BlockKind::DMonThu => "DMonThu",
            BlockKind::WeekendAb => "WeekendAB",
            BlockKind::WeekendMixed => "WeekendMixed",
        }
    }

    /// Relative duty weight in the fairness objective. WeekendMixed spans
    /// one day less than the other kinds.
    pub fn duty_weight(self) -> i64 {
        match self {
            BlockKind::WeekendMixed => 3,
            _ => 4,
        }
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, BlockKind::WeekendAb | BlockKind::WeekendMixed)
    }

    /// Kinds contributing to role A somewhere require A-eligibility.
    pub fn needs_eligible_a(self) -> bool {
        !matches!(self, BlockKind::DMonThu)
    }

    /// Kinds contributing to role D somewhere require D-eligibility.
    /// WeekendMixed places its holder on D on Friday, so it requires both
    /// eligibilities together with [`BlockKind::needs_eligible_a`].
    pub fn needs_eligible_d(self) -> bool {
        matches!(self, BlockKind::DMonThu | BlockKind::WeekendMixed)
    }

    /// Days occupied by this block in the week anchored at `monday`.
    /// WeekendAb runs through the following Monday; those days count for
    /// leave and bank-holiday collisions even when they fall outside the
    /// cycle window.
    pub fn days(self, monday: NaiveDate) -> Vec<NaiveDate> {
        let offsets: &[i64] = match self {
            BlockKind::Ab1 => &[0, 1, 2, 3],
            BlockKind::Ab2 => &[1, 2, 3, 4],
            BlockKind::DMonThu => &[0, 1, 2, 3],
            BlockKind::WeekendAb => &[4, 5, 6, 7],
            BlockKind::WeekendMixed => &[4, 5, 6],
        };
        offsets.iter().map(|&o| monday + Duration::days(o)).collect()
    }

    /// Kind whose assignee fills role A on the given day of week.
    pub fn a_kind_for(weekday: Weekday) -> BlockKind {
        match weekday {
            Weekday::Mon | Weekday::Wed => BlockKind::Ab1,
            Weekday::Tue | Weekday::Thu => BlockKind::Ab2,
            Weekday::Fri | Weekday::Sun => BlockKind::WeekendAb,
            Weekday::Sat => BlockKind::WeekendMixed,
        }
    }

    /// Kind whose assignee fills role D, or `None` on Sat/Sun where D stays
    /// blank.
    pub fn d_kind_for(weekday: Weekday) -> Option<BlockKind> {
        match weekday {
            Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => Some(BlockKind::DMonThu),
            Weekday::Fri => Some(BlockKind::WeekendMixed),
            Weekday::Sat | Weekday::Sun => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
