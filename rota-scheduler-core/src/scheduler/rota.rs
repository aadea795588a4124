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

//! Block-to-day expansion producing the daily rota with validation flags.
//!
//! Expansion is deterministic and never fails: an infeasible solve expands
//! to empty role fields whose gaps show up as MISSING_* flags.

use crate::model::cycle::RotaInputs;
use crate::scheduler::blocks::BlockKind;
use crate::scheduler::calendar;
use crate::scheduler::solve::RotaSolution;
use chrono::{Datelike, NaiveDate, Weekday};
use prettytable::{row, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic markers attached to a day row. They flag problems for the
/// reader of the published rota; they never abort the expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayFlag {
    MissingA,
    MissingB,
    MissingD,
    DShouldBeBlankWeekend,
    AOnLeave,
    BOnLeave,
    DOnLeave,
    CardiacXorBreach,
    BankHoliday,
}

impl DayFlag {
    pub fn label(self) -> &'static str {
        match self {
            DayFlag::MissingA => "MISSING_A",
            DayFlag::MissingB => "MISSING_B",
            DayFlag::MissingD => "MISSING_D",
            DayFlag::DShouldBeBlankWeekend => "D_SHOULD_BE_BLANK_WEEKEND",
            DayFlag::AOnLeave => "A_ON_LEAVE",
            DayFlag::BOnLeave => "B_ON_LEAVE",
            DayFlag::DOnLeave => "D_ON_LEAVE",
            DayFlag::CardiacXorBreach => "CARDIAC_XOR_BREACH",
            DayFlag::BankHoliday => "BANK_HOLIDAY",
        }
    }
}

impl fmt::Display for DayFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the daily rota. Role cells are empty strings when no block
/// covers them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAssignment {
    pub day: NaiveDate,
    pub weekday: Box<str>,
    pub a: Box<str>,
    pub b: Box<str>,
    pub d: Box<str>,
    pub flags: Box<str>,
}

fn is_weekday(weekday: Weekday) -> bool {
    !matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// Expands the solved block assignment into one row per cycle day.
///
/// Role A follows the day-of-week table of [`BlockKind::a_kind_for`]; role B
/// is the previous day's A (seeded from the pre-cycle carry-over on day
/// one); role D comes from [`BlockKind::d_kind_for`] and stays blank on
/// weekends.
pub fn expand(inputs: &RotaInputs, solution: &RotaSolution) -> Vec<DayAssignment> {
    let cycle = &inputs.cycle;
    let mut rows = Vec::new();
    let mut prev_a: Box<str> = "".into();

    for day in calendar::days(cycle.start, cycle.end) {
        let weekday = day.weekday();
        let assignment = solution.assignment_for(calendar::week_monday(day));

        let a: Box<str> = assignment
            .and_then(|asg| asg.assignee(BlockKind::a_kind_for(weekday)))
            .unwrap_or("")
            .into();
        let b: Box<str> = if day == cycle.start {
            cycle.pre_cycle_a.clone()
        } else {
            prev_a.clone()
        };
        let d: Box<str> = BlockKind::d_kind_for(weekday)
            .and_then(|kind| assignment.and_then(|asg| asg.assignee(kind)))
            .unwrap_or("")
            .into();

        let mut flags = Vec::new();
        if a.is_empty() {
            flags.push(DayFlag::MissingA);
        }
        if b.is_empty() {
            flags.push(DayFlag::MissingB);
        }
        if is_weekday(weekday) && d.is_empty() {
            flags.push(DayFlag::MissingD);
        }
        if !is_weekday(weekday) && !d.is_empty() {
            flags.push(DayFlag::DShouldBeBlankWeekend);
        }
        if !a.is_empty() && inputs.on_leave(&a, day) {
            flags.push(DayFlag::AOnLeave);
        }
        if !b.is_empty() && inputs.on_leave(&b, day) {
            flags.push(DayFlag::BOnLeave);
        }
        if !d.is_empty() && inputs.on_leave(&d, day) {
            flags.push(DayFlag::DOnLeave);
        }
        if is_weekday(weekday) {
            let a_cardiac = inputs.roster.is_cardiac(&a);
            let d_cardiac = inputs.roster.is_cardiac(&d);
            if a_cardiac == d_cardiac {
                flags.push(DayFlag::CardiacXorBreach);
            }
        }
        if inputs.is_bank_holiday(day) {
            flags.push(DayFlag::BankHoliday);
        }

        let flags: Box<str> = flags
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(",")
            .into();

        rows.push(DayAssignment {
            day,
            weekday: day.format("%a").to_string().into(),
            a: a.clone(),
            b,
            d,
            flags,
        });
        prev_a = a;
    }
    rows
}

/// Builds a `Table` for displaying the daily rota in a human-readable
/// format.
pub fn to_table(rows: &[DayAssignment]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Date", "Day", "A", "B", "D", "Flags"]);
    for r in rows {
        table.add_row(row![r.day, r.weekday, r.a, r.b, r.d, r.flags]);
    }
    table
}
