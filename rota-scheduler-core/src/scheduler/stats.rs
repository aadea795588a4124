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

//! Per-consultant dashboard: duty counts against WTE-expected shares.

use crate::model::cycle::RotaInputs;
use crate::scheduler::rota::DayAssignment;
use crate::scheduler::solve::RotaSolution;
use chrono::{Datelike, Duration, Weekday};
use prettytable::{row, Table};
use serde::{Deserialize, Serialize};

/// Dashboard row for one consultant. Expected values are WTE-weighted
/// fractions of the realized totals and stay floating point; only the
/// solver objective works in fixed point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultantStats {
    pub name: Box<str>,
    pub wte: f64,
    pub a: u32,
    pub b: u32,
    pub d: u32,
    pub total: u32,
    pub expected_total: f64,
    pub delta_total: f64,
    pub bank_holidays: u32,
    pub expected_bank_holidays: f64,
    pub delta_bank_holidays: f64,
    pub weekend_blocks: u32,
    pub consecutive_weekend_pairs: u32,
}

#[derive(Default)]
struct Counts {
    a: u32,
    b: u32,
    d: u32,
    bank_holidays: u32,
    weekend_blocks: u32,
    consecutive_weekend_pairs: u32,
}

/// Accumulates duty counts over the expanded rota and the weekend block
/// structure over the week assignments. Rows come out in roster (name)
/// order so the dashboard is reproducible.
pub fn aggregate(
    inputs: &RotaInputs,
    solution: &RotaSolution,
    rota: &[DayAssignment],
) -> Vec<ConsultantStats> {
    let roster = &inputs.roster;
    let mut counts: Vec<Counts> = roster.iter().map(|_| Counts::default()).collect();
    let index_of = |name: &str| roster.iter().position(|c| c.name.as_ref() == name);

    // Weekend exposure comes from the block assignment: weeks held, and
    // pairs of adjacent weeks both held.
    for (c, consultant) in roster.iter().enumerate() {
        let mut held: Vec<_> = solution
            .weeks
            .values()
            .filter(|asg| asg.holds_weekend(&consultant.name))
            .map(|asg| asg.monday)
            .collect();
        held.sort();
        counts[c].weekend_blocks = held.len() as u32;
        counts[c].consecutive_weekend_pairs = held
            .windows(2)
            .filter(|pair| pair[1] - pair[0] == Duration::days(7))
            .count() as u32;
    }

    // Daily role counts. D only counts on weekdays; role B can name the
    // pre-cycle carry-over, which is simply not in the roster.
    for row in rota {
        let weekday = row.day.weekday();
        let on_weekday = !matches!(weekday, Weekday::Sat | Weekday::Sun);
        let is_bh = inputs.is_bank_holiday(row.day);
        if let Some(c) = index_of(&row.a) {
            counts[c].a += 1;
            if is_bh {
                counts[c].bank_holidays += 1;
            }
        }
        if let Some(c) = index_of(&row.b) {
            counts[c].b += 1;
            if is_bh {
                counts[c].bank_holidays += 1;
            }
        }
        if on_weekday {
            if let Some(c) = index_of(&row.d) {
                counts[c].d += 1;
                if is_bh {
                    counts[c].bank_holidays += 1;
                }
            }
        }
    }

    let total_all: u32 = counts.iter().map(|c| c.a + c.b + c.d).sum();
    let total_bh: u32 = counts.iter().map(|c| c.bank_holidays).sum();
    let wte_sum = roster.wte_sum();

    roster
        .iter()
        .zip(counts)
        .map(|(consultant, c)| {
            let share = consultant.wte / wte_sum;
            let total = c.a + c.b + c.d;
            let expected_total = total_all as f64 * share;
            let expected_bank_holidays = total_bh as f64 * share;
            ConsultantStats {
                name: consultant.name.clone(),
                wte: consultant.wte,
                a: c.a,
                b: c.b,
                d: c.d,
                total,
                expected_total,
                delta_total: total as f64 - expected_total,
                bank_holidays: c.bank_holidays,
                expected_bank_holidays,
                delta_bank_holidays: c.bank_holidays as f64 - expected_bank_holidays,
                weekend_blocks: c.weekend_blocks,
                consecutive_weekend_pairs: c.consecutive_weekend_pairs,
            }
        })
        .collect()
}

/// Builds a `Table` for displaying the dashboard in a human-readable
/// format.
pub fn to_table(stats: &[ConsultantStats]) -> Table {
    let mut table = Table::new();
    table.add_row(row![
        "Name", "WTE", "A", "B", "D", "Total", "Expected", "Delta", "BH", "BH exp", "BH delta",
        "Wknd", "Consec wknd"
    ]);
    for s in stats {
        table.add_row(row![
            s.name,
            format!("{:.2}", s.wte),
            s.a,
            s.b,
            s.d,
            s.total,
            format!("{:.2}", s.expected_total),
            format!("{:+.2}", s.delta_total),
            s.bank_holidays,
            format!("{:.2}", s.expected_bank_holidays),
            format!("{:+.2}", s.delta_bank_holidays),
            s.weekend_blocks,
            s.consecutive_weekend_pairs
        ]);
    }
    table
}
