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

//! The tabular rota workbook, persisted as one JSON document with a region
//! per sheet of the original layout.
//!
//! The leave region is sparse: rows are keyed by their row number and a
//! deleted row simply disappears from the map while every other row keeps
//! its number. Row numbers are the stable identifiers the admin frontends
//! hand around, so deletion must not shift them.

use crate::error::StoreError;
use crate::leave::LeaveType;
use chrono::NaiveDate;
use log::warn;
use rota_scheduler_core::model::consultant::{insert_day_range, Consultant, DaySet, Roster};
use rota_scheduler_core::model::cycle::{Cycle, RotaInputs};
use rota_scheduler_core::scheduler::blocks::BlockKind;
use rota_scheduler_core::scheduler::rota::DayAssignment;
use rota_scheduler_core::scheduler::solve::RotaSolution;
use rota_scheduler_core::scheduler::stats::ConsultantStats;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// Tabular regions start under a header row.
pub const FIRST_ROW: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkbookConfig {
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    /// The consultant who held role A on the day before the cycle; seeds
    /// role B on day one.
    #[serde(default)]
    pub pre_cycle_a: Box<str>,
}

/// One leave row of the tabular region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRow {
    pub name: Box<str>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub leave_type: LeaveType,
    pub approved: bool,
}

/// One row of the solved week-assignments region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekAssignmentRow {
    pub monday: NaiveDate,
    pub ab1: Box<str>,
    pub ab2: Box<str>,
    pub d_mon_thu: Box<str>,
    pub weekend_ab: Box<str>,
    pub weekend_mixed: Box<str>,
    pub status: Box<str>,
    pub objective: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbook {
    pub config: WorkbookConfig,
    pub consultants: Vec<Consultant>,
    #[serde(default)]
    pub leave: BTreeMap<u32, LeaveRow>,
    #[serde(default)]
    pub bank_holidays: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub week_assignments: Vec<WeekAssignmentRow>,
    #[serde(default)]
    pub rota: Vec<DayAssignment>,
    #[serde(default)]
    pub dashboard: Vec<ConsultantStats>,
}

impl Workbook {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Shape {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(self).expect("workbook serialization");
        fs::write(path, contents).map_err(|e| StoreError::io(path, e))
    }

    /// Flattens the workbook into the read-only snapshot the engine
    /// consumes. Only approved leave rows of known active consultants
    /// contribute; anything else is skipped, matching the tolerant reader
    /// of the tabular layout.
    pub fn engine_inputs(&self) -> Result<RotaInputs, StoreError> {
        let roster = Roster::from_consultants(self.consultants.clone());

        let mut leave: HashMap<Box<str>, DaySet> = HashMap::new();
        for row in self.leave.values() {
            if !row.approved {
                continue;
            }
            if roster.find(&row.name).is_none() {
                continue;
            }
            if row.end < row.start {
                warn!("skipping inverted leave interval for {}", row.name);
                continue;
            }
            let set = leave.entry(row.name.clone()).or_default();
            insert_day_range(set, row.start, row.end);
        }

        let mut bank_holidays = DaySet::new();
        for &day in &self.bank_holidays {
            insert_day_range(&mut bank_holidays, day, day);
        }

        let inputs = RotaInputs::new(
            Cycle {
                start: self.config.cycle_start,
                end: self.config.cycle_end,
                pre_cycle_a: self.config.pre_cycle_a.clone(),
            },
            roster,
            leave,
            bank_holidays,
        )?;
        Ok(inputs)
    }

    /// First unused leave row number at or after [`FIRST_ROW`].
    pub fn next_empty_leave_row(&self) -> u32 {
        let mut row = FIRST_ROW;
        while self.leave.contains_key(&row) {
            row += 1;
        }
        row
    }

    /// Clears a leave row, keeping every other row number stable. Returns
    /// whether the row existed.
    pub fn clear_leave_row(&mut self, row: u32) -> bool {
        self.leave.remove(&row).is_some()
    }

    /// Wipes the leave region and appends `rows` densely from
    /// [`FIRST_ROW`]. The compile step replaces, never merges.
    pub fn replace_leave_region(&mut self, rows: Vec<LeaveRow>) {
        self.leave.clear();
        for (i, row) in rows.into_iter().enumerate() {
            self.leave.insert(FIRST_ROW + i as u32, row);
        }
    }

    /// Fills the three output regions from a solve run, replacing any
    /// previous export.
    pub fn apply_solution(
        &mut self,
        solution: &RotaSolution,
        rota: Vec<DayAssignment>,
        dashboard: Vec<ConsultantStats>,
    ) {
        let cell = |name: Option<&str>| -> Box<str> { name.unwrap_or("").into() };
        self.week_assignments = solution
            .weeks
            .values()
            .map(|asg| WeekAssignmentRow {
                monday: asg.monday,
                ab1: cell(asg.assignee(BlockKind::Ab1)),
                ab2: cell(asg.assignee(BlockKind::Ab2)),
                d_mon_thu: cell(asg.assignee(BlockKind::DMonThu)),
                weekend_ab: cell(asg.assignee(BlockKind::WeekendAb)),
                weekend_mixed: cell(asg.assignee(BlockKind::WeekendMixed)),
                status: solution.status.label().into(),
                objective: solution.objective,
            })
            .collect();
        self.rota = rota;
        self.dashboard = dashboard;
    }
}

#[cfg(test)]
mod tests;
