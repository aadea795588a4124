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

//! Solver driver: builds the weekly block model and runs the CP-SAT backend.

use crate::error::InputError;
use crate::model::configuration::SolveParams;
use crate::model::consultant::day_ordinal;
use crate::model::cycle::RotaInputs;
use crate::scheduler::blocks::BlockKind;
use crate::scheduler::calendar;
use crate::scheduler::sat::{self, Model, SatParams, SolveStatus, VarId};
use chrono::{NaiveDate, Weekday};
use indexmap::IndexMap;
use log::info;
use std::time::Duration;

/// Fixed-point scale for comparing integer duty counts against WTE-weighted
/// expected fractions. The objective stays in integers throughout.
pub const FIXED_POINT_SCALE: i64 = 1000;

/// Bank-holiday deviations weigh heaviest (scarce and visible), weekend
/// exposure next, total load last.
const TOTAL_DEV_WEIGHT: i64 = 1;
const BH_DEV_WEIGHT: i64 = 3;
const WEEKEND_DEV_WEIGHT: i64 = 2;

/// One consultant per block kind for a week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekAssignment {
    pub monday: NaiveDate,
    assignees: [Option<Box<str>>; BlockKind::ALL.len()],
}

impl WeekAssignment {
    pub fn new(monday: NaiveDate) -> Self {
        WeekAssignment {
            monday,
            assignees: Default::default(),
        }
    }

    pub fn assignee(&self, kind: BlockKind) -> Option<&str> {
        self.assignees[kind.index()].as_deref()
    }

    pub fn set(&mut self, kind: BlockKind, name: Box<str>) {
        self.assignees[kind.index()] = Some(name);
    }

    /// Whether `name` holds a weekend block this week.
    pub fn holds_weekend(&self, name: &str) -> bool {
        BlockKind::ALL
            .iter()
            .any(|&k| k.is_weekend() && self.assignee(k) == Some(name))
    }
}

/// Solved block assignment, ordered by week anchor.
#[derive(Debug, Clone)]
pub struct RotaSolution {
    pub status: SolveStatus,
    pub objective: Option<i64>,
    pub weeks: IndexMap<NaiveDate, WeekAssignment>,
}

impl RotaSolution {
    pub fn is_feasible(&self) -> bool {
        self.status.is_feasible()
    }

    pub fn assignment_for(&self, monday: NaiveDate) -> Option<&WeekAssignment> {
        self.weeks.get(&monday)
    }
}

/// Validates the inputs, builds the block model and solves it.
///
/// Infeasibility and timeouts are returned as data: the solution then
/// carries empty week assignments and the corresponding status.
pub fn solve(inputs: &RotaInputs, params: &SolveParams) -> Result<RotaSolution, InputError> {
    inputs.cycle.validate()?;
    if inputs.roster.is_empty() {
        return Err(InputError::NoActiveConsultants);
    }

    let weeks = calendar::weeks(inputs.cycle.start, inputs.cycle.end);
    if weeks.is_empty() {
        return Ok(RotaSolution {
            status: SolveStatus::Optimal,
            objective: Some(0),
            weeks: IndexMap::new(),
        });
    }

    let (model, vars) = build_model(inputs, &weeks, params);
    info!(
        "block model: {} weeks, {} consultants, {} variables, time limit {}s, {} workers",
        weeks.len(),
        inputs.roster.len(),
        model.num_vars(),
        params.time_limit_s,
        params.workers
    );

    let sat = sat::solve(
        &model,
        &SatParams {
            time_limit: Duration::from_secs(params.time_limit_s),
            workers: params.workers,
            seed: params.seed,
        },
    );
    info!("solver finished: {} objective {:?}", sat.status, sat.objective);

    let mut week_map = IndexMap::with_capacity(weeks.len());
    for (w, &monday) in weeks.iter().enumerate() {
        let mut assignment = WeekAssignment::new(monday);
        if let Some(values) = &sat.values {
            for &kind in &BlockKind::ALL {
                for (c, consultant) in inputs.roster.iter().enumerate() {
                    if values[vars.index(w, kind, c)] {
                        assignment.set(kind, consultant.name.clone());
                        break;
                    }
                }
            }
        }
        week_map.insert(monday, assignment);
    }

    Ok(RotaSolution {
        status: sat.status,
        objective: sat.objective,
        weeks: week_map,
    })
}

/// Maps (week, kind, consultant) to the flat variable id.
#[derive(Clone, Copy)]
struct VarTable {
    consultants: usize,
}

impl VarTable {
    fn index(&self, week: usize, kind: BlockKind, consultant: usize) -> VarId {
        (week * BlockKind::ALL.len() + kind.index()) * self.consultants + consultant
    }
}

fn build_model(inputs: &RotaInputs, weeks: &[NaiveDate], params: &SolveParams) -> (Model, VarTable) {
    let roster = &inputs.roster;
    let n = roster.len();
    let vars = VarTable { consultants: n };
    let mut model = Model::new();
    for _ in 0..weeks.len() * BlockKind::ALL.len() * n {
        model.new_var();
    }

    // Coverage: exactly one assignee per (week, kind).
    for w in 0..weeks.len() {
        for &kind in &BlockKind::ALL {
            let terms = (0..n).map(|c| (vars.index(w, kind, c), 1)).collect();
            model.add_exactly(terms, 1);
        }
    }

    // Eligibility: WeekendMixed covers A on Fri-Sun and D on Fri, so it
    // falls under both rules.
    for w in 0..weeks.len() {
        for (c, consultant) in roster.iter().enumerate() {
            for &kind in &BlockKind::ALL {
                if (kind.needs_eligible_a() && !consultant.eligible_a)
                    || (kind.needs_eligible_d() && !consultant.eligible_d)
                {
                    model.fix_false(vars.index(w, kind, c));
                }
            }
        }
    }

    // Leave: a block is barred if any of its days, including the Monday
    // tail of WeekendAB, lands on an approved leave day.
    for (w, &monday) in weeks.iter().enumerate() {
        for &kind in &BlockKind::ALL {
            let block_days = kind.days(monday);
            for (c, consultant) in roster.iter().enumerate() {
                if let Some(leave) = inputs.leave.get(&consultant.name) {
                    if block_days.iter().any(|&d| leave.contains(day_ordinal(d))) {
                        model.fix_false(vars.index(w, kind, c));
                    }
                }
            }
        }
    }

    // At most one block per week per consultant.
    for w in 0..weeks.len() {
        for c in 0..n {
            let terms = BlockKind::ALL
                .iter()
                .map(|&kind| (vars.index(w, kind, c), 1))
                .collect();
            model.add_at_most(terms, 1);
        }
    }

    // Consecutive-weekend bar.
    if params.hard_no_consecutive_weekends {
        for c in 0..n {
            for w in 0..weeks.len().saturating_sub(1) {
                let mut terms = Vec::with_capacity(4);
                for week in [w, w + 1] {
                    for &kind in &BlockKind::ALL {
                        if kind.is_weekend() {
                            terms.push((vars.index(week, kind, c), 1));
                        }
                    }
                }
                model.add_at_most(terms, 1);
            }
        }
    }

    // Week-gap bar: no blocks at all in two adjacent weeks.
    if params.hard_week_gap {
        for c in 0..n {
            for w in 0..weeks.len().saturating_sub(1) {
                let mut terms = Vec::with_capacity(2 * BlockKind::ALL.len());
                for week in [w, w + 1] {
                    for &kind in &BlockKind::ALL {
                        terms.push((vars.index(week, kind, c), 1));
                    }
                }
                model.add_at_most(terms, 1);
            }
        }
    }

    // Weekday cardiac XOR: exactly one of the A- and D-side assignees is
    // cardiac on every Mon-Fri.
    const WEEKDAYS: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];
    for w in 0..weeks.len() {
        for weekday in WEEKDAYS {
            let a_kind = BlockKind::a_kind_for(weekday);
            let d_kind = BlockKind::d_kind_for(weekday).unwrap();
            let mut terms = Vec::new();
            for (c, consultant) in roster.iter().enumerate() {
                if consultant.cardiac {
                    terms.push((vars.index(w, a_kind, c), 1));
                    terms.push((vars.index(w, d_kind, c), 1));
                }
            }
            model.add_exactly(terms, 1);
        }
    }

    // Fairness objective: WTE-weighted deviations in fixed point.
    let scale = FIXED_POINT_SCALE;
    let wte_sum = roster.wte_sum();

    let duty_total: i64 = BlockKind::ALL
        .iter()
        .map(|&k| k.duty_weight())
        .sum::<i64>()
        * weeks.len() as i64;

    let bh_in_block = |monday: NaiveDate, kind: BlockKind| -> i64 {
        kind.days(monday)
            .iter()
            .filter(|&&d| inputs.bank_holidays.contains(day_ordinal(d)))
            .count() as i64
    };
    let bh_total: i64 = weeks
        .iter()
        .map(|&monday| {
            BlockKind::ALL
                .iter()
                .map(|&kind| bh_in_block(monday, kind))
                .sum::<i64>()
        })
        .sum();

    let weekend_total = 2 * weeks.len() as i64;

    for (c, consultant) in roster.iter().enumerate() {
        let share = consultant.wte / wte_sum;
        let expected = |total: i64| (total as f64 * share * scale as f64).round() as i64;

        let duty_terms: Vec<(VarId, i64)> = (0..weeks.len())
            .flat_map(|w| {
                BlockKind::ALL
                    .iter()
                    .map(move |&kind| (vars.index(w, kind, c), kind.duty_weight() * scale))
                    .collect::<Vec<_>>()
            })
            .collect();
        model.add_abs_deviation(duty_terms, expected(duty_total), TOTAL_DEV_WEIGHT);

        let bh_terms: Vec<(VarId, i64)> = weeks
            .iter()
            .enumerate()
            .flat_map(|(w, &monday)| {
                BlockKind::ALL
                    .iter()
                    .filter_map(|&kind| {
                        let count = bh_in_block(monday, kind);
                        (count > 0).then(|| (vars.index(w, kind, c), count * scale))
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        model.add_abs_deviation(bh_terms, expected(bh_total), BH_DEV_WEIGHT);

        let weekend_terms: Vec<(VarId, i64)> = (0..weeks.len())
            .flat_map(|w| {
                BlockKind::ALL
                    .iter()
                    .filter(|k| k.is_weekend())
                    .map(move |&kind| (vars.index(w, kind, c), scale))
                    .collect::<Vec<_>>()
            })
            .collect();
        model.add_abs_deviation(weekend_terms, expected(weekend_total), WEEKEND_DEV_WEIGHT);
    }

    (model, vars)
}

/// Objective value of a complete block assignment, computed independently
/// of the solver. Used for regression checks of the fairness weighting.
pub fn evaluate_objective(
    inputs: &RotaInputs,
    weeks: &IndexMap<NaiveDate, WeekAssignment>,
) -> i64 {
    let roster = &inputs.roster;
    let scale = FIXED_POINT_SCALE;
    let wte_sum = roster.wte_sum();

    let duty_total: i64 = BlockKind::ALL
        .iter()
        .map(|&k| k.duty_weight())
        .sum::<i64>()
        * weeks.len() as i64;
    let bh_in_block = |monday: NaiveDate, kind: BlockKind| -> i64 {
        kind.days(monday)
            .iter()
            .filter(|&&d| inputs.bank_holidays.contains(day_ordinal(d)))
            .count() as i64
    };
    let bh_total: i64 = weeks
        .keys()
        .map(|&monday| {
            BlockKind::ALL
                .iter()
                .map(|&kind| bh_in_block(monday, kind))
                .sum::<i64>()
        })
        .sum();
    let weekend_total = 2 * weeks.len() as i64;

    let mut objective = 0i64;
    for consultant in roster.iter() {
        let share = consultant.wte / wte_sum;
        let expected = |total: i64| (total as f64 * share * scale as f64).round() as i64;

        let mut duty = 0i64;
        let mut bh = 0i64;
        let mut weekend = 0i64;
        for assignment in weeks.values() {
            for &kind in &BlockKind::ALL {
                if assignment.assignee(kind) == Some(consultant.name.as_ref()) {
                    duty += kind.duty_weight();
                    bh += bh_in_block(assignment.monday, kind);
                    if kind.is_weekend() {
                        weekend += 1;
                    }
                }
            }
        }
        objective += TOTAL_DEV_WEIGHT * (duty * scale - expected(duty_total)).abs();
        objective += BH_DEV_WEIGHT * (bh * scale - expected(bh_total)).abs();
        objective += WEEKEND_DEV_WEIGHT * (weekend * scale - expected(weekend_total)).abs();
    }
    objective
}
