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

//! A small CP-SAT backend: 0/1 decision variables, linear constraints with
//! non-negative coefficients, and a weighted absolute-deviation objective.
//!
//! Solving runs a portfolio of branch-and-bound workers, one thread each,
//! sharing the incumbent. Each worker performs a complete depth-first search
//! with bounds-consistency propagation and objective lower-bound pruning,
//! branching in a randomized order derived from its seed. The first worker
//! to exhaust the search space proves optimality (or infeasibility); a
//! deadline turns the best incumbent into a FEASIBLE answer instead.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub type VarId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Le,
}

#[derive(Debug, Clone)]
struct Linear {
    terms: Vec<(VarId, i64)>,
    op: CmpOp,
    rhs: i64,
}

/// One `weight * |Σ coef·x − target|` objective term.
#[derive(Debug, Clone)]
struct Deviation {
    terms: Vec<(VarId, i64)>,
    target: i64,
    weight: i64,
}

/// A constraint model under construction. All coefficients must be
/// strictly positive; zero-coefficient terms should simply be left out.
#[derive(Debug, Default)]
pub struct Model {
    num_vars: usize,
    fixed_false: Vec<VarId>,
    constraints: Vec<Linear>,
    deviations: Vec<Deviation>,
}

impl Model {
    pub fn new() -> Self {
        Model::default()
    }

    pub fn new_var(&mut self) -> VarId {
        let id = self.num_vars;
        self.num_vars += 1;
        id
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Adds `Σ coef·x == rhs`.
    pub fn add_exactly(&mut self, terms: Vec<(VarId, i64)>, rhs: i64) {
        debug_assert!(terms.iter().all(|&(_, c)| c > 0));
        self.constraints.push(Linear {
            terms,
            op: CmpOp::Eq,
            rhs,
        });
    }

    /// Adds `Σ coef·x <= rhs`.
    pub fn add_at_most(&mut self, terms: Vec<(VarId, i64)>, rhs: i64) {
        debug_assert!(terms.iter().all(|&(_, c)| c > 0));
        self.constraints.push(Linear {
            terms,
            op: CmpOp::Le,
            rhs,
        });
    }

    /// Pins a variable to 0 before the search starts.
    pub fn fix_false(&mut self, var: VarId) {
        self.fixed_false.push(var);
    }

    /// Adds `weight * |Σ coef·x − target|` to the objective.
    pub fn add_abs_deviation(&mut self, terms: Vec<(VarId, i64)>, target: i64, weight: i64) {
        debug_assert!(terms.iter().all(|&(_, c)| c > 0));
        self.deviations.push(Deviation {
            terms,
            target,
            weight,
        });
    }

    /// Per-variable occurrence lists, shared by all search workers.
    fn indexes(&self) -> Indexes {
        let mut var_cons = vec![Vec::new(); self.num_vars];
        for (ci, con) in self.constraints.iter().enumerate() {
            for &(v, coef) in &con.terms {
                var_cons[v].push((ci, coef));
            }
        }
        let mut var_devs = vec![Vec::new(); self.num_vars];
        for (di, dev) in self.deviations.iter().enumerate() {
            for &(v, coef) in &dev.terms {
                var_devs[v].push((di, coef));
            }
        }
        Indexes { var_cons, var_devs }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    pub fn is_feasible(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    pub fn label(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct SatSolution {
    pub status: SolveStatus,
    pub objective: Option<i64>,
    pub values: Option<Vec<bool>>,
}

#[derive(Debug, Clone)]
pub struct SatParams {
    pub time_limit: Duration,
    pub workers: usize,
    pub seed: u64,
}

struct Indexes {
    var_cons: Vec<Vec<(usize, i64)>>,
    var_devs: Vec<Vec<(usize, i64)>>,
}

struct Shared {
    best_obj: AtomicI64,
    best: Mutex<Option<(i64, Vec<bool>)>>,
    stop: AtomicBool,
    exhausted: AtomicBool,
}

/// Runs the worker portfolio and classifies the outcome.
pub fn solve(model: &Model, params: &SatParams) -> SatSolution {
    let shared = Shared {
        best_obj: AtomicI64::new(i64::MAX),
        best: Mutex::new(None),
        stop: AtomicBool::new(false),
        exhausted: AtomicBool::new(false),
    };
    let indexes = model.indexes();
    let deadline = Instant::now() + params.time_limit;
    let workers = params.workers.max(1);

    std::thread::scope(|scope| {
        for i in 0..workers {
            let shared = &shared;
            let indexes = &indexes;
            scope.spawn(move || {
                let seed = params.seed.wrapping_add(i as u64);
                let mut search = Search::new(model, indexes, shared, deadline, seed);
                if search.run() == Outcome::Exhausted {
                    shared.exhausted.store(true, Ordering::SeqCst);
                    shared.stop.store(true, Ordering::SeqCst);
                }
            });
        }
    });

    let best = shared.best.lock().unwrap().take();
    let exhausted = shared.exhausted.load(Ordering::SeqCst);
    match (best, exhausted) {
        (Some((objective, values)), true) => SatSolution {
            status: SolveStatus::Optimal,
            objective: Some(objective),
            values: Some(values),
        },
        (Some((objective, values)), false) => SatSolution {
            status: SolveStatus::Feasible,
            objective: Some(objective),
            values: Some(values),
        },
        (None, true) => SatSolution {
            status: SolveStatus::Infeasible,
            objective: None,
            values: None,
        },
        (None, false) => SatSolution {
            status: SolveStatus::Unknown,
            objective: None,
            values: None,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// The whole search space was covered (possibly via valid pruning).
    Exhausted,
    /// Deadline or external stop.
    Aborted,
}

struct Search<'a> {
    model: &'a Model,
    idx: &'a Indexes,
    shared: &'a Shared,
    deadline: Instant,
    rng: StdRng,
    /// -1 unset, 0 or 1 once fixed.
    values: Vec<i8>,
    /// Per constraint: Σ coef over vars fixed to 1.
    con_fixed: Vec<i64>,
    /// Per constraint: Σ coef over unfixed vars.
    con_open: Vec<i64>,
    con_unfixed: Vec<u32>,
    dev_fixed: Vec<i64>,
    dev_open: Vec<i64>,
    trail: Vec<VarId>,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(
        model: &'a Model,
        idx: &'a Indexes,
        shared: &'a Shared,
        deadline: Instant,
        seed: u64,
    ) -> Self {
        let con_open = model
            .constraints
            .iter()
            .map(|c| c.terms.iter().map(|&(_, coef)| coef).sum())
            .collect();
        let con_unfixed = model
            .constraints
            .iter()
            .map(|c| c.terms.len() as u32)
            .collect();
        let dev_open = model
            .deviations
            .iter()
            .map(|d| d.terms.iter().map(|&(_, coef)| coef).sum())
            .collect();
        Search {
            model,
            idx,
            shared,
            deadline,
            rng: StdRng::seed_from_u64(seed),
            values: vec![-1; model.num_vars],
            con_fixed: vec![0; model.constraints.len()],
            con_open,
            con_unfixed,
            dev_fixed: vec![0; model.deviations.len()],
            dev_open,
            trail: Vec::with_capacity(model.num_vars),
            nodes: 0,
        }
    }

    fn run(&mut self) -> Outcome {
        // Root-level pins. A contradiction here is an infeasibility proof.
        for i in 0..self.model.fixed_false.len() {
            let var = self.model.fixed_false[i];
            if !self.assign(var, 0) {
                return Outcome::Exhausted;
            }
        }
        // Root propagation can already violate an equality (e.g. an empty
        // coverage sum that must reach 1).
        for ci in 0..self.model.constraints.len() {
            if !self.constraint_consistent(ci) {
                return Outcome::Exhausted;
            }
        }
        self.dfs()
    }

    fn dfs(&mut self) -> Outcome {
        self.nodes += 1;
        if self.shared.stop.load(Ordering::Relaxed) {
            return Outcome::Aborted;
        }
        if self.nodes % 256 == 0 && Instant::now() >= self.deadline {
            return Outcome::Aborted;
        }
        if self.lower_bound() >= self.shared.best_obj.load(Ordering::Relaxed) {
            return Outcome::Exhausted;
        }

        let Some(var) = self.pick_branch_var() else {
            self.record_solution();
            return Outcome::Exhausted;
        };

        // Assigning first drives the coverage equalities forward, so the
        // first descent doubles as a greedy feasibility pass.
        for val in [1i8, 0i8] {
            let mark = self.trail.len();
            if self.assign(var, val) {
                if self.dfs() == Outcome::Aborted {
                    self.undo(mark);
                    return Outcome::Aborted;
                }
            }
            self.undo(mark);
        }
        Outcome::Exhausted
    }

    /// Fixes `var` and propagates to a fixpoint. Returns false on conflict;
    /// the caller rewinds through the trail.
    fn assign(&mut self, var: VarId, val: i8) -> bool {
        let mut queue = vec![(var, val)];
        while let Some((v, val)) = queue.pop() {
            match self.values[v] {
                x if x == val => continue,
                -1 => {}
                _ => return false,
            }
            self.values[v] = val;
            self.trail.push(v);

            for k in 0..self.idx.var_cons[v].len() {
                let (ci, coef) = self.idx.var_cons[v][k];
                if val == 1 {
                    self.con_fixed[ci] += coef;
                }
                self.con_open[ci] -= coef;
                self.con_unfixed[ci] -= 1;
                if !self.check_constraint(ci, &mut queue) {
                    return false;
                }
            }
            for k in 0..self.idx.var_devs[v].len() {
                let (di, coef) = self.idx.var_devs[v][k];
                if val == 1 {
                    self.dev_fixed[di] += coef;
                }
                self.dev_open[di] -= coef;
            }
        }
        true
    }

    fn constraint_consistent(&self, ci: usize) -> bool {
        let con = &self.model.constraints[ci];
        let min = self.con_fixed[ci];
        let max = min + self.con_open[ci];
        match con.op {
            CmpOp::Le => min <= con.rhs,
            CmpOp::Eq => min <= con.rhs && max >= con.rhs,
        }
    }

    /// Bounds check plus forcing: a variable whose coefficient no longer
    /// fits is pinned to 0, one whose absence would leave the equality
    /// unreachable is pinned to 1.
    fn check_constraint(&self, ci: usize, queue: &mut Vec<(VarId, i8)>) -> bool {
        let con = &self.model.constraints[ci];
        let min = self.con_fixed[ci];
        let max = min + self.con_open[ci];
        match con.op {
            CmpOp::Le => {
                if min > con.rhs {
                    return false;
                }
                if self.con_unfixed[ci] > 0 {
                    for &(v, coef) in &con.terms {
                        if self.values[v] == -1 && min + coef > con.rhs {
                            queue.push((v, 0));
                        }
                    }
                }
            }
            CmpOp::Eq => {
                if min > con.rhs || max < con.rhs {
                    return false;
                }
                if self.con_unfixed[ci] > 0 {
                    for &(v, coef) in &con.terms {
                        if self.values[v] == -1 {
                            if min + coef > con.rhs {
                                queue.push((v, 0));
                            } else if max - coef < con.rhs {
                                queue.push((v, 1));
                            }
                        }
                    }
                }
            }
        }
        true
    }

    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let v = self.trail.pop().unwrap();
            let was = self.values[v];
            self.values[v] = -1;
            for k in 0..self.idx.var_cons[v].len() {
                let (ci, coef) = self.idx.var_cons[v][k];
                if was == 1 {
                    self.con_fixed[ci] -= coef;
                }
                self.con_open[ci] += coef;
                self.con_unfixed[ci] += 1;
            }
            for k in 0..self.idx.var_devs[v].len() {
                let (di, coef) = self.idx.var_devs[v][k];
                if was == 1 {
                    self.dev_fixed[di] -= coef;
                }
                self.dev_open[di] += coef;
            }
        }
    }

    /// Valid lower bound on the objective of any completion of the current
    /// partial assignment: each deviation can at best land inside its
    /// remaining reachable interval.
    fn lower_bound(&self) -> i64 {
        let mut lb = 0i64;
        for (di, dev) in self.model.deviations.iter().enumerate() {
            let min = self.dev_fixed[di];
            let max = min + self.dev_open[di];
            let below = dev.target - max;
            let above = min - dev.target;
            lb += dev.weight * below.max(above).max(0);
        }
        lb
    }

    /// First-fail branching: the open equality with the fewest unfixed
    /// variables, picking one of its variables at random for portfolio
    /// diversity.
    fn pick_branch_var(&mut self) -> Option<VarId> {
        let mut best: Option<(u32, usize)> = None;
        for ci in 0..self.model.constraints.len() {
            if self.model.constraints[ci].op != CmpOp::Eq {
                continue;
            }
            let unfixed = self.con_unfixed[ci];
            if unfixed == 0 {
                continue;
            }
            if best.map_or(true, |(b, _)| unfixed < b) {
                best = Some((unfixed, ci));
            }
        }
        if let Some((_, ci)) = best {
            let cands: Vec<VarId> = self.model.constraints[ci]
                .terms
                .iter()
                .map(|&(v, _)| v)
                .filter(|&v| self.values[v] == -1)
                .collect();
            return Some(cands[self.rng.random_range(0..cands.len())]);
        }
        // Variables outside any open equality (rare: a model without
        // coverage constraints).
        self.values.iter().position(|&v| v == -1)
    }

    fn record_solution(&mut self) {
        let mut objective = 0i64;
        for (di, dev) in self.model.deviations.iter().enumerate() {
            objective += dev.weight * (self.dev_fixed[di] - dev.target).abs();
        }
        let mut best = self.shared.best.lock().unwrap();
        if objective < self.shared.best_obj.load(Ordering::SeqCst) {
            self.shared.best_obj.store(objective, Ordering::SeqCst);
            *best = Some((objective, self.values.iter().map(|&v| v == 1).collect()));
            debug!("incumbent objective {} after {} nodes", objective, self.nodes);
            if objective == 0 {
                // A zero-deviation assignment cannot be improved.
                self.shared.exhausted.store(true, Ordering::SeqCst);
                self.shared.stop.store(true, Ordering::SeqCst);
            }
        }
    }
}
