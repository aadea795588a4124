use chrono::{Datelike, NaiveDate};
use range_set_blaze::RangeSetBlaze;
use serde::{Deserialize, Serialize};

/// Set of calendar days stored as `num_days_from_ce` ordinals. Leave
/// entries arrive as inclusive intervals, which a range set stores as-is.
pub type DaySet = RangeSetBlaze<i32>;

/// Ordinal used as the `DaySet` element for a given day.
pub fn day_ordinal(day: NaiveDate) -> i32 {
    day.num_days_from_ce()
}

/// Inserts the inclusive day interval `[start, end]` into a `DaySet`.
/// An inverted interval inserts nothing.
pub fn insert_day_range(set: &mut DaySet, start: NaiveDate, end: NaiveDate) {
    if start <= end {
        set.ranges_insert(day_ordinal(start)..=day_ordinal(end));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultant {
    pub name: Box<str>,
    pub cardiac: bool,
    pub wte: f64,
    pub eligible_a: bool,
    pub eligible_d: bool,
    pub active: bool,
}

/// The active consultants, in name order so that variable indexing, week
/// assignment extraction and dashboard rows are all reproducible.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    consultants: Vec<Consultant>,
}

impl Roster {
    /// Keeps only active consultants and sorts them by name.
    pub fn from_consultants(all: Vec<Consultant>) -> Self {
        let mut consultants: Vec<Consultant> = all.into_iter().filter(|c| c.active).collect();
        consultants.sort_by(|a, b| a.name.cmp(&b.name));
        Roster { consultants }
    }

    pub fn len(&self) -> usize {
        self.consultants.len()
    }
    pub fn is_empty(&self) -> bool {
        self.consultants.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Consultant> {
        self.consultants.iter()
    }
    pub fn get(&self, index: usize) -> &Consultant {
        &self.consultants[index]
    }
    pub fn find(&self, name: &str) -> Option<&Consultant> {
        self.consultants.iter().find(|c| c.name.as_ref() == name)
    }

    /// Whether the named consultant is cardiac. Names outside the roster
    /// (such as the pre-cycle carry-over sentinel) count as non-cardiac.
    pub fn is_cardiac(&self, name: &str) -> bool {
        self.find(name).map(|c| c.cardiac).unwrap_or(false)
    }

    /// Sum of WTE fractions, guarded against a degenerate zero total.
    pub fn wte_sum(&self) -> f64 {
        let sum: f64 = self.consultants.iter().map(|c| c.wte).sum();
        if sum > 0.0 { sum } else { 1.0 }
    }
}
