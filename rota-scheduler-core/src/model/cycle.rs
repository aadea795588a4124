use crate::error::InputError;
use crate::model::consultant::{day_ordinal, DaySet, Roster};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The inclusive date window being scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Name written to role B on the first day of the cycle. Role B is the
    /// previous day's A, so day one needs this carry-over from before the
    /// cycle. May be empty, in which day one is flagged MISSING_B.
    #[serde(default)]
    pub pre_cycle_a: Box<str>,
}

impl Cycle {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.end < self.start {
            return Err(InputError::EmptyCycle {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Read-only snapshot of everything the engine consumes. Built once by the
/// I/O layer; the solver, expansion and aggregation all borrow it.
#[derive(Debug, Clone)]
pub struct RotaInputs {
    pub cycle: Cycle,
    pub roster: Roster,
    /// Approved leave days per consultant name.
    pub leave: HashMap<Box<str>, DaySet>,
    pub bank_holidays: DaySet,
}

impl RotaInputs {
    pub fn new(
        cycle: Cycle,
        roster: Roster,
        leave: HashMap<Box<str>, DaySet>,
        bank_holidays: DaySet,
    ) -> Result<Self, InputError> {
        cycle.validate()?;
        if roster.is_empty() {
            return Err(InputError::NoActiveConsultants);
        }
        Ok(RotaInputs {
            cycle,
            roster,
            leave,
            bank_holidays,
        })
    }

    pub fn on_leave(&self, name: &str, day: NaiveDate) -> bool {
        self.leave
            .get(name)
            .map(|set| set.contains(day_ordinal(day)))
            .unwrap_or(false)
    }

    pub fn is_bank_holiday(&self, day: NaiveDate) -> bool {
        self.bank_holidays.contains(day_ordinal(day))
    }
}
