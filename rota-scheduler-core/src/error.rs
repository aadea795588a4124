use chrono::NaiveDate;
use thiserror::Error;

/// Fatal input failures raised before any solving happens. Shape problems
/// (missing regions, malformed dates) are caught by the workbook layer
/// while decoding; these are the semantic failures the engine itself
/// detects.
///
/// Solver outcomes are never errors: an infeasible or timed-out solve is
/// reported through [`crate::scheduler::sat::SolveStatus`] so that the day
/// expansion can still run and surface the gaps as flags.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("no active consultants found")]
    NoActiveConsultants,
    #[error("cycle end {end} is before cycle start {start}")]
    EmptyCycle { start: NaiveDate, end: NaiveDate },
}
