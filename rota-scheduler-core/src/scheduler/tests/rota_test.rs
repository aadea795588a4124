use crate::model::consultant::{insert_day_range, DaySet};
use crate::scheduler::blocks::BlockKind;
use crate::scheduler::rota::expand;
use crate::scheduler::sat::SolveStatus;
use crate::scheduler::solve::{RotaSolution, WeekAssignment};
use crate::scheduler::tests::roster_mock::{date, mock_inputs};
use chrono::NaiveDate;
use indexmap::IndexMap;

/// Hand-built assignment repeating the same five names every week.
fn fixed_solution(mondays: &[NaiveDate], names: [&str; 5]) -> RotaSolution {
    let mut weeks = IndexMap::new();
    for &monday in mondays {
        let mut assignment = WeekAssignment::new(monday);
        for (i, &kind) in BlockKind::ALL.iter().enumerate() {
            assignment.set(kind, names[i].into());
        }
        weeks.insert(monday, assignment);
    }
    RotaSolution {
        status: SolveStatus::Feasible,
        objective: Some(0),
        weeks,
    }
}

// AB1=Card01, AB2=Card02, DMonThu=Gen01, WeekendAB=Card03, WeekendMixed=Gen02
// satisfies the weekday cardiac XOR throughout.
const NAMES: [&str; 5] = ["Card01", "Card02", "Gen01", "Card03", "Gen02"];

#[test]
fn test_role_selection_by_day_of_week() {
    let inputs = mock_inputs(3, 2, date(2025, 1, 6), date(2025, 1, 12));
    let solution = fixed_solution(&[date(2025, 1, 6)], NAMES);
    let rows = expand(&inputs, &solution);

    let by_day: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|r| (r.a.as_ref(), r.d.as_ref(), r.weekday.as_ref()))
        .collect();
    assert_eq!(by_day[0], ("Card01", "Gen01", "Mon"));
    assert_eq!(by_day[1], ("Card02", "Gen01", "Tue"));
    assert_eq!(by_day[2], ("Card01", "Gen01", "Wed"));
    assert_eq!(by_day[3], ("Card02", "Gen01", "Thu"));
    assert_eq!(by_day[4], ("Card03", "Gen02", "Fri"));
    assert_eq!(by_day[5], ("Gen02", "", "Sat"));
    assert_eq!(by_day[6], ("Card03", "", "Sun"));
}

#[test]
fn test_b_role_lags_a_by_one_day() {
    let mut inputs = mock_inputs(3, 2, date(2025, 3, 3), date(2025, 3, 16));
    inputs.cycle.pre_cycle_a = "Carryover".into();
    let solution = fixed_solution(&[date(2025, 3, 3), date(2025, 3, 10)], NAMES);
    let rows = expand(&inputs, &solution);

    assert_eq!(rows[0].day, date(2025, 3, 3));
    assert_eq!(rows[0].b.as_ref(), "Carryover");
    for pair in rows.windows(2) {
        assert_eq!(pair[1].b, pair[0].a, "B must lag A across {}", pair[1].day);
    }
}

#[test]
fn test_missing_pre_cycle_a_flags_day_one() {
    let inputs = mock_inputs(3, 2, date(2025, 1, 6), date(2025, 1, 12));
    let solution = fixed_solution(&[date(2025, 1, 6)], NAMES);
    let rows = expand(&inputs, &solution);
    assert!(rows[0].flags.contains("MISSING_B"));
    assert!(!rows[1].flags.contains("MISSING_B"));
}

#[test]
fn test_days_before_first_anchor_are_unstaffed() {
    // Cycle opens on a Wednesday; the first anchored week starts the
    // following Monday.
    let inputs = mock_inputs(3, 2, date(2025, 1, 1), date(2025, 1, 12));
    let solution = fixed_solution(&[date(2025, 1, 6)], NAMES);
    let rows = expand(&inputs, &solution);

    for row in &rows[..5] {
        assert!(row.a.is_empty(), "{} should be unstaffed", row.day);
        assert!(row.flags.contains("MISSING_A"));
    }
    assert_eq!(rows[5].a.as_ref(), "Card01");
}

#[test]
fn test_leave_and_bank_holiday_flags() {
    let mut inputs = mock_inputs(3, 2, date(2025, 1, 6), date(2025, 1, 12));
    let mut away = DaySet::new();
    insert_day_range(&mut away, date(2025, 1, 7), date(2025, 1, 7));
    inputs.leave.insert("Card02".into(), away);
    insert_day_range(
        &mut inputs.bank_holidays,
        date(2025, 1, 8),
        date(2025, 1, 8),
    );

    let solution = fixed_solution(&[date(2025, 1, 6)], NAMES);
    let rows = expand(&inputs, &solution);

    // Tuesday: Card02 is on leave while holding A; Wednesday: bank holiday,
    // and Card02 appears again as Wednesday's B without a leave flag.
    assert!(rows[1].flags.contains("A_ON_LEAVE"), "flags: {}", rows[1].flags);
    assert!(rows[2].flags.contains("BANK_HOLIDAY"));
    assert!(!rows[2].flags.contains("B_ON_LEAVE"));
}

#[test]
fn test_cardiac_xor_breach_flag() {
    let inputs = mock_inputs(3, 2, date(2025, 1, 6), date(2025, 1, 12));
    // Every pairing of A- and D-side holders is cardiac/cardiac: each
    // weekday breaches.
    let solution = fixed_solution(
        &[date(2025, 1, 6)],
        ["Card01", "Card02", "Card03", "Card01", "Card02"],
    );
    let rows = expand(&inputs, &solution);
    for row in &rows[..5] {
        assert!(
            row.flags.contains("CARDIAC_XOR_BREACH"),
            "{} flags: {}",
            row.day,
            row.flags
        );
    }
    // Weekend days carry no XOR obligation.
    assert!(!rows[5].flags.contains("CARDIAC_XOR_BREACH"));
    assert!(!rows[6].flags.contains("CARDIAC_XOR_BREACH"));
}

#[test]
fn test_expansion_is_deterministic() {
    let inputs = mock_inputs(3, 2, date(2025, 1, 6), date(2025, 1, 19));
    let solution = fixed_solution(&[date(2025, 1, 6), date(2025, 1, 13)], NAMES);
    assert_eq!(expand(&inputs, &solution), expand(&inputs, &solution));
}
