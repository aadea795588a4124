use super::*;
use rota_scheduler_core::model::consultant::day_ordinal;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn consultant(name: &str, cardiac: bool, active: bool) -> Consultant {
    Consultant {
        name: name.into(),
        cardiac,
        wte: 1.0,
        eligible_a: true,
        eligible_d: true,
        active,
    }
}

fn sample_workbook() -> Workbook {
    Workbook {
        config: WorkbookConfig {
            cycle_start: date(2025, 1, 6),
            cycle_end: date(2025, 2, 2),
            pre_cycle_a: "Card01".into(),
        },
        consultants: vec![
            consultant("Card01", true, true),
            consultant("Gen01", false, true),
            consultant("Gone01", false, false),
        ],
        leave: BTreeMap::new(),
        bank_holidays: BTreeSet::new(),
        week_assignments: Vec::new(),
        rota: Vec::new(),
        dashboard: Vec::new(),
    }
}

fn leave_row(name: &str, start: NaiveDate, end: NaiveDate, approved: bool) -> LeaveRow {
    LeaveRow {
        name: name.into(),
        start,
        end,
        leave_type: LeaveType::Annual,
        approved,
    }
}

#[test]
fn test_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workbook.json");

    let mut workbook = sample_workbook();
    workbook
        .leave
        .insert(2, leave_row("Gen01", date(2025, 1, 13), date(2025, 1, 17), true));
    workbook.bank_holidays.insert(date(2025, 1, 1));
    workbook.save(&path).unwrap();

    let loaded = Workbook::load(&path).unwrap();
    assert_eq!(loaded.config.cycle_start, date(2025, 1, 6));
    assert_eq!(loaded.consultants.len(), 3);
    assert_eq!(loaded.leave.get(&2), workbook.leave.get(&2));
    assert!(loaded.bank_holidays.contains(&date(2025, 1, 1)));
}

#[test]
fn test_malformed_workbook_is_a_shape_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workbook.json");
    std::fs::write(&path, r#"{ "config": { "cycle_start": "not-a-date" } }"#).unwrap();
    assert!(matches!(
        Workbook::load(&path),
        Err(StoreError::Shape { .. })
    ));

    assert!(matches!(
        Workbook::load(&dir.path().join("absent.json")),
        Err(StoreError::Io { .. })
    ));
}

#[test]
fn test_engine_inputs_flatten_approved_leave_only() {
    let mut workbook = sample_workbook();
    workbook
        .leave
        .insert(2, leave_row("Gen01", date(2025, 1, 13), date(2025, 1, 14), true));
    // Unapproved rows, unknown names and inactive consultants are skipped.
    workbook
        .leave
        .insert(3, leave_row("Gen01", date(2025, 1, 20), date(2025, 1, 21), false));
    workbook
        .leave
        .insert(4, leave_row("Nobody", date(2025, 1, 13), date(2025, 1, 14), true));
    workbook
        .leave
        .insert(5, leave_row("Gone01", date(2025, 1, 13), date(2025, 1, 14), true));

    let inputs = workbook.engine_inputs().unwrap();
    assert_eq!(inputs.roster.len(), 2);
    let gen01 = inputs.leave.get("Gen01").unwrap();
    assert!(gen01.contains(day_ordinal(date(2025, 1, 13))));
    assert!(gen01.contains(day_ordinal(date(2025, 1, 14))));
    assert!(!gen01.contains(day_ordinal(date(2025, 1, 20))));
    assert!(!inputs.leave.contains_key("Nobody"));
    assert!(!inputs.leave.contains_key("Gone01"));
}

#[test]
fn test_engine_inputs_require_active_consultants() {
    let mut workbook = sample_workbook();
    for c in workbook.consultants.iter_mut() {
        c.active = false;
    }
    assert!(matches!(
        workbook.engine_inputs(),
        Err(StoreError::Input(_))
    ));
}

#[test]
fn test_leave_rows_keep_stable_numbers() {
    let mut workbook = sample_workbook();
    assert_eq!(workbook.next_empty_leave_row(), FIRST_ROW);
    workbook
        .leave
        .insert(2, leave_row("Gen01", date(2025, 1, 13), date(2025, 1, 14), true));
    workbook
        .leave
        .insert(3, leave_row("Card01", date(2025, 1, 20), date(2025, 1, 21), true));
    assert_eq!(workbook.next_empty_leave_row(), 4);

    // Deleting clears the row without shifting its neighbours, and the
    // freed number is reused for the next insert.
    assert!(workbook.clear_leave_row(2));
    assert!(!workbook.clear_leave_row(2));
    assert_eq!(workbook.leave.get(&3).unwrap().name.as_ref(), "Card01");
    assert_eq!(workbook.next_empty_leave_row(), 2);
}

#[test]
fn test_replace_leave_region_never_merges() {
    let mut workbook = sample_workbook();
    workbook
        .leave
        .insert(7, leave_row("Gen01", date(2025, 1, 13), date(2025, 1, 14), true));

    workbook.replace_leave_region(vec![
        leave_row("Card01", date(2025, 1, 6), date(2025, 1, 7), true),
        leave_row("Gen01", date(2025, 1, 20), date(2025, 1, 21), false),
    ]);
    assert_eq!(workbook.leave.len(), 2);
    let rows: Vec<u32> = workbook.leave.keys().copied().collect();
    assert_eq!(rows, vec![FIRST_ROW, FIRST_ROW + 1]);
    assert_eq!(workbook.leave.get(&FIRST_ROW).unwrap().name.as_ref(), "Card01");
}
