use super::*;
use crate::workbook::{Workbook, WorkbookConfig};
use rota_scheduler_core::model::consultant::Consultant;
use std::collections::{BTreeMap, BTreeSet};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn empty_workbook() -> Workbook {
    Workbook {
        config: WorkbookConfig {
            cycle_start: date(2025, 1, 6),
            cycle_end: date(2025, 2, 2),
            pre_cycle_a: "".into(),
        },
        consultants: vec![Consultant {
            name: "Gen01".into(),
            cardiac: false,
            wte: 1.0,
            eligible_a: true,
            eligible_d: true,
            active: true,
        }],
        leave: BTreeMap::new(),
        bank_holidays: BTreeSet::new(),
        week_assignments: Vec::new(),
        rota: Vec::new(),
        dashboard: Vec::new(),
    }
}

#[test]
fn test_create_and_reload() {
    let dir = tempdir().unwrap();
    let store = LeaveStore::open(dir.path().join("requests")).unwrap();

    let request = store
        .create(
            " Gen01 ",
            date(2025, 1, 13),
            date(2025, 1, 17),
            LeaveType::Annual,
            true,
            "conference",
        )
        .unwrap();
    assert_eq!(request.name.as_ref(), "Gen01");

    let loaded = store.get(request.request_id).unwrap();
    assert_eq!(loaded, request);
    assert!(store
        .dir()
        .join(format!("{}.json", request.request_id))
        .exists());
}

#[test]
fn test_inverted_dates_are_rejected() {
    let dir = tempdir().unwrap();
    let store = LeaveStore::open(dir.path().join("requests")).unwrap();
    let err = store
        .create(
            "Gen01",
            date(2025, 1, 17),
            date(2025, 1, 13),
            LeaveType::Study,
            true,
            "",
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::LeaveValidation { .. }));
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_load_all_sorts_and_skips_unreadable() {
    let dir = tempdir().unwrap();
    let store = LeaveStore::open(dir.path().join("requests")).unwrap();

    store
        .create("Zed", date(2025, 1, 13), date(2025, 1, 14), LeaveType::Noc, true, "")
        .unwrap();
    store
        .create("Abe", date(2025, 1, 13), date(2025, 1, 14), LeaveType::Annual, true, "")
        .unwrap();
    store
        .create("Abe", date(2025, 1, 6), date(2025, 1, 7), LeaveType::Annual, true, "")
        .unwrap();
    std::fs::write(store.dir().join("broken.json"), "not json").unwrap();
    std::fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

    let all = store.load_all().unwrap();
    let order: Vec<(&str, NaiveDate)> = all
        .iter()
        .map(|r| (r.name.as_ref(), r.start_date))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Abe", date(2025, 1, 6)),
            ("Abe", date(2025, 1, 13)),
            ("Zed", date(2025, 1, 13)),
        ]
    );
}

#[test]
fn test_upsert_touches_timestamp_and_delete_removes() {
    let dir = tempdir().unwrap();
    let store = LeaveStore::open(dir.path().join("requests")).unwrap();
    let mut request = store
        .create("Gen01", date(2025, 1, 13), date(2025, 1, 14), LeaveType::Annual, false, "")
        .unwrap();

    request.approved = true;
    store.upsert(&mut request).unwrap();
    let loaded = store.get(request.request_id).unwrap();
    assert!(loaded.approved);

    store.delete(request.request_id).unwrap();
    assert!(matches!(
        store.get(request.request_id),
        Err(StoreError::UnknownRequest(_))
    ));
    assert!(matches!(
        store.delete(request.request_id),
        Err(StoreError::UnknownRequest(_))
    ));
}

#[test]
fn test_compile_replaces_leave_region() {
    let dir = tempdir().unwrap();
    let store = LeaveStore::open(dir.path().join("requests")).unwrap();
    store
        .create("Gen01", date(2025, 1, 13), date(2025, 1, 17), LeaveType::Annual, true, "")
        .unwrap();
    store
        .create("Gen01", date(2025, 1, 27), date(2025, 1, 28), LeaveType::Study, false, "")
        .unwrap();

    let mut workbook = empty_workbook();
    // A stale row that the compile step must wipe, not merge.
    workbook.replace_leave_region(vec![crate::workbook::LeaveRow {
        name: "Stale".into(),
        start: date(2024, 12, 1),
        end: date(2024, 12, 2),
        leave_type: LeaveType::Annual,
        approved: true,
    }]);

    let count = store.compile_into(&mut workbook).unwrap();
    assert_eq!(count, 2);
    assert_eq!(workbook.leave.len(), 2);
    assert!(workbook.leave.values().all(|r| r.name.as_ref() == "Gen01"));
    // Unapproved rows are compiled too; the engine filters them later.
    assert_eq!(
        workbook.leave.values().filter(|r| r.approved).count(),
        1
    );
}

#[test]
fn test_leave_type_normalization() {
    assert_eq!(LeaveType::normalize("annual"), LeaveType::Annual);
    assert_eq!(LeaveType::normalize(" NOC "), LeaveType::Noc);
    assert_eq!(LeaveType::normalize("Study"), LeaveType::Study);
    assert_eq!(LeaveType::normalize("sabbatical"), LeaveType::Annual);
}
