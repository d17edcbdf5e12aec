use maintsched::advisory::FixedSequence;
use maintsched::draft::{DraftSlot, FormDraft, FORM_DRAFT_KEY};
use maintsched::error::{SchedulerError, StoreError};
use maintsched::input::{machine_from_input, parse_date};
use maintsched::machines::MACHINES_KEY;
use maintsched::planner::MaintenancePlanner;
use maintsched::store::{JsonFileStore, MemoryStore, Store};
use chrono::NaiveDate;
use tempfile::tempdir;

fn planner() -> MaintenancePlanner<MemoryStore> {
    MaintenancePlanner::open(MemoryStore::new(), Box::new(FixedSequence::new(vec![0]))).unwrap()
}

#[test]
fn test_operations_without_a_schedule_fail() {
    let mut p = planner();
    let dir = tempdir().unwrap();

    assert!(p.current().is_none());
    assert!(matches!(p.save_current(), Err(SchedulerError::NoActiveSchedule)));
    assert!(matches!(p.export_json(dir.path()), Err(SchedulerError::NoActiveSchedule)));
    assert!(matches!(p.checklists(), Err(SchedulerError::NoActiveSchedule)));
    assert!(p.saved().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_submit_records_machine_and_sets_session() {
    let mut p = planner();
    let machine = machine_from_input("  CNC Mill 3 ", "2024-01-01", "Weekly").unwrap();
    let active = p.submit(machine).unwrap();
    assert_eq!(active.machine.name, "CNC Mill 3");
    assert_eq!(active.schedule.tasks.len(), 3);

    assert_eq!(p.machines().entries().len(), 1);
    let entry = &p.machines().entries()[0];
    assert_eq!(entry.name, "CNC Mill 3");
    assert_eq!(entry.last_serviced_date, "2024-01-01");
    assert_eq!(entry.schedule.len(), 3);
    // Submitting does not save.
    assert!(p.saved().is_empty());
}

#[test]
fn test_save_and_load_restore_the_schedule() {
    let mut p = planner();
    let machine = machine_from_input("Hydraulic Press", "2024-02-01", "daily").unwrap();
    let generated = p.submit(machine).unwrap().clone();
    let record = p.save_current().unwrap();
    assert_eq!(p.saved().len(), 1);

    p.reset();
    assert!(p.current().is_none());

    let loaded = p.load(record.id).unwrap();
    assert_eq!(loaded, &generated);
}

#[test]
fn test_load_unknown_id_leaves_session_alone() {
    let mut p = planner();
    let machine = machine_from_input("Lathe", "2024-01-01", "monthly").unwrap();
    p.submit(machine).unwrap();

    assert!(matches!(p.load(42), Err(SchedulerError::NotFound(42))));
    assert_eq!(p.current().map(|a| a.machine.name.as_str()), Some("Lathe"));
}

#[test]
fn test_delete_keeps_the_loaded_session() {
    let mut p = planner();
    let machine = machine_from_input("Conveyor 1", "2024-01-01", "weekly").unwrap();
    p.submit(machine).unwrap();
    let record = p.save_current().unwrap();
    p.load(record.id).unwrap();

    p.delete(record.id).unwrap();
    assert!(p.saved().is_empty());
    assert!(p.find_saved(record.id).is_none());
    assert!(p.current().is_some());
}

#[test]
fn test_failed_machine_log_write_fails_submit() {
    let mut store = MemoryStore::with_quota(8);
    store.insert_raw(MACHINES_KEY, "[]");
    let mut p = MaintenancePlanner::open(store, Box::new(FixedSequence::new(vec![0]))).unwrap();
    let machine = machine_from_input("Pump", "2024-01-01", "weekly").unwrap();

    let err = p.submit(machine).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Persistence(StoreError::QuotaExceeded { .. })
    ));
    assert!(p.current().is_none());
    assert!(p.machines().entries().is_empty());
}

#[test]
fn test_checklists_follow_task_order() {
    let mut p = planner();
    let machine = machine_from_input("Lathe", "2024-01-01", "weekly").unwrap();
    p.submit(machine).unwrap();

    let lists = p.checklists().unwrap();
    let titles: Vec<&str> = lists.iter().map(|(_, c)| c.title).collect();
    assert_eq!(lists.len(), 3);
    assert_eq!(lists[0].0.name, "Check oil levels");
    assert!(titles.iter().all(|t| !t.is_empty()));
    assert!(lists.iter().all(|(_, c)| !c.steps.is_empty()));
}

#[test]
fn test_planner_reopens_from_disk() {
    let dir = tempdir().unwrap();
    let open = || {
        let store = JsonFileStore::open(dir.path()).unwrap();
        MaintenancePlanner::open(store, Box::new(FixedSequence::new(vec![1]))).unwrap()
    };

    let mut p = open();
    p.submit(machine_from_input("CNC Mill 3", "2024-01-01", "weekly").unwrap()).unwrap();
    p.save_current().unwrap();
    p.submit(machine_from_input("Press 2", "2024-01-01", "daily").unwrap()).unwrap();
    drop(p);

    let p = open();
    assert_eq!(p.saved().len(), 1);
    assert_eq!(p.machines().entries().len(), 2);
    assert!(p.current().is_none());
    assert!(p.repository().store().get(MACHINES_KEY).unwrap().is_some());
}

#[test]
fn test_input_validation() {
    assert!(matches!(
        machine_from_input("   ", "2024-01-01", "weekly"),
        Err(SchedulerError::InvalidInput(_))
    ));
    assert!(matches!(
        machine_from_input("Lathe", "01/02/2024", "weekly"),
        Err(SchedulerError::InvalidInput(_))
    ));
    assert_eq!(parse_date(" 2024-02-29 ").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert!(parse_date("2023-02-29").is_err());
}

#[test]
fn test_form_draft_survives_reopen_and_clears_on_submit() {
    let dir = tempdir().unwrap();
    let open = || {
        let store = JsonFileStore::open(dir.path()).unwrap();
        MaintenancePlanner::open(store, Box::new(FixedSequence::new(vec![0]))).unwrap()
    };

    let mut p = open();
    assert_eq!(p.draft().unwrap(), None);
    let draft = FormDraft {
        machine_name: "CNC Mill 3".to_string(),
        last_serviced_date: "2024-01-0".to_string(),
        usage_frequency: None,
    };
    p.save_draft(&draft).unwrap();
    drop(p);

    let raw = std::fs::read_to_string(dir.path().join("formDraft.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["machineName"], "CNC Mill 3");
    assert_eq!(value["lastServicedDate"], "2024-01-0");
    assert!(value.get("usageFrequency").is_none());

    let mut p = open();
    assert_eq!(p.draft().unwrap(), Some(draft));

    p.submit(machine_from_input("CNC Mill 3", "2024-01-01", "weekly").unwrap()).unwrap();
    assert_eq!(p.draft().unwrap(), None);
    drop(p);
    assert_eq!(open().draft().unwrap(), None);
}

#[test]
fn test_failed_submit_keeps_the_draft() {
    let draft = FormDraft {
        machine_name: "Lathe".to_string(),
        last_serviced_date: "2024-01-01".to_string(),
        usage_frequency: Some("daily".to_string()),
    };
    let mut store = MemoryStore::new();
    store.insert_raw(FORM_DRAFT_KEY, serde_json::to_string(&draft).unwrap());
    store.set_quota(Some(8));
    let mut p = MaintenancePlanner::open(store, Box::new(FixedSequence::new(vec![0]))).unwrap();
    assert!(p.submit(machine_from_input("Lathe", "2024-01-01", "daily").unwrap()).is_err());
    assert_eq!(p.draft().unwrap(), Some(draft));
}

#[test]
fn test_draft_slot_edge_cases() {
    let mut slot = DraftSlot::new(MemoryStore::new());
    assert_eq!(slot.load().unwrap(), None);

    slot.save(&FormDraft {
        machine_name: "Press".to_string(),
        ..FormDraft::default()
    })
    .unwrap();
    assert!(slot.load().unwrap().is_some());

    // Saving an emptied form clears the slot.
    slot.save(&FormDraft {
        usage_frequency: Some(String::new()),
        ..FormDraft::default()
    })
    .unwrap();
    assert_eq!(slot.load().unwrap(), None);

    let mut store = MemoryStore::new();
    store.insert_raw(FORM_DRAFT_KEY, r#""Lathe""#);
    let slot = DraftSlot::new(store);
    assert!(matches!(
        slot.load(),
        Err(SchedulerError::Persistence(StoreError::Corrupt { .. }))
    ));
}
