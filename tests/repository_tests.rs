use maintsched::advisory::FixedSequence;
use maintsched::error::{SchedulerError, StoreError};
use maintsched::generator::generate;
use maintsched::models::{GeneratedSchedule, MachineRecord, UsageFrequency};
use maintsched::repository::{ScheduleRepository, SAVED_SCHEDULES_KEY};
use maintsched::store::{JsonFileStore, MemoryStore, Store};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tempfile::tempdir;

fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap()
}

fn fixture(name: &str, frequency: &str) -> (MachineRecord, GeneratedSchedule) {
    let machine = MachineRecord {
        name: name.to_string(),
        last_serviced: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        usage_frequency: UsageFrequency::from(frequency),
    };
    let schedule = generate(&machine, generated_at(), &mut FixedSequence::new(vec![2]));
    (machine, schedule)
}

#[test]
fn test_save_then_load_round_trips() {
    let mut repo = ScheduleRepository::open(MemoryStore::new()).unwrap();
    let (machine, schedule) = fixture("CNC Mill 3", "weekly");

    let record = repo.save(&schedule, &machine, generated_at()).unwrap();
    assert_eq!(record.id, 1);
    assert_eq!(record.machine_name, "CNC Mill 3");
    assert_eq!(record.last_serviced_date, "2024-01-01");
    assert_eq!(record.tasks[0].due_date, "2024-01-08");
    assert_eq!(record.generated_at, generated_at());

    let loaded = repo.load(record.id).unwrap();
    assert_eq!(loaded, schedule);
    assert_eq!(record.machine().unwrap(), machine);
}

#[test]
fn test_save_then_delete_leaves_store_empty() {
    let mut repo = ScheduleRepository::open(MemoryStore::new()).unwrap();
    let (machine, schedule) = fixture("CNC Mill 3", "weekly");

    let record = repo.save(&schedule, &machine, generated_at()).unwrap();
    assert_eq!(repo.list().len(), 1);

    repo.delete_by_id(record.id).unwrap();
    assert!(repo.list().is_empty());
    let value = repo.store().get(SAVED_SCHEDULES_KEY).unwrap().unwrap();
    assert_eq!(value["schedules"], serde_json::json!([]));
    assert_eq!(value["nextId"], 2);
}

#[test]
fn test_deleted_ids_are_not_reused() {
    let mut repo = ScheduleRepository::open(MemoryStore::new()).unwrap();
    let (lathe, lathe_schedule) = fixture("Lathe A", "weekly");
    let first = repo.save(&lathe_schedule, &lathe, generated_at()).unwrap();
    repo.delete_by_id(first.id).unwrap();

    let (press, press_schedule) = fixture("Press B", "daily");
    let second = repo.save(&press_schedule, &press, generated_at()).unwrap();
    assert_ne!(first.id, second.id);

    // The counter survives a reopen even when the newest record is gone.
    repo.delete_by_id(second.id).unwrap();
    let mut reopened = ScheduleRepository::open(repo.store().clone()).unwrap();
    let third = reopened.save(&press_schedule, &press, generated_at()).unwrap();
    assert!(third.id > second.id);
    assert!(reopened.load(first.id).is_err());
}

#[test]
fn test_bare_record_array_still_loads() {
    let mut repo = ScheduleRepository::open(MemoryStore::new()).unwrap();
    let (machine, schedule) = fixture("Lathe", "weekly");
    let record = repo.save(&schedule, &machine, generated_at()).unwrap();
    let mut record = record.clone();
    record.id = 7;

    let mut store = MemoryStore::new();
    store.insert_raw(SAVED_SCHEDULES_KEY, serde_json::to_string(&vec![record]).unwrap());
    let mut repo = ScheduleRepository::open(store).unwrap();
    assert_eq!(repo.list().len(), 1);
    assert_eq!(repo.load(7).unwrap(), schedule);

    let next = repo.save(&schedule, &machine, generated_at()).unwrap();
    assert_eq!(next.id, 8);
}

#[test]
fn test_ids_increase_and_list_keeps_save_order() {
    let mut repo = ScheduleRepository::open(MemoryStore::new()).unwrap();
    for name in ["Lathe", "Press", "Pump"] {
        let (machine, schedule) = fixture(name, "monthly");
        repo.save(&schedule, &machine, generated_at()).unwrap();
    }
    repo.delete_by_id(2).unwrap();
    let (machine, schedule) = fixture("Conveyor", "daily");
    let record = repo.save(&schedule, &machine, generated_at()).unwrap();
    assert_eq!(record.id, 4);

    let names: Vec<&str> = repo.list().iter().map(|r| r.machine_name.as_str()).collect();
    assert_eq!(names, vec!["Lathe", "Pump", "Conveyor"]);
    // Listing does not change anything.
    assert_eq!(repo.list(), repo.list());
    assert_eq!(repo.list().len(), 3);
}

#[test]
fn test_delete_unknown_id_is_a_no_op() {
    let mut repo = ScheduleRepository::open(MemoryStore::new()).unwrap();
    let (machine, schedule) = fixture("Lathe", "weekly");
    repo.save(&schedule, &machine, generated_at()).unwrap();
    let before = repo.list().to_vec();

    repo.delete_by_id(99).unwrap();
    assert_eq!(repo.list(), before.as_slice());
}

#[test]
fn test_load_unknown_id_is_not_found() {
    let repo = ScheduleRepository::open(MemoryStore::new()).unwrap();
    assert!(matches!(repo.load(7), Err(SchedulerError::NotFound(7))));
}

#[test]
fn test_failed_save_is_rolled_back() {
    let mut repo = ScheduleRepository::open(MemoryStore::with_quota(16)).unwrap();
    let (machine, schedule) = fixture("CNC Mill 3", "weekly");

    let err = repo.save(&schedule, &machine, generated_at()).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Persistence(StoreError::QuotaExceeded { .. })
    ));
    assert!(repo.list().is_empty());
    assert_eq!(repo.store().raw(SAVED_SCHEDULES_KEY), None);
}

#[test]
fn test_failed_delete_is_rolled_back() {
    let mut repo = ScheduleRepository::open(MemoryStore::new()).unwrap();
    let (machine, schedule) = fixture("CNC Mill 3", "weekly");
    let record = repo.save(&schedule, &machine, generated_at()).unwrap();

    repo.store_mut().set_quota(Some(1));
    assert!(repo.delete_by_id(record.id).is_err());
    assert_eq!(repo.list().len(), 1);
    assert_eq!(repo.list()[0].id, record.id);
}

#[test]
fn test_corrupt_store_is_reported() {
    let mut store = MemoryStore::new();
    store.insert_raw(SAVED_SCHEDULES_KEY, "{ not json");
    let err = ScheduleRepository::open(store).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Persistence(StoreError::Corrupt { .. })
    ));

    let mut store = MemoryStore::new();
    store.insert_raw(SAVED_SCHEDULES_KEY, r#"{"id": 1}"#);
    assert!(ScheduleRepository::open(store).is_err());
}

#[test]
fn test_saved_record_uses_camel_case_keys() {
    let mut repo = ScheduleRepository::open(MemoryStore::new()).unwrap();
    let (machine, schedule) = fixture("CNC Mill 3", "weekly");
    repo.save(&schedule, &machine, generated_at()).unwrap();

    let value = repo.store().get(SAVED_SCHEDULES_KEY).unwrap().unwrap();
    let first = &value["schedules"][0];
    assert_eq!(first["machineName"], "CNC Mill 3");
    assert_eq!(first["lastServicedDate"], "2024-01-01");
    assert_eq!(first["usageFrequency"], "weekly");
    assert_eq!(first["tasks"][1]["dueDate"], "2024-01-15");
    assert_eq!(first["tasks"][0]["priority"], "High");
    assert!(first["savedAt"].is_string());
}

#[test]
fn test_json_file_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let (machine, schedule) = fixture("Hydraulic Press", "daily");

    let id = {
        let store = JsonFileStore::open(dir.path()).unwrap();
        let mut repo = ScheduleRepository::open(store).unwrap();
        repo.save(&schedule, &machine, generated_at()).unwrap().id
    };

    let store = JsonFileStore::open(dir.path()).unwrap();
    let repo = ScheduleRepository::open(store).unwrap();
    assert_eq!(repo.list().len(), 1);
    assert_eq!(repo.load(id).unwrap(), schedule);
    assert!(dir.path().join("savedSchedules.json").exists());
}

#[test]
fn test_json_file_store_missing_and_empty_files() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("nested")).unwrap();
    assert!(store.get("machines").unwrap().is_none());

    std::fs::write(store.dir().join("machines.json"), "  \n").unwrap();
    assert!(store.get("machines").unwrap().is_none());

    std::fs::write(store.dir().join("machines.json"), "[1,").unwrap();
    assert!(matches!(store.get("machines"), Err(StoreError::Corrupt { .. })));
}
