use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SchedulerError, StoreError};
use crate::models::{GeneratedSchedule, MachineRecord, SavedScheduleRecord};
use crate::store::Store;

/// Store key holding every saved schedule.
pub const SAVED_SCHEDULES_KEY: &str = "savedSchedules";

/// Persisted form: the records plus the id the next save will get.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedSchedules<'a> {
    next_id: u64,
    schedules: &'a [SavedScheduleRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSchedules {
    #[serde(rename_all = "camelCase")]
    Current {
        next_id: u64,
        schedules: Vec<SavedScheduleRecord>,
    },
    // Bare array written before the id counter was stored.
    Legacy(Vec<SavedScheduleRecord>),
}

/// Saved schedules, held in save order and written back to the store as a whole
/// after every change.
///
/// The store is read once, in [`ScheduleRepository::open`]; afterwards the
/// in-memory list is authoritative.
#[derive(Debug)]
pub struct ScheduleRepository<S> {
    store: S,
    records: Vec<SavedScheduleRecord>,
    next_id: u64,
}

impl<S: Store> ScheduleRepository<S> {
    /// Loads saved schedules from `store`. A missing key means no schedules.
    pub fn open(store: S) -> Result<Self> {
        let stored = match store.get(SAVED_SCHEDULES_KEY)? {
            Some(value) => serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
                key: SAVED_SCHEDULES_KEY.to_string(),
                message: e.to_string(),
            })?,
            None => StoredSchedules::Legacy(Vec::new()),
        };
        let (records, stored_next) = match stored {
            StoredSchedules::Current { next_id, schedules } => (schedules, next_id),
            StoredSchedules::Legacy(schedules) => (schedules, 1),
        };
        let max_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        let next_id = stored_next.max(max_id + 1);
        let repo = ScheduleRepository { store, records, next_id };
        debug!(count = repo.records.len(), "opened schedule repository");
        Ok(repo)
    }

    /// Persists a generated schedule and returns the stored record.
    ///
    /// Ids are never reused, including ids of deleted records. On a failed
    /// write the record is not kept in memory either.
    pub fn save(
        &mut self,
        schedule: &GeneratedSchedule,
        machine: &MachineRecord,
        generated_at: DateTime<Utc>,
    ) -> Result<SavedScheduleRecord> {
        let id = self.next_id;
        let record = SavedScheduleRecord::encode(id, schedule, machine, generated_at, Utc::now());
        self.records.push(record.clone());
        self.next_id += 1;
        if let Err(e) = self.persist() {
            self.records.pop();
            self.next_id = id;
            warn!(id, error = %e, "save rolled back");
            return Err(e.into());
        }
        info!(id, machine = %record.machine_name, "schedule saved");
        Ok(record)
    }

    /// Saved schedules in save order.
    pub fn list(&self) -> &[SavedScheduleRecord] {
        &self.records
    }

    pub fn find_by_id(&self, id: u64) -> Option<&SavedScheduleRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Removes the schedule with `id`. Unknown ids are a no-op.
    ///
    /// Confirmation is the caller's job.
    pub fn delete_by_id(&mut self, id: u64) -> Result<()> {
        let Some(idx) = self.records.iter().position(|r| r.id == id) else {
            debug!(id, "delete of unknown schedule ignored");
            return Ok(());
        };
        let removed = self.records.remove(idx);
        if let Err(e) = self.persist() {
            self.records.insert(idx, removed);
            warn!(id, error = %e, "delete rolled back");
            return Err(e.into());
        }
        info!(id, machine = %removed.machine_name, "schedule deleted");
        Ok(())
    }

    /// Rehydrates a saved schedule for display. Does not change the repository.
    pub fn load(&self, id: u64) -> Result<GeneratedSchedule> {
        let record = self.find_by_id(id).ok_or(SchedulerError::NotFound(id))?;
        Ok(record.decode()?)
    }

    fn persist(&mut self) -> std::result::Result<(), StoreError> {
        let value = serde_json::to_value(SavedSchedules {
            next_id: self.next_id,
            schedules: &self.records,
        })?;
        self.store.set(SAVED_SCHEDULES_KEY, &value)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
