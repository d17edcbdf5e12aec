use chrono::Utc;
use tracing::{debug, warn};

use crate::codec::encode_date;
use crate::error::{Result, StoreError};
use crate::models::{GeneratedSchedule, MachineEntry, MachineRecord, SavedTask};
use crate::store::Store;

/// Store key for the machine history.
pub const MACHINES_KEY: &str = "machines";

/// History of every machine a schedule was generated for, oldest first.
#[derive(Debug)]
pub struct MachineLog<S> {
    store: S,
    entries: Vec<MachineEntry>,
}

impl<S: Store> MachineLog<S> {
    pub fn open(store: S) -> Result<Self> {
        let entries = match store.get(MACHINES_KEY)? {
            Some(value) => serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
                key: MACHINES_KEY.to_string(),
                message: e.to_string(),
            })?,
            None => Vec::new(),
        };
        Ok(MachineLog { store, entries })
    }

    /// Appends an entry for `machine` and its freshly generated schedule.
    pub fn record(&mut self, machine: &MachineRecord, schedule: &GeneratedSchedule) -> Result<MachineEntry> {
        let next_id = self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let entry = MachineEntry {
            id: next_id,
            name: machine.name.clone(),
            last_serviced_date: encode_date(machine.last_serviced),
            usage_frequency: machine.usage_frequency.clone(),
            schedule: schedule.tasks.iter().map(SavedTask::encode).collect(),
            advisory: schedule.advisory.clone(),
            created_at: Utc::now(),
        };
        self.entries.push(entry.clone());
        let written = serde_json::to_value(&self.entries)
            .map_err(StoreError::from)
            .and_then(|value| self.store.set(MACHINES_KEY, &value));
        if let Err(e) = written {
            self.entries.pop();
            warn!(error = %e, "machine history write rolled back");
            return Err(e.into());
        }
        debug!(id = next_id, machine = %entry.name, "machine recorded");
        Ok(entry)
    }

    pub fn entries(&self) -> &[MachineEntry] {
        &self.entries
    }
}
