use chrono::{DateTime, Utc};

use crate::error::{Result, SchedulerError, StoreError};
use crate::models::{GeneratedSchedule, MachineRecord, SavedScheduleRecord};

/// A schedule together with the machine it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSchedule {
    pub machine: MachineRecord,
    pub schedule: GeneratedSchedule,
    pub generated_at: DateTime<Utc>,
}

impl ActiveSchedule {
    /// Rebuilds the active form of a saved record.
    pub fn from_record(record: &SavedScheduleRecord) -> std::result::Result<Self, StoreError> {
        Ok(ActiveSchedule {
            machine: record.machine()?,
            schedule: record.decode()?,
            generated_at: record.generated_at,
        })
    }
}

/// Holds the schedule currently being worked on, if any.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<ActiveSchedule>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever the session held.
    pub fn set(&mut self, active: ActiveSchedule) -> &ActiveSchedule {
        self.current.insert(active)
    }

    pub fn current(&self) -> Option<&ActiveSchedule> {
        self.current.as_ref()
    }

    /// The current schedule, or [`SchedulerError::NoActiveSchedule`].
    pub fn require(&self) -> Result<&ActiveSchedule> {
        self.current.as_ref().ok_or(SchedulerError::NoActiveSchedule)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}
