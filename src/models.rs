use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::{decode_date, encode_date};
use crate::error::StoreError;

/// How often a machine is run.
///
/// Unrecognized values are kept verbatim in `Other` rather than rejected; they
/// schedule with the monthly spacing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UsageFrequency {
    Daily,
    Weekly,
    Monthly,
    Other(String),
}

impl UsageFrequency {
    /// Spacing in days between consecutive maintenance tasks.
    pub fn offset_days(&self) -> i64 {
        match self {
            UsageFrequency::Daily => 1,
            UsageFrequency::Weekly => 7,
            UsageFrequency::Monthly => 30,
            UsageFrequency::Other(_) => 30,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UsageFrequency::Daily => "daily",
            UsageFrequency::Weekly => "weekly",
            UsageFrequency::Monthly => "monthly",
            UsageFrequency::Other(s) => s,
        }
    }

    /// `weekly` -> `Weekly`, as shown in reports.
    pub fn capitalized(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<&str> for UsageFrequency {
    fn from(s: &str) -> Self {
        match s {
            "daily" => UsageFrequency::Daily,
            "weekly" => UsageFrequency::Weekly,
            "monthly" => UsageFrequency::Monthly,
            other => UsageFrequency::Other(other.to_string()),
        }
    }
}

impl From<String> for UsageFrequency {
    fn from(s: String) -> Self {
        UsageFrequency::from(s.as_str())
    }
}

impl From<UsageFrequency> for String {
    fn from(f: UsageFrequency) -> Self {
        match f {
            UsageFrequency::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for UsageFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The machine a schedule is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRecord {
    /// Machine name as entered; not validated here.
    pub name: String,
    pub last_serviced: NaiveDate,
    pub usage_frequency: UsageFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(s)
    }
}

/// Task status. `Overdue` is never stored; see [`MaintenanceTask::effective_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Scheduled,
    Overdue,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Scheduled => "Scheduled",
            TaskStatus::Overdue => "Overdue",
            TaskStatus::Completed => "Completed",
        };
        f.write_str(s)
    }
}

/// A single dated maintenance task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceTask {
    pub id: Uuid,
    pub name: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: TaskStatus,
    pub description: String,
}

impl MaintenanceTask {
    /// Status as displayed on `today`. A scheduled task becomes overdue at the
    /// start of its due day, so one due today already shows as overdue.
    pub fn effective_status(&self, today: NaiveDate) -> TaskStatus {
        match self.status {
            TaskStatus::Scheduled if self.due_date <= today => TaskStatus::Overdue,
            status => status,
        }
    }
}

/// Output of the generator: ordered tasks plus one advisory message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSchedule {
    pub tasks: Vec<MaintenanceTask>,
    pub advisory: String,
}

/// A task as persisted, with its due date in string form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavedTask {
    pub id: Uuid,
    pub name: String,
    pub due_date: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub description: String,
}

impl SavedTask {
    pub fn encode(task: &MaintenanceTask) -> Self {
        SavedTask {
            id: task.id,
            name: task.name.clone(),
            due_date: encode_date(task.due_date),
            priority: task.priority,
            status: task.status,
            description: task.description.clone(),
        }
    }

    pub fn decode(&self) -> Result<MaintenanceTask, String> {
        Ok(MaintenanceTask {
            id: self.id,
            name: self.name.clone(),
            due_date: decode_date(&self.due_date)?,
            priority: self.priority,
            status: self.status,
            description: self.description.clone(),
        })
    }
}

/// A schedule persisted by the repository.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavedScheduleRecord {
    pub id: u64,
    pub machine_name: String,
    pub last_serviced_date: String,
    pub usage_frequency: UsageFrequency,
    pub tasks: Vec<SavedTask>,
    pub advisory: String,
    pub saved_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

impl SavedScheduleRecord {
    /// Builds the persisted form of a generated schedule.
    pub fn encode(
        id: u64,
        schedule: &GeneratedSchedule,
        machine: &MachineRecord,
        generated_at: DateTime<Utc>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        SavedScheduleRecord {
            id,
            machine_name: machine.name.clone(),
            last_serviced_date: encode_date(machine.last_serviced),
            usage_frequency: machine.usage_frequency.clone(),
            tasks: schedule.tasks.iter().map(SavedTask::encode).collect(),
            advisory: schedule.advisory.clone(),
            saved_at,
            generated_at,
        }
    }

    /// Rehydrates the schedule, parsing every stored date.
    pub fn decode(&self) -> Result<GeneratedSchedule, StoreError> {
        let tasks = self
            .tasks
            .iter()
            .map(SavedTask::decode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| self.corrupt(message))?;
        Ok(GeneratedSchedule {
            tasks,
            advisory: self.advisory.clone(),
        })
    }

    /// The machine this record was generated from.
    pub fn machine(&self) -> Result<MachineRecord, StoreError> {
        Ok(MachineRecord {
            name: self.machine_name.clone(),
            last_serviced: decode_date(&self.last_serviced_date).map_err(|m| self.corrupt(m))?,
            usage_frequency: self.usage_frequency.clone(),
        })
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// First task due strictly after `today`, in schedule order.
    pub fn next_due(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.tasks
            .iter()
            .filter_map(|t| decode_date(&t.due_date).ok())
            .find(|d| *d > today)
    }

    fn corrupt(&self, message: String) -> StoreError {
        StoreError::Corrupt {
            key: format!("schedule {}", self.id),
            message,
        }
    }
}

/// An entry in the machine history, written on every form submission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MachineEntry {
    pub id: u64,
    pub name: String,
    pub last_serviced_date: String,
    pub usage_frequency: UsageFrequency,
    pub schedule: Vec<SavedTask>,
    pub advisory: String,
    pub created_at: DateTime<Utc>,
}
