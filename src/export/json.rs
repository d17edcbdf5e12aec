use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::{decode_date, encode_date};
use crate::error::{Result, SchedulerError};
use crate::models::{GeneratedSchedule, MachineRecord, SavedTask, UsageFrequency};
use crate::session::ActiveSchedule;

use super::{export_file_name, write_export};

/// Portable form of an active schedule. Dates are ISO-8601 strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StructuredExport {
    pub machine: String,
    pub last_serviced: String,
    pub usage_frequency: UsageFrequency,
    pub generated_on: DateTime<Utc>,
    pub tasks: Vec<SavedTask>,
    pub advisory: String,
}

impl StructuredExport {
    pub fn from_active(active: &ActiveSchedule) -> Self {
        StructuredExport {
            machine: active.machine.name.clone(),
            last_serviced: encode_date(active.machine.last_serviced),
            usage_frequency: active.machine.usage_frequency.clone(),
            generated_on: active.generated_at,
            tasks: active.schedule.tasks.iter().map(SavedTask::encode).collect(),
            advisory: active.schedule.advisory.clone(),
        }
    }

    /// Converts back into an active schedule, parsing every date.
    pub fn into_active(self) -> Result<ActiveSchedule> {
        let last_serviced = decode_date(&self.last_serviced).map_err(SchedulerError::InvalidInput)?;
        let tasks = self
            .tasks
            .iter()
            .map(SavedTask::decode)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(SchedulerError::InvalidInput)?;
        Ok(ActiveSchedule {
            machine: MachineRecord {
                name: self.machine,
                last_serviced,
                usage_frequency: self.usage_frequency,
            },
            schedule: GeneratedSchedule {
                tasks,
                advisory: self.advisory,
            },
            generated_at: self.generated_on,
        })
    }
}

/// Pretty-printed JSON for `active`.
pub fn to_json(active: &ActiveSchedule) -> Result<String> {
    Ok(serde_json::to_string_pretty(&StructuredExport::from_active(active))?)
}

pub fn parse(json: &str) -> Result<StructuredExport> {
    Ok(serde_json::from_str(json)?)
}

/// Writes `<machine>-maintenance-schedule.json` into `dir`.
pub fn write(active: &ActiveSchedule, dir: &Path) -> Result<PathBuf> {
    let json = to_json(active)?;
    let file_name = export_file_name(&active.machine.name, "json");
    write_export(dir, &file_name, json.as_bytes())
}
