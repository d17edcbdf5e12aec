//! Validation of machine details typed into a form or on the command line.

use chrono::NaiveDate;

use crate::codec::DATE_FORMAT;
use crate::error::{Result, SchedulerError};
use crate::models::{MachineRecord, UsageFrequency};

/// Parses a `YYYY-MM-DD` date typed by the user.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| SchedulerError::InvalidInput(format!("Invalid date '{}': {}. Use YYYY-MM-DD.", s, e)))
}

/// Validates form input and builds the machine record.
///
/// The name must not be blank; any frequency string is accepted.
pub fn machine_from_input(name: &str, last_serviced: &str, frequency: &str) -> Result<MachineRecord> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SchedulerError::InvalidInput("Machine name is required.".to_string()));
    }
    Ok(MachineRecord {
        name: name.to_string(),
        last_serviced: parse_date(last_serviced)?,
        usage_frequency: UsageFrequency::from(frequency.trim().to_lowercase()),
    })
}
