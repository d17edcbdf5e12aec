use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::advisory::{self, AdvisoryContext, TemplatePicker};
use crate::models::{GeneratedSchedule, MachineRecord, MaintenanceTask, Priority, TaskStatus};

/// A fixed maintenance task every schedule contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTemplate {
    pub name: &'static str,
    pub priority: Priority,
    pub description: &'static str,
}

/// The tasks every schedule is built from, in due order.
pub static TASK_TEMPLATES: [TaskTemplate; 3] = [
    TaskTemplate {
        name: "Check oil levels",
        priority: Priority::High,
        description: "Inspect and top up oil levels",
    },
    TaskTemplate {
        name: "Inspect belts",
        priority: Priority::Medium,
        description: "Check for wear and proper tension",
    },
    TaskTemplate {
        name: "Clean filters",
        priority: Priority::Medium,
        description: "Replace or clean air/oil filters",
    },
];

/// Derives the maintenance schedule for `machine`.
///
/// Task `i` (1-based) is due `offset * i` days after the last service, where the
/// offset comes from the usage frequency. The advisory is one of the fixed
/// templates chosen by `picker`; `now` only feeds the days-since-service figure.
pub fn generate(
    machine: &MachineRecord,
    now: DateTime<Utc>,
    picker: &mut dyn TemplatePicker,
) -> GeneratedSchedule {
    let offset = machine.usage_frequency.offset_days();

    let tasks: Vec<MaintenanceTask> = TASK_TEMPLATES
        .iter()
        .zip(1i64..)
        .map(|(tmpl, ordinal)| MaintenanceTask {
            id: Uuid::new_v4(),
            name: tmpl.name.to_string(),
            due_date: machine.last_serviced + Duration::days(offset * ordinal),
            priority: tmpl.priority,
            status: TaskStatus::Scheduled,
            description: tmpl.description.to_string(),
        })
        .collect();

    let next_task_date = tasks[0].due_date;
    let ctx = AdvisoryContext::new(machine, next_task_date, now);
    let advisory = advisory::compose(&ctx, picker);

    GeneratedSchedule { tasks, advisory }
}
