use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::advisory::TemplatePicker;
use crate::checklist::{self, Checklist};
use crate::draft::{DraftSlot, FormDraft};
use crate::error::{Result, SchedulerError};
use crate::export::document::{self, DocumentRenderer};
use crate::export::json;
use crate::generator;
use crate::machines::MachineLog;
use crate::models::{MachineRecord, MaintenanceTask, SavedScheduleRecord};
use crate::repository::ScheduleRepository;
use crate::session::{ActiveSchedule, Session};
use crate::store::Store;

/// One user's working context: saved schedules, machine history, the current
/// session and the advisory randomness source.
///
/// Every user action is a method call that runs to completion.
pub struct MaintenancePlanner<S> {
    repository: ScheduleRepository<S>,
    machines: MachineLog<S>,
    drafts: DraftSlot<S>,
    session: Session,
    picker: Box<dyn TemplatePicker>,
}

impl<S: Store + Clone> MaintenancePlanner<S> {
    /// Loads saved schedules and machine history from `store`.
    pub fn open(store: S, picker: Box<dyn TemplatePicker>) -> Result<Self> {
        Ok(MaintenancePlanner {
            repository: ScheduleRepository::open(store.clone())?,
            machines: MachineLog::open(store.clone())?,
            drafts: DraftSlot::new(store),
            session: Session::new(),
            picker,
        })
    }
}

impl<S: Store> MaintenancePlanner<S> {
    /// Generates a schedule for `machine`, records the machine in the history
    /// and makes the schedule current. The form draft is discarded.
    pub fn submit(&mut self, machine: MachineRecord) -> Result<&ActiveSchedule> {
        let now = Utc::now();
        let schedule = generator::generate(&machine, now, self.picker.as_mut());
        self.machines.record(&machine, &schedule)?;
        info!(machine = %machine.name, frequency = %machine.usage_frequency, "schedule generated");
        if let Err(e) = self.drafts.clear() {
            warn!(error = %e, "form draft not cleared");
        }
        Ok(self.session.set(ActiveSchedule {
            machine,
            schedule,
            generated_at: now,
        }))
    }

    /// Saves the current schedule.
    pub fn save_current(&mut self) -> Result<SavedScheduleRecord> {
        let active = self.session.require()?;
        self.repository
            .save(&active.schedule, &active.machine, active.generated_at)
    }

    /// Makes a saved schedule current.
    pub fn load(&mut self, id: u64) -> Result<&ActiveSchedule> {
        let record = self
            .repository
            .find_by_id(id)
            .ok_or(SchedulerError::NotFound(id))?;
        let active = ActiveSchedule::from_record(record)?;
        info!(id, machine = %active.machine.name, "schedule loaded");
        Ok(self.session.set(active))
    }

    /// Deletes a saved schedule. The caller confirms beforehand.
    ///
    /// The current session is left alone even if it was loaded from this record.
    pub fn delete(&mut self, id: u64) -> Result<()> {
        self.repository.delete_by_id(id)
    }

    /// The autosaved form draft, if one is waiting.
    pub fn draft(&self) -> Result<Option<FormDraft>> {
        self.drafts.load()
    }

    pub fn save_draft(&mut self, draft: &FormDraft) -> Result<()> {
        self.drafts.save(draft)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn current(&self) -> Option<&ActiveSchedule> {
        self.session.current()
    }

    pub fn saved(&self) -> &[SavedScheduleRecord] {
        self.repository.list()
    }

    pub fn find_saved(&self, id: u64) -> Option<&SavedScheduleRecord> {
        self.repository.find_by_id(id)
    }

    pub fn machines(&self) -> &MachineLog<S> {
        &self.machines
    }

    pub fn repository(&self) -> &ScheduleRepository<S> {
        &self.repository
    }

    /// Checklists for the current schedule's tasks.
    pub fn checklists(&self) -> Result<Vec<(&MaintenanceTask, &'static Checklist)>> {
        let active = self.session.require()?;
        Ok(checklist::checklists_for(&active.schedule))
    }

    /// Writes the current schedule as JSON into `dir`.
    pub fn export_json(&self, dir: &Path) -> Result<PathBuf> {
        json::write(self.session.require()?, dir)
    }

    /// Renders the current schedule with `renderer` into `dir`.
    pub fn export_document(&self, renderer: &dyn DocumentRenderer, dir: &Path) -> Result<PathBuf> {
        document::write(self.session.require()?, renderer, dir, Utc::now())
    }
}
