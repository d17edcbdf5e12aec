use std::fmt::Display;
use std::path::PathBuf;

use ratatui::widgets::TableState;
use tracing::warn;
use maintsched::input::{machine_from_input, parse_date};
use maintsched::draft::FormDraft;
use maintsched::export::pdf::PdfRenderer;
use maintsched::planner::MaintenancePlanner;
use maintsched::store::JsonFileStore;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
    Confirming,
}

#[derive(Clone, Copy, PartialEq)]
pub enum ViewMode {
    Schedule,
    Saved,
}

/// State for the multi-step "New Schedule" wizard.
#[derive(Default)]
pub struct AddState {
    pub name: String,
    pub last_serviced: String,
    pub step: usize, // 0: Name, 1: Last serviced, 2: Frequency
}

/// Message shown in the status bar after an action.
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

pub struct App {
    pub planner: MaintenancePlanner<JsonFileStore>,
    pub export_dir: PathBuf,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    pub draft: FormDraft,
    pub task_state: TableState,
    pub saved_state: TableState,
    pub show_checklists: bool,
    pub pending_delete: Option<u64>,
    pub status: Option<Status>,
}

impl App {
    pub fn new(planner: MaintenancePlanner<JsonFileStore>, export_dir: PathBuf) -> App {
        let mut saved_state = TableState::default();
        if !planner.saved().is_empty() {
            saved_state.select(Some(0));
        }
        // Open on the saved list when there is something in it.
        let view_mode = if planner.saved().is_empty() {
            ViewMode::Schedule
        } else {
            ViewMode::Saved
        };
        App {
            planner,
            export_dir,
            view_mode,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            draft: FormDraft::default(),
            task_state: TableState::default(),
            saved_state,
            show_checklists: false,
            pending_delete: None,
            status: None,
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            message: message.into(),
            is_error: false,
        });
    }

    fn fail(&mut self, err: impl Display) {
        warn!(error = %err, "action failed");
        self.status = Some(Status {
            message: err.to_string(),
            is_error: true,
        });
    }

    fn list_len(&self) -> usize {
        match self.view_mode {
            ViewMode::Schedule => self.planner.current().map_or(0, |a| a.schedule.tasks.len()),
            ViewMode::Saved => self.planner.saved().len(),
        }
    }

    fn list_state(&mut self) -> &mut TableState {
        match self.view_mode {
            ViewMode::Schedule => &mut self.task_state,
            ViewMode::Saved => &mut self.saved_state,
        }
    }

    /// Selects the next row in the current view.
    pub fn next(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        let state = self.list_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    /// Selects the previous row in the current view.
    pub fn previous(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        let state = self.list_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    /// Toggles between the schedule and saved-schedules views.
    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Schedule => ViewMode::Saved,
            ViewMode::Saved => ViewMode::Schedule,
        };
        self.clamp_saved_selection();
    }

    pub fn toggle_checklists(&mut self) {
        self.show_checklists = !self.show_checklists;
    }

    /// Initiates the "New Schedule" wizard, prefilled from any saved draft.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.draft = match self.planner.draft() {
            Ok(draft) => draft.unwrap_or_default(),
            Err(e) => {
                self.fail(e);
                FormDraft::default()
            }
        };
        if !self.draft.is_empty() {
            self.notify("Restored unsaved form input.");
        }
        self.input_buffer = self.draft.machine_name.clone();
    }

    /// Keeps the draft in step with the field being edited and autosaves it.
    pub fn update_draft(&mut self) {
        let value = self.input_buffer.clone();
        match self.add_state.step {
            0 => self.draft.machine_name = value,
            1 => self.draft.last_serviced_date = value,
            _ => self.draft.usage_frequency = Some(value),
        }
        if let Err(e) = self.planner.save_draft(&self.draft) {
            self.fail(e);
        }
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles Enter in the wizard.
    pub fn handle_input(&mut self) {
        match self.add_state.step {
            0 => {
                // Name
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.name = self.input_buffer.trim().to_string();
                    self.add_state.step += 1;
                    self.input_buffer = self.draft.last_serviced_date.clone();
                }
            }
            1 => {
                // Last serviced
                match parse_date(&self.input_buffer) {
                    Ok(_) => {
                        self.add_state.last_serviced = self.input_buffer.clone();
                        self.add_state.step += 1;
                        self.input_buffer = self.draft.usage_frequency.clone().unwrap_or_default();
                        self.status = None;
                    }
                    Err(e) => self.fail(e),
                }
            }
            2 => {
                // Frequency
                let frequency = if self.input_buffer.trim().is_empty() {
                    "monthly".to_string()
                } else {
                    self.input_buffer.clone()
                };
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                let submitted = machine_from_input(&self.add_state.name, &self.add_state.last_serviced, &frequency)
                    .and_then(|machine| self.planner.submit(machine).map(|a| a.machine.name.clone()));
                match submitted {
                    Ok(name) => {
                        self.draft = FormDraft::default();
                        self.view_mode = ViewMode::Schedule;
                        self.task_state.select(Some(0));
                        self.notify(format!("Maintenance schedule generated for {}.", name));
                    }
                    Err(e) => self.fail(e),
                }
            }
            _ => {}
        }
    }

    pub fn save_current(&mut self) {
        match self.planner.save_current() {
            Ok(record) => {
                self.notify(format!("Schedule for {} saved successfully!", record.machine_name));
                self.clamp_saved_selection();
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn export_json(&mut self) {
        match self.planner.export_json(&self.export_dir) {
            Ok(path) => self.notify(format!("JSON schedule exported to {}", path.display())),
            Err(e) => self.fail(e),
        }
    }

    pub fn export_pdf(&mut self) {
        match self.planner.export_document(&PdfRenderer, &self.export_dir) {
            Ok(path) => self.notify(format!("PDF exported to {}", path.display())),
            Err(e) => self.fail(e),
        }
    }

    pub fn reset(&mut self) {
        self.planner.reset();
        self.task_state.select(None);
        self.show_checklists = false;
        self.notify("Form reset.");
    }

    fn selected_saved_id(&self) -> Option<u64> {
        self.saved_state
            .selected()
            .and_then(|i| self.planner.saved().get(i))
            .map(|r| r.id)
    }

    /// Loads the selected saved schedule into the session.
    pub fn load_selected(&mut self) {
        let Some(id) = self.selected_saved_id() else { return };
        match self.planner.load(id).map(|a| a.machine.name.clone()) {
            Ok(name) => {
                self.view_mode = ViewMode::Schedule;
                self.task_state.select(Some(0));
                self.notify(format!("Schedule for {} loaded successfully!", name));
            }
            Err(e) => self.fail(e),
        }
    }

    /// Asks for confirmation before deleting the selected saved schedule.
    pub fn start_delete(&mut self) {
        if let Some(id) = self.selected_saved_id() {
            self.pending_delete = Some(id);
            self.input_mode = InputMode::Confirming;
        }
    }

    pub fn confirm_delete(&mut self, confirmed: bool) {
        self.input_mode = InputMode::Normal;
        let Some(id) = self.pending_delete.take() else { return };
        if !confirmed {
            return;
        }
        match self.planner.delete(id) {
            Ok(()) => {
                self.notify("Schedule deleted successfully!");
                self.clamp_saved_selection();
            }
            Err(e) => self.fail(e),
        }
    }

    /// Machine name of the schedule awaiting delete confirmation.
    pub fn pending_delete_name(&self) -> Option<&str> {
        self.pending_delete
            .and_then(|id| self.planner.find_saved(id))
            .map(|r| r.machine_name.as_str())
    }

    fn clamp_saved_selection(&mut self) {
        let len = self.planner.saved().len();
        if len == 0 {
            self.saved_state.select(None);
        } else if let Some(i) = self.saved_state.selected() {
            if i >= len {
                self.saved_state.select(Some(len - 1));
            }
        } else {
            self.saved_state.select(Some(0));
        }
    }
}
