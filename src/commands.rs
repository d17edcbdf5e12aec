use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use clap::ValueEnum;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use maintsched::codec::encode_date;
use maintsched::error::{Result, SchedulerError};
use maintsched::export::pdf::PdfRenderer;
use maintsched::models::{MachineRecord, Priority, TaskStatus};
use maintsched::planner::MaintenancePlanner;
use maintsched::session::ActiveSchedule;
use maintsched::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Pdf,
}

/// What to do with a freshly generated schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    pub save: bool,
    pub json: bool,
    pub pdf: bool,
    pub checklists: bool,
}

/// Asks a yes/no question on stdin. Anything but `y` is a no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn priority_color(p: Priority) -> Color {
    match p {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn status_color(s: TaskStatus) -> Color {
    match s {
        TaskStatus::Overdue => Color::Red,
        TaskStatus::Completed => Color::Green,
        TaskStatus::Scheduled => Color::Blue,
    }
}

/// Prints the advisory and the task table for `active`.
pub fn print_schedule(active: &ActiveSchedule) {
    let today = Local::now().date_naive();
    let machine = &active.machine;
    println!(
        "{} (last serviced {}, {} usage)",
        machine.name,
        encode_date(machine.last_serviced),
        machine.usage_frequency
    );
    println!();
    println!("{}", active.schedule.advisory);
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
        ]);
    for t in &active.schedule.tasks {
        let status = t.effective_status(today);
        table.add_row(vec![
            Cell::new(&t.name),
            Cell::new(encode_date(t.due_date)),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(status).fg(status_color(status)),
            Cell::new(&t.description),
        ]);
    }
    println!("{table}");
}

/// Prints the step-by-step checklists for the current schedule.
pub fn print_checklists<S: Store>(planner: &MaintenancePlanner<S>) -> Result<()> {
    for (task, c) in planner.checklists()? {
        println!();
        println!("{} ({}, due {})", c.title, task.name, encode_date(task.due_date));
        println!("  Estimated time: {}", c.estimated_time);
        println!("  Tools: {}", c.tools);
        println!("  Safety: {}", c.safety_notes);
        for (i, step) in c.steps.iter().enumerate() {
            println!("  [ ] {}. {}", i + 1, step);
        }
    }
    Ok(())
}

/// Generates a schedule and optionally saves and exports it.
pub fn cmd_generate<S: Store>(
    planner: &mut MaintenancePlanner<S>,
    machine: MachineRecord,
    opts: GenerateOptions,
    out_dir: &Path,
) -> Result<()> {
    let active = planner.submit(machine)?;
    print_schedule(active);
    if opts.checklists {
        print_checklists(planner)?;
    }
    if opts.save {
        let record = planner.save_current()?;
        println!("Schedule for {} saved (id = {}).", record.machine_name, record.id);
    }
    if opts.json {
        let path = planner.export_json(out_dir)?;
        println!("JSON schedule exported to {}", path.display());
    }
    if opts.pdf {
        let path = planner.export_document(&PdfRenderer, out_dir)?;
        println!("PDF exported to {}", path.display());
    }
    Ok(())
}

/// Lists saved schedules in save order.
pub fn cmd_list<S: Store>(planner: &MaintenancePlanner<S>) {
    let saved = planner.saved();
    if saved.is_empty() {
        println!("No saved schedules. Generate one with --save to see it here.");
        return;
    }
    let today = Local::now().date_naive();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Machine").add_attribute(Attribute::Bold),
            Cell::new("Frequency").add_attribute(Attribute::Bold),
            Cell::new("Tasks").add_attribute(Attribute::Bold),
            Cell::new("Next Due").add_attribute(Attribute::Bold),
            Cell::new("Saved").add_attribute(Attribute::Bold),
        ]);
    for r in saved {
        let next_due = match r.next_due(today) {
            Some(d) => Cell::new(encode_date(d)),
            None => Cell::new("No upcoming tasks").fg(Color::Grey),
        };
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.machine_name),
            Cell::new(r.usage_frequency.capitalized()),
            Cell::new(r.task_count()),
            next_due,
            Cell::new(r.saved_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");
}

/// Loads a saved schedule and prints it.
pub fn cmd_show<S: Store>(planner: &mut MaintenancePlanner<S>, id: u64, checklists: bool) -> Result<()> {
    let active = planner.load(id)?;
    print_schedule(active);
    if checklists {
        print_checklists(planner)?;
    }
    Ok(())
}

/// Deletes a saved schedule after confirmation.
pub fn cmd_delete<S: Store>(planner: &mut MaintenancePlanner<S>, id: u64, force: bool) -> Result<()> {
    let name = planner
        .find_saved(id)
        .map(|r| r.machine_name.clone())
        .ok_or(SchedulerError::NotFound(id))?;
    if !force {
        let prompt = format!("Are you sure you want to delete the schedule for {}?", name);
        let confirmed = confirm(&prompt)
            .map_err(|e| SchedulerError::InvalidInput(format!("Could not read confirmation: {}", e)))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }
    planner.delete(id)?;
    println!("Schedule {} deleted.", id);
    Ok(())
}

/// Loads a saved schedule and exports it.
pub fn cmd_export<S: Store>(
    planner: &mut MaintenancePlanner<S>,
    id: u64,
    format: ExportFormat,
    out_dir: &Path,
) -> Result<()> {
    planner.load(id)?;
    let path = match format {
        ExportFormat::Json => planner.export_json(out_dir)?,
        ExportFormat::Pdf => planner.export_document(&PdfRenderer, out_dir)?,
    };
    println!("Exported to {}", path.display());
    Ok(())
}

/// Lists every machine a schedule was generated for.
pub fn cmd_machines<S: Store>(planner: &MaintenancePlanner<S>) {
    let entries = planner.machines().entries();
    if entries.is_empty() {
        println!("No machines recorded.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Machine", "Last Serviced", "Frequency", "Recorded"]);
    for e in entries {
        table.add_row(vec![
            e.id.to_string(),
            e.name.clone(),
            e.last_serviced_date.clone(),
            e.usage_frequency.to_string(),
            e.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{table}");
}
