use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use chrono::Local;
use maintsched::codec::encode_date;
use maintsched::models::{Priority, TaskStatus};
use maintsched::planner::MaintenancePlanner;
use maintsched::store::JsonFileStore;
use super::app::{App, InputMode, ViewMode};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Main view
            Constraint::Length(3)  // Status + help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Schedule => render_schedule(f, app, chunks[0]),
        ViewMode::Saved => render_saved(f, app, chunks[0]),
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Schedule => "q: Quit | a: New | s: Save | e: JSON | p: PDF | c: Checklists | r: Reset | v: Saved Schedules",
            ViewMode::Saved => "q: Quit | a: New | Enter: Load | d: Del | v: Schedule",
        },
        InputMode::Adding => "Enter: Next Step | Esc: Cancel (input is kept as a draft)",
        InputMode::Confirming => "y: Delete | any other key: Cancel",
    };

    let footer = match &app.status {
        Some(status) => {
            let color = if status.is_error { Color::Red } else { Color::Green };
            Paragraph::new(Line::from(vec![
                Span::styled(status.message.clone(), Style::default().fg(color)),
                Span::raw("  "),
                Span::styled(help_text, Style::default().fg(Color::Gray)),
            ]))
        }
        None => Paragraph::new(help_text).style(Style::default().fg(Color::Gray)),
    };
    f.render_widget(footer.block(Block::default().borders(Borders::ALL)), chunks[1]);

    match app.input_mode {
        InputMode::Adding => {
            let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
            f.render_widget(Clear, area);

            let title = match app.add_state.step {
                0 => "New Schedule: Enter Machine Name",
                1 => "New Schedule: Enter Last Serviced Date (YYYY-MM-DD)",
                2 => "New Schedule: Enter Usage Frequency (daily/weekly/monthly)",
                _ => "New Schedule",
            };

            let input = Paragraph::new(app.input_buffer.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title(title));

            f.render_widget(input, area);
        }
        InputMode::Confirming => {
            let area = centered_rect(60, 3, f.area());
            f.render_widget(Clear, area);
            let name = app.pending_delete_name().unwrap_or("this machine");
            let prompt = Paragraph::new(format!("Delete the schedule for {}? (y/n)", name))
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title("Confirm Delete"));
            f.render_widget(prompt, area);
        }
        InputMode::Normal => {}
    }
}

fn priority_color(p: Priority) -> Color {
    match p {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn render_schedule(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(active) = app.planner.current() else {
        let empty = Paragraph::new("No schedule yet. Press 'a' to generate one, or 'v' to load a saved schedule.")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Maintenance Scheduler"));
        f.render_widget(empty, area);
        return;
    };

    let constraints = if app.show_checklists {
        vec![Constraint::Length(8), Constraint::Length(8), Constraint::Min(0)]
    } else {
        vec![Constraint::Length(8), Constraint::Min(0)]
    };
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let machine = &active.machine;
    let info = vec![
        Line::from(vec![
            Span::styled("Last serviced: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(encode_date(machine.last_serviced)),
            Span::raw("   "),
            Span::styled("Usage: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(machine.usage_frequency.capitalized()),
        ]),
        Line::from(""),
        Line::from(active.schedule.advisory.as_str()),
    ];
    let header = Paragraph::new(info)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(format!("Maintenance Schedule - {}", machine.name)));
    f.render_widget(header, parts[0]);

    let today = Local::now().date_naive();
    let rows: Vec<Row> = active
        .schedule
        .tasks
        .iter()
        .map(|t| {
            let status = t.effective_status(today);
            let status_style = match status {
                TaskStatus::Overdue => Style::default().fg(Color::Red),
                TaskStatus::Completed => Style::default().fg(Color::Green),
                TaskStatus::Scheduled => Style::default().fg(Color::Blue),
            };
            Row::new(vec![
                Cell::from(t.name.clone()),
                Cell::from(encode_date(t.due_date)),
                Cell::from(t.priority.to_string()).style(Style::default().fg(priority_color(t.priority))),
                Cell::from(status.to_string()).style(status_style),
                Cell::from(t.description.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(18),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Task", "Due", "Priority", "Status", "Description"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let table_area = *parts.last().unwrap_or(&area);
    if app.show_checklists {
        render_checklist(f, &app.planner, app.task_state.selected(), parts[1]);
    }
    f.render_stateful_widget(table, table_area, &mut app.task_state);
}

/// Checklist for the highlighted task.
fn render_checklist(f: &mut Frame, planner: &MaintenancePlanner<JsonFileStore>, selected: Option<usize>, area: Rect) {
    let lists = planner.checklists().unwrap_or_default();
    let Some((task, checklist)) = lists.get(selected.unwrap_or(0)) else {
        let none = Paragraph::new("No checklist for this task.")
            .block(Block::default().borders(Borders::ALL).title("Checklist"));
        f.render_widget(none, area);
        return;
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("Time: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(checklist.estimated_time),
        Span::raw("   "),
        Span::styled("Tools: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(checklist.tools),
    ])];
    lines.push(Line::from(Span::styled(
        checklist.safety_notes,
        Style::default().fg(Color::Yellow),
    )));
    for (i, step) in checklist.steps.iter().enumerate() {
        lines.push(Line::from(format!("[ ] {}. {}", i + 1, step)));
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(format!("{} (due {})", checklist.title, encode_date(task.due_date))));
    f.render_widget(panel, area);
}

fn render_saved(f: &mut Frame, app: &mut App, area: Rect) {
    let today = Local::now().date_naive();
    let rows: Vec<Row> = app
        .planner
        .saved()
        .iter()
        .map(|r| {
            let next_due = r
                .next_due(today)
                .map(encode_date)
                .unwrap_or_else(|| "No upcoming tasks".to_string());
            Row::new(vec![
                Cell::from(r.id.to_string()),
                Cell::from(r.machine_name.clone()),
                Cell::from(r.usage_frequency.capitalized()),
                Cell::from(r.task_count().to_string()),
                Cell::from(next_due),
                Cell::from(r.saved_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(18),
        Constraint::Length(17),
    ];

    let title = if app.planner.saved().is_empty() {
        "Saved Schedules - none yet, press 's' on a schedule to save it"
    } else {
        "Saved Schedules"
    };

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["ID", "Machine", "Frequency", "Tasks", "Next Due", "Saved"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.saved_state);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
