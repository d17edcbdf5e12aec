pub mod app;
pub mod ui;

use std::path::PathBuf;
use std::{error::Error, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use maintsched::planner::MaintenancePlanner;
use maintsched::store::JsonFileStore;
use app::{App, InputMode, ViewMode};
use ui::ui;

pub fn run_tui(planner: MaintenancePlanner<JsonFileStore>, export_dir: PathBuf) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(planner, export_dir);

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.input_mode {
                InputMode::Normal => match (app.view_mode, key.code) {
                    (_, KeyCode::Char('q')) => return Ok(()),
                    (_, KeyCode::Down | KeyCode::Char('j')) => app.next(),
                    (_, KeyCode::Up | KeyCode::Char('k')) => app.previous(),
                    (_, KeyCode::Char('a')) => app.start_add(),
                    (_, KeyCode::Char('v')) => app.toggle_view(),
                    (ViewMode::Schedule, KeyCode::Char('s')) => app.save_current(),
                    (ViewMode::Schedule, KeyCode::Char('e')) => app.export_json(),
                    (ViewMode::Schedule, KeyCode::Char('p')) => app.export_pdf(),
                    (ViewMode::Schedule, KeyCode::Char('c')) => app.toggle_checklists(),
                    (ViewMode::Schedule, KeyCode::Char('r')) => app.reset(),
                    (ViewMode::Saved, KeyCode::Enter) => app.load_selected(),
                    (ViewMode::Saved, KeyCode::Char('d') | KeyCode::Delete) => app.start_delete(),
                    _ => {}
                },
                InputMode::Adding => match key.code {
                    KeyCode::Enter => app.handle_input(),
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                        app.update_draft();
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                        app.update_draft();
                    }
                    _ => {}
                },
                InputMode::Confirming => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(true),
                    _ => app.confirm_delete(false),
                },
            }
        }
    }
}
