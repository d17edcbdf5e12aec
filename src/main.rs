//! # maintsched
//!
//! A terminal maintenance scheduler. Enter a machine name, the date it was last
//! serviced and how often it runs; maintsched derives the upcoming maintenance
//! tasks, writes an advisory note, and lets you save, reload, delete and export
//! the schedule.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! ```bash
//! maintsched
//! # or explicitly
//! maintsched ui
//! ```
//!
//! **Schedule View**
//! *   `a`: New schedule (name, last serviced date, usage frequency)
//! *   `s`: Save the current schedule
//! *   `e`: Export as JSON
//! *   `p`: Export as PDF
//! *   `c`: Show/Hide detailed checklists
//! *   `r`: Reset
//! *   `v`: Switch to Saved Schedules view
//!
//! **Saved Schedules View**
//! *   `Enter`: Load the selected schedule
//! *   `d`: Delete the selected schedule (asks for confirmation)
//! *   `v`: Switch to Schedule view
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! maintsched generate "CNC Mill 3" --last-serviced 2024-01-01 --frequency weekly --save --pdf
//! maintsched list
//! maintsched show 1 --checklists
//! maintsched export 1 --format json --out ./reports
//! maintsched delete 1
//! ```
//!
//! ## Data Storage
//!
//! Saved schedules and the machine history are JSON files in your local data
//! directory (`~/.local/share/maintsched` on Linux). Override it with
//! `MAINTSCHED_DATA_DIR` or `data_dir` in `config.toml`.

mod commands;
mod tui;

use std::error::Error;
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use maintsched::advisory::RandomPicker;
use maintsched::config::Config;
use maintsched::error::SchedulerError;
use maintsched::input::machine_from_input;
use maintsched::planner::MaintenancePlanner;
use maintsched::store::JsonFileStore;
use commands::*;
use tui::run_tui;

#[derive(Parser)]
#[command(name = "maintsched")]
#[command(about = "Machine maintenance scheduler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a maintenance schedule for a machine
    Generate {
        /// Machine name (quoted if it has spaces)
        name: String,
        /// Last service date in YYYY-MM-DD
        #[arg(short, long)]
        last_serviced: String,
        /// Usage frequency (daily, weekly, monthly)
        #[arg(short, long, default_value = "monthly")]
        frequency: String,
        /// Save the generated schedule
        #[arg(short, long)]
        save: bool,
        /// Export as JSON
        #[arg(long)]
        json: bool,
        /// Export as PDF
        #[arg(long)]
        pdf: bool,
        /// Print detailed task checklists
        #[arg(short, long)]
        checklists: bool,
        /// Directory for exported files
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List saved schedules
    List,
    /// Show a saved schedule
    Show {
        id: u64,
        /// Print detailed task checklists
        #[arg(short, long)]
        checklists: bool,
    },
    /// Delete a saved schedule
    Delete {
        id: u64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Export a saved schedule
    Export {
        id: u64,
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Directory for exported files
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List machines schedules were generated for
    Machines,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

/// Installs the log subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &Config, to_file: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if to_file {
        let mut path = config.data_dir.clone();
        path.push("maintsched.log");
        let _ = std::fs::create_dir_all(&config.data_dir);
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        return;
    }
    let _ = builder.with_writer(io::stderr).try_init();
}

fn open_planner(config: &Config) -> Result<MaintenancePlanner<JsonFileStore>, SchedulerError> {
    let store = JsonFileStore::open(&config.data_dir)?;
    MaintenancePlanner::open(store, Box::new(RandomPicker::new(config.advisory_seed)))
}

fn run(command: Commands, config: &Config) -> Result<(), Box<dyn Error>> {
    let mut planner = open_planner(config)?;
    match command {
        Commands::Generate { name, last_serviced, frequency, save, json, pdf, checklists, out } => {
            let machine = machine_from_input(&name, &last_serviced, &frequency)?;
            let opts = GenerateOptions { save, json, pdf, checklists };
            let out_dir = out.unwrap_or_else(|| config.export_dir.clone());
            cmd_generate(&mut planner, machine, opts, &out_dir)?
        }
        Commands::List => cmd_list(&planner),
        Commands::Show { id, checklists } => cmd_show(&mut planner, id, checklists)?,
        Commands::Delete { id, force } => cmd_delete(&mut planner, id, force)?,
        Commands::Export { id, format, out } => {
            let out_dir = out.unwrap_or_else(|| config.export_dir.clone());
            cmd_export(&mut planner, id, format, &out_dir)?
        }
        Commands::Machines => cmd_machines(&planner),
        Commands::Ui => run_tui(planner, config.export_dir.clone())?,
        // Handled before the planner is opened.
        Commands::Completions { .. } => {}
    }
    Ok(())
}

/// Reports a failed command on stderr and maps it to a non-zero exit status.
fn exit_code<E: Display>(result: Result<(), E>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let command = cli.command.unwrap_or(Commands::Ui);
    if let Commands::Completions { shell } = &command {
        let shell_enum = match shell.as_str() {
            "bash" => Shell::Bash,
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "powershell" => Shell::PowerShell,
            "elvish" => Shell::Elvish,
            _ => {
                eprintln!("Unsupported shell: {}", shell);
                return ExitCode::FAILURE;
            }
        };
        let mut cmd = Cli::command();
        generate(shell_enum, &mut cmd, "maintsched", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_logging(&config, matches!(command, Commands::Ui));
    exit_code(run(command, &config))
}
