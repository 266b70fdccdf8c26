use std::process::ExitCode;

mod columns;
mod controller;
mod domain;
mod model;
mod ui;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use columns::ColumnId;
use controller::Controller;
use domain::{CMConfig, CMError};
use model::{Model, Status};
use ui::PanelUI;

#[derive(Parser, Debug)]
#[command(name = "colman", about = "A tui based table column manager.", version)]
struct Args {
    /// Columns that start out hidden (repeatable)
    #[arg(long = "hide", value_name = "COLUMN", default_values_t = [ColumnId::Category])]
    hide: Vec<ColumnId>,

    /// Write a trace log to this file (stdout is owned by the tui)
    #[arg(long, value_name = "PATH")]
    logfile: Option<String>,

    /// Event poll time in milliseconds
    #[arg(long, default_value_t = 33)]
    poll_time: u64,

    /// Panel open/close animation duration in milliseconds
    #[arg(long, default_value_t = 300)]
    animation_ms: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run(args: Args) -> Result<(), CMError> {
    if let Some(ref path) = args.logfile {
        init_logging(path)?;
    }
    info!("Starting colman!");

    let cfg = CMConfig::default()
        .event_poll_time(args.poll_time)
        .animation_ms(args.animation_ms);

    let mut model = Model::init(&cfg, &args.hide)?;
    let ui = PanelUI::new(&cfg);
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        };

        // Advance the open/close animation between input events
        model.tick();
    }

    Ok(())
}

fn init_logging(path: &str) -> Result<(), CMError> {
    let expanded = shellexpand::full(path).map_err(|e| CMError::LoggingFailed(e.to_string()))?;
    let logfile = std::fs::File::create(expanded.as_ref())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(logfile))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| CMError::LoggingFailed(e.to_string()))?;

    Ok(())
}
