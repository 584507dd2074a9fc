mod logging;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use dbnav_adapters::mysql::MysqlBackend;
use dbnav_core::config::{AppConfig, ConfigError};
use dbnav_core::connection_manager::DatabaseBackend;
use dbnav_core::navigator::{NavigatorSettings, ScreenNavigator};
use dbnav_tui::TuiError;
use tokio::runtime::Runtime;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "dbnav")]
#[command(version)]
#[command(about = "Browse MariaDB databases, tables and rows from the terminal", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of the default location.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    match &cli.config {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load_default(),
    }
}

fn run_app<B: DatabaseBackend>(
    mut navigator: ScreenNavigator<B>,
    runtime: &Runtime,
    run_tui: impl FnOnce(&mut ScreenNavigator<B>, &Runtime) -> Result<(), TuiError>,
) -> Result<(), Box<dyn Error>> {
    info!(host = navigator.host(), "starting dbnav");
    if let Err(tui_error) = run_tui(&mut navigator, runtime) {
        error!(error = %tui_error, "terminal session failed");
        return Err(tui_error.into());
    }
    info!("dbnav exited");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let log_path = logging::resolve_log_path(cli.log_file.as_deref(), &config)?;
    let _guard = logging::init_logging(&config.log_level, &log_path)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let navigator = ScreenNavigator::new(MysqlBackend, NavigatorSettings::from(&config));
    run_app(navigator, &runtime, dbnav_tui::run)
}
