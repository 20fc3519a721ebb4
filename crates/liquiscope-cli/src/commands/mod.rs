mod alert;
mod serve;
mod symbols;
mod view;

use std::sync::Arc;

use liquiscope_core::{
    CacheConfig, CacheReader, CoreError, Dashboard, RecordSource, UnboundedWindow,
};
use liquiscope_web::SharedDashboard;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Exit code when an alert was not delivered.
pub const DELIVERY_FAILURE_EXIT: u8 = 7;

pub struct CommandResult {
    pub data: Option<Value>,
    pub exit_code: u8,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            exit_code: 0,
        }
    }

    /// Nothing to print (the server writes its own logs).
    pub fn silent() -> Self {
        Self {
            data: None,
            exit_code: 0,
        }
    }

    pub fn with_exit_code(mut self, exit_code: u8) -> Self {
        self.exit_code = exit_code;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Serve(args) => serve::run(args, dashboard(cli)?).await,
        Command::Symbols => symbols::run(dashboard(cli)?).await,
        Command::View(args) => view::run(args, dashboard(cli)?).await,
        Command::Alert(args) => alert::run(args).await,
    }
}

/// Cache settings from the environment, overridden by flags.
pub fn cache_config(cli: &Cli) -> CacheConfig {
    let mut config = CacheConfig::default();
    if let Some(path) = &cli.cache {
        config.db_path = path.clone();
    }
    if let Some(table) = &cli.table {
        config.table = table.clone();
    }
    config
}

pub fn unbounded_window(cli: &Cli) -> UnboundedWindow {
    if cli.full_history {
        UnboundedWindow::FullHistory
    } else {
        UnboundedWindow::from_env()
    }
}

fn dashboard(cli: &Cli) -> Result<SharedDashboard, CliError> {
    let reader = CacheReader::open(cache_config(cli)).map_err(CoreError::from)?;
    let source: Arc<dyn RecordSource> = Arc::new(reader);
    Ok(Arc::new(
        Dashboard::new(source).with_unbounded_window(unbounded_window(cli)),
    ))
}
