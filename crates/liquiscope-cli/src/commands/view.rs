use liquiscope_core::{Selection, ThemeMode};
use liquiscope_web::SharedDashboard;
use tracing::debug;

use crate::cli::ViewArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &ViewArgs, dashboard: SharedDashboard) -> Result<CommandResult, CliError> {
    let selection = Selection::parse(
        args.symbol.as_deref(),
        args.start.as_deref(),
        args.end.as_deref(),
    )?;
    let theme = ThemeMode::from(args.theme);

    let view = tokio::task::spawn_blocking(move || dashboard.render(&selection, theme)).await??;
    debug!(rows = view.table.rows.len(), "view rendered");

    Ok(CommandResult::ok(serde_json::to_value(view)?))
}
