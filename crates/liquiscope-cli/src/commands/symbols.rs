use std::sync::Arc;

use liquiscope_web::SharedDashboard;
use serde::Serialize;

use liquiscope_core::SymbolOption;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SymbolsResponseData {
    symbols: Vec<SymbolOption>,
}

pub async fn run(dashboard: SharedDashboard) -> Result<CommandResult, CliError> {
    let reader = Arc::clone(&dashboard);
    let symbols = tokio::task::spawn_blocking(move || reader.symbol_options()).await??;
    let data = serde_json::to_value(SymbolsResponseData { symbols })?;
    Ok(CommandResult::ok(data))
}
