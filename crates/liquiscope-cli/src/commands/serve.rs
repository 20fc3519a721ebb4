use liquiscope_web::{AppState, DashboardConfig, DashboardServer, SharedDashboard};

use crate::cli::ServeArgs;
use crate::error::CliError;

use super::CommandResult;

/// Environment settings with command-line flags taking precedence.
pub fn server_config(args: &ServeArgs) -> DashboardConfig {
    let mut config = DashboardConfig::from_env();
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.cors {
        config.enable_cors = true;
    }
    config
}

pub async fn run(args: &ServeArgs, dashboard: SharedDashboard) -> Result<CommandResult, CliError> {
    let config = server_config(args);
    let state = AppState::load(dashboard).await;
    DashboardServer::new(state, config).run().await?;
    Ok(CommandResult::silent())
}
