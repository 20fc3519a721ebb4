use std::sync::Arc;

use liquiscope_core::{
    DeliveryStatus, HttpClient, ReqwestHttpClient, TelegramConfig, TelegramNotifier,
};
use serde::Serialize;

use crate::cli::AlertArgs;
use crate::error::CliError;

use super::{CommandResult, DELIVERY_FAILURE_EXIT};

#[derive(Debug, Serialize)]
struct AlertResponseData {
    delivered: bool,
    status: Option<u16>,
    detail: DeliveryStatus,
}

pub async fn run(args: &AlertArgs) -> Result<CommandResult, CliError> {
    let config = TelegramConfig::from_env()?;
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    send(&TelegramNotifier::new(config, http), &args.message).await
}

pub async fn send(notifier: &TelegramNotifier, message: &str) -> Result<CommandResult, CliError> {
    let status = notifier.send_alert(message).await;
    let delivered = status.is_delivered();
    let data = serde_json::to_value(AlertResponseData {
        delivered,
        status: status.status_code(),
        detail: status,
    })?;

    let result = CommandResult::ok(data);
    if delivered {
        Ok(result)
    } else {
        Ok(result.with_exit_code(DELIVERY_FAILURE_EXIT))
    }
}
