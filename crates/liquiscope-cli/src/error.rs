use liquiscope_core::{CoreError, NotifierError};
use liquiscope_web::ServerError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] liquiscope_core::ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Notifier(#[from] NotifierError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Notifier(_) => 2,
            Self::Core(error) if error.is_cache_unavailable() => 3,
            Self::Core(CoreError::Serialization(_)) | Self::Serialization(_) => 4,
            Self::Core(_) => 2,
            Self::Server(_) | Self::Io(_) | Self::Task(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquiscope_core::{ValidationError, WarehouseError};

    #[test]
    fn exit_codes_follow_categories() {
        assert_eq!(CliError::from(ValidationError::EmptySymbol).exit_code(), 2);
        assert_eq!(
            CliError::from(NotifierError::NotConfigured("TELEGRAM_BOT_TOKEN")).exit_code(),
            2
        );

        let unavailable = CoreError::from(WarehouseError::CacheUnavailable {
            path: "cache.duckdb".into(),
            reason: String::from("missing"),
        });
        assert_eq!(CliError::from(unavailable).exit_code(), 3);

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert_eq!(CliError::from(io).exit_code(), 10);
    }
}
