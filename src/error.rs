use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {0}")]
    Load(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Chat connection error: {0}")]
    Irc(#[from] crate::irc::IrcError),
    #[error("Command line error: {0}")]
    Cli(#[from] lexopt::Error),
    #[error("Relay worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
