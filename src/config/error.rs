use thiserror::Error;

/// Errors raised while loading `configs/*.yaml` and its env overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),

    #[error("invalid yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is present but unusable, or a required credential is missing.
    #[error("invalid config: {0}")]
    Validation(String),
}
