use thiserror::Error;

/// Errors raised while loading or applying configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validate(#[from] validator::ValidationErrors),

    #[error("unable to create DNSimple client: {0}")]
    Client(#[source] anyhow::Error),
}
