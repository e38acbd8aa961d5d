use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration rejected: {0}")]
    InvalidConfig(#[from] configuration::ValidationError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
