use thiserror::Error;

use crate::record::RecordId;

#[derive(Error, Debug)]
pub enum SolarError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("{0} required")]
    MissingParameter(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Record {0} not found")]
    NotFound(RecordId),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl SolarError {
    /// True for errors caused by the request itself rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingParameter(_) | Self::InvalidParameter(_))
    }
}

pub type Result<T> = std::result::Result<T, SolarError>;

// Helper conversions
impl From<rusqlite::Error> for SolarError {
    fn from(e: rusqlite::Error) -> Self { Self::Persistence(e.to_string()) }
}

impl From<config::ConfigError> for SolarError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
