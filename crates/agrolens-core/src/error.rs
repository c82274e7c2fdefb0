use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgroError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Insufficient diversity: {distinct} distinct index values cannot form {requested} zones")]
    InsufficientDiversity { distinct: usize, requested: usize },

    #[error("No data for period {start} to {end} ({skipped} candidate dates unusable)")]
    NoData {
        start: NaiveDate,
        end: NaiveDate,
        skipped: usize,
    },

    #[error("Insufficient history: {got} points supplied, at least {required} required")]
    InsufficientHistory { got: usize, required: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Image source error for {date}: {message}")]
    Provider { date: NaiveDate, message: String },

    #[error("Request cancelled before any observation completed")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Machine-readable error category surfaced to the collaborator layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DataError,
    InsufficientData,
    InsufficientDiversity,
    NoData,
    InsufficientHistory,
    InvalidParameter,
    ProviderError,
    Cancelled,
    Io,
    Internal,
}

impl ErrorKind {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::ProviderError | Self::Cancelled)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::DataError => "data_error",
            Self::InsufficientData => "insufficient_data",
            Self::InsufficientDiversity => "insufficient_diversity",
            Self::NoData => "no_data",
            Self::InsufficientHistory => "insufficient_history",
            Self::InvalidParameter => "invalid_parameter",
            Self::ProviderError => "provider_error",
            Self::Cancelled => "cancelled",
            Self::Io => "io",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl AgroError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Data(_) => ErrorKind::DataError,
            Self::InsufficientData(_) => ErrorKind::InsufficientData,
            Self::InsufficientDiversity { .. } => ErrorKind::InsufficientDiversity,
            Self::NoData { .. } => ErrorKind::NoData,
            Self::InsufficientHistory { .. } => ErrorKind::InsufficientHistory,
            Self::InvalidParameter(_) | Self::Config(_) => ErrorKind::InvalidParameter,
            Self::Provider { .. } => ErrorKind::ProviderError,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io(_) | Self::ImageError(_) | Self::Json(_) => ErrorKind::Io,
            Self::ThreadPool(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgroError>;
