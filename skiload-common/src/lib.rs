use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status returned by the ski API when a lift ride was recorded.
pub const WRITE_SUCCESS_CODE: u16 = 201;
/// Status returned by a read that found data.
pub const READ_SUCCESS_CODE: u16 = 200;
/// Status returned by a read that succeeded but found nothing for the skier.
pub const READ_NO_DATA_CODE: u16 = 204;

pub const MIN_THREADS: u32 = 4;
pub const MAX_THREADS: u32 = 256;
pub const MIN_LIFTS: u32 = 5;
pub const MAX_LIFTS: u32 = 60;
pub const MAX_SKI_DAY: u32 = 366;

/// Error types for SkiLoad operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkiLoadError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

/// Body of a lift ride write. Every field travels as a string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftRide {
    #[serde(rename = "resortID")]
    pub resort_id: String,
    #[serde(rename = "dayID")]
    pub day_id: String,
    #[serde(rename = "skierID")]
    pub skier_id: String,
    pub time: String,
    #[serde(rename = "liftID")]
    pub lift_id: String,
}

/// Vertical total for one season at one resort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonVertical {
    #[serde(rename = "seasonID")]
    pub season_id: String,
    #[serde(rename = "totalVert")]
    pub total_vert: u64,
}

/// Body returned by both read endpoints when data exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkierVertical {
    pub resorts: Vec<SeasonVertical>,
}

/// JSON error envelope returned by the server for all error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Result type for SkiLoad operations
pub type Result<T> = std::result::Result<T, SkiLoadError>;
