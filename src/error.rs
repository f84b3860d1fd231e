//! Error types for kcal.

use std::path::PathBuf;

use thiserror::Error;

/// Failure categories that callers may want to tell apart.
///
/// Everything else travels as a plain `anyhow::Error` with context attached.
#[derive(Error, Debug)]
pub enum KcalError {
    #[error(
        "Client secret file not found at {0}\n\n\
        Download an OAuth client (type \"Desktop app\") from\n\
        https://console.cloud.google.com/apis/credentials and save it there."
    )]
    ClientSecretMissing(PathBuf),

    #[error("Client secret file {path} is invalid: {reason}")]
    ClientSecretInvalid { path: PathBuf, reason: String },

    #[error("No source events to work with")]
    NoSourceRecords,

    #[error("Unknown time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Calendar API returned {status}: {body}")]
    Api { status: u16, body: String },
}
