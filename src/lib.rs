//! Sync a list of all-day events into Google Calendar, and export them as .ics.
//!
//! The flow is: obtain a credential, list calendars, find events that repeat
//! the source records, delete them, then insert the records afresh.

pub mod api;
pub mod config;
pub mod credentials;
pub mod directory;
pub mod duplicates;
pub mod error;
pub mod google;
pub mod ics;
pub mod record;
pub mod sync;

#[cfg(test)]
mod testing;

pub use error::KcalError;
pub use record::SourceEventRecord;
