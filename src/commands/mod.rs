pub mod auth;
pub mod calendars;
pub mod delete;
pub mod duplicates;
pub mod export;
pub mod sync;
pub mod upload;

use std::path::Path;

use anyhow::Result;

use kcal::config::Config;
use kcal::credentials::{CredentialManager, CredentialStore};
use kcal::directory::CalendarDirectory;
use kcal::google::{GoogleAuthorizer, GoogleCalendar};
use kcal::record::{self, SourceEventRecord};
use kcal::KcalError;

pub fn credential_manager(cfg: &Config) -> Result<CredentialManager<GoogleAuthorizer>> {
    CredentialManager::new(
        &cfg.client_secret,
        CredentialStore::new(&cfg.token_path),
        cfg.scopes.clone(),
        GoogleAuthorizer,
    )
}

/// Authenticated client plus the calendar listing, loaded once per command.
pub struct Session {
    pub api: GoogleCalendar<GoogleAuthorizer>,
    pub directory: CalendarDirectory,
}

impl Session {
    pub async fn open(cfg: &Config) -> Result<Self> {
        let api = GoogleCalendar::new(cfg.api_base_url.clone(), credential_manager(cfg)?);
        let directory = CalendarDirectory::fetch(&api).await?;

        Ok(Session { api, directory })
    }
}

/// Read the events file; an empty one is rejected.
pub fn load_records(path: &Path) -> Result<Vec<SourceEventRecord>> {
    let records = record::load_records(path)?;
    if records.is_empty() {
        return Err(KcalError::NoSourceRecords.into());
    }
    Ok(records)
}
