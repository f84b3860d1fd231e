use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::api::CalendarApi;

/// Calendar display names mapped to calendar ids, as listed at construction.
///
/// Never refreshed: rebuild it to pick up renamed or new calendars.
#[derive(Debug, Clone, Default)]
pub struct CalendarDirectory {
    ids: HashMap<String, String>,
}

impl CalendarDirectory {
    /// Walk every page of the calendar list.
    ///
    /// When two calendars share a display name the one listed later wins.
    pub async fn fetch<A: CalendarApi>(api: &A) -> Result<Self> {
        let mut ids = HashMap::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = api
                .list_calendars(page_token.as_deref())
                .await
                .context("Failed to list calendars")?;

            for entry in page.items {
                ids.insert(entry.summary, entry.id);
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(count = ids.len(), "fetched calendar list");
        Ok(CalendarDirectory { ids })
    }

    pub fn calendar_ids(&self) -> &HashMap<String, String> {
        &self.ids
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// `(name, id)` pairs sorted by name, for display
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .ids
            .iter()
            .map(|(name, id)| (name.as_str(), id.as_str()))
            .collect();
        entries.sort();
        entries
    }
}

impl FromIterator<(String, String)> for CalendarDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        CalendarDirectory {
            ids: iter.into_iter().collect(),
        }
    }
}
