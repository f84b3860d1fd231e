//! In-memory stand-ins for the remote service, shared by unit tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};

use crate::api::{
    CalendarApi, CalendarListEntry, CalendarListPage, EventDateTime, EventQuery, EventsPage,
    NewEvent, RemoteEvent,
};
use crate::credentials::{Authorizer, ClientSecret, Credential};
use crate::error::KcalError;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn all_day_event(id: &str, summary: &str, date: NaiveDate) -> RemoteEvent {
    RemoteEvent {
        id: id.to_string(),
        summary: Some(summary.to_string()),
        start: Some(EventDateTime {
            date: Some(date),
            ..Default::default()
        }),
    }
}

pub fn credential_expiring_in(access_token: &str, ttl: Duration) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: format!("refresh-{}", access_token),
        expires_at: Utc::now() + ttl,
        scopes: vec!["https://www.googleapis.com/auth/calendar".to_string()],
    }
}

pub fn write_client_secret(dir: &Path) -> PathBuf {
    let path = dir.join("credentials.json");
    std::fs::write(
        &path,
        r#"{"installed": {
            "client_id": "test-client.apps.googleusercontent.com",
            "client_secret": "test-secret",
            "redirect_uris": ["http://localhost"]
        }}"#,
    )
    .unwrap();
    path
}

#[derive(Clone, Default)]
pub struct FakeAuthorizer {
    fail_refresh: bool,
    authorize_calls: Arc<AtomicUsize>,
    refresh_calls: Arc<AtomicUsize>,
}

impl FakeAuthorizer {
    pub fn failing_refresh() -> Self {
        FakeAuthorizer {
            fail_refresh: true,
            ..Default::default()
        }
    }

    pub fn authorize_calls(&self) -> usize {
        self.authorize_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

impl Authorizer for FakeAuthorizer {
    async fn authorize(&self, _secret: &ClientSecret, scopes: &[String]) -> Result<Credential> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        let mut credential = credential_expiring_in("authorized", Duration::hours(1));
        credential.scopes = scopes.to_vec();
        Ok(credential)
    }

    async fn refresh(&self, _secret: &ClientSecret, credential: &Credential) -> Result<Credential> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh {
            anyhow::bail!("invalid_grant");
        }
        Ok(Credential {
            access_token: format!("refreshed-{}", credential.access_token),
            expires_at: Utc::now() + Duration::hours(1),
            ..credential.clone()
        })
    }
}

#[derive(Default)]
struct FakeState {
    events: BTreeMap<String, Vec<RemoteEvent>>,
    inserted: Vec<(String, NewEvent)>,
    deleted: Vec<(String, String)>,
    queries: Vec<(String, EventQuery)>,
    next_id: usize,
}

/// A calendar account held in memory. Records every call it receives.
pub struct FakeCalendar {
    calendars: Vec<CalendarListEntry>,
    page_size: usize,
    state: Mutex<FakeState>,
}

impl FakeCalendar {
    /// `calendars` are `(display name, id)` pairs in listing order
    pub fn new(calendars: &[(&str, &str)]) -> Self {
        FakeCalendar {
            calendars: calendars
                .iter()
                .map(|(name, id)| CalendarListEntry {
                    id: id.to_string(),
                    summary: name.to_string(),
                })
                .collect(),
            page_size: 2,
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_events(self, calendar_id: &str, events: Vec<RemoteEvent>) -> Self {
        self.state
            .lock()
            .unwrap()
            .events
            .entry(calendar_id.to_string())
            .or_default()
            .extend(events);
        self
    }

    pub fn inserted(&self) -> Vec<(String, NewEvent)> {
        self.state.lock().unwrap().inserted.clone()
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn queries(&self) -> Vec<(String, EventQuery)> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn event_ids(&self, calendar_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .events
            .get(calendar_id)
            .map(|events| events.iter().map(|e| e.id.clone()).collect())
            .unwrap_or_default()
    }

    fn page<T: Clone>(&self, items: &[T], page_token: Option<&str>) -> (Vec<T>, Option<String>) {
        let start: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (start + self.page_size).min(items.len());
        let next = (end < items.len()).then(|| end.to_string());
        (items[start..end].to_vec(), next)
    }
}

impl CalendarApi for FakeCalendar {
    async fn list_calendars(&self, page_token: Option<&str>) -> Result<CalendarListPage> {
        let (items, next_page_token) = self.page(&self.calendars, page_token);
        Ok(CalendarListPage {
            items,
            next_page_token,
        })
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
        page_token: Option<&str>,
    ) -> Result<EventsPage> {
        let matching: Vec<RemoteEvent> = {
            let mut state = self.state.lock().unwrap();
            state.queries.push((calendar_id.to_string(), *query));
            let (from, until) = (query.time_min.date_naive(), query.time_max.date_naive());
            let mut matching: Vec<RemoteEvent> = state
                .events
                .get(calendar_id)
                .map(|events| {
                    events
                        .iter()
                        .filter(|e| {
                            e.start
                                .as_ref()
                                .and_then(|s| s.date)
                                .is_some_and(|d| d >= from && d < until)
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            matching.sort_by_key(|e| e.start.as_ref().and_then(|s| s.date));
            matching
        };

        let (items, next_page_token) = self.page(&matching, page_token);
        Ok(EventsPage {
            items,
            next_page_token,
        })
    }

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> Result<RemoteEvent> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = RemoteEvent {
            id: format!("created-{}", state.next_id),
            summary: Some(event.summary.clone()),
            start: Some(event.start.clone()),
        };
        state
            .events
            .entry(calendar_id.to_string())
            .or_default()
            .push(created.clone());
        state
            .inserted
            .push((calendar_id.to_string(), event.clone()));
        Ok(created)
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .deleted
            .push((calendar_id.to_string(), event_id.to_string()));
        let events = state.events.entry(calendar_id.to_string()).or_default();
        match events.iter().position(|e| e.id == event_id) {
            Some(index) => {
                events.remove(index);
                Ok(())
            }
            None => Err(KcalError::Api {
                status: 404,
                body: format!("event {} not found", event_id),
            }
            .into()),
        }
    }
}
