//! The remote calendar operations kcal relies on, and the wire types they use.
//!
//! Field names follow Google Calendar API v3 so the types serialize straight
//! into request bodies and out of responses.

#![allow(async_fn_in_trait)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the calendar list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListPage {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Start or end of an event. All-day events carry `date`, timed ones `dateTime`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// An event as listed by the service. Only what duplicate matching needs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<EventDateTime>,
}

impl RemoteEvent {
    /// `YYYY-MM-DD` start date, present for all-day events only
    pub fn start_date_key(&self) -> Option<String> {
        self.start
            .as_ref()
            .and_then(|start| start.date)
            .map(|date| date.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<RemoteEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Request body for inserting an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

/// Query window for an event listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

/// The remote calendar service.
///
/// Listing calls return a single page; callers follow `next_page_token`.
pub trait CalendarApi {
    async fn list_calendars(&self, page_token: Option<&str>) -> Result<CalendarListPage>;

    /// Events in the window, recurring events expanded, ordered by start time
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
        page_token: Option<&str>,
    ) -> Result<EventsPage>;

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> Result<RemoteEvent>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_event_serializes_to_api_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 5).unwrap();
        let event = NewEvent {
            summary: "Work party".to_string(),
            location: None,
            description: Some("Bring gloves".to_string()),
            start: EventDateTime {
                date: Some(date),
                date_time: None,
                time_zone: Some("America/Los_Angeles".to_string()),
            },
            end: EventDateTime {
                date: date.succ_opt(),
                date_time: None,
                time_zone: Some("America/Los_Angeles".to_string()),
            },
        };

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "summary": "Work party",
                "description": "Bring gloves",
                "start": {"date": "2025-04-05", "timeZone": "America/Los_Angeles"},
                "end": {"date": "2025-04-06", "timeZone": "America/Los_Angeles"},
            })
        );
    }

    #[test]
    fn test_remote_event_start_date_key() {
        let all_day: RemoteEvent = serde_json::from_value(json!({
            "id": "a1",
            "summary": "Potluck",
            "start": {"date": "2025-04-12"},
        }))
        .unwrap();
        assert_eq!(all_day.start_date_key().as_deref(), Some("2025-04-12"));

        let timed: RemoteEvent = serde_json::from_value(json!({
            "id": "b2",
            "summary": "Meeting",
            "start": {"dateTime": "2025-04-12T18:00:00Z"},
        }))
        .unwrap();
        assert_eq!(timed.start_date_key(), None);

        let untitled: RemoteEvent = serde_json::from_value(json!({"id": "c3"})).unwrap();
        assert_eq!(untitled.summary, None);
        assert_eq!(untitled.start_date_key(), None);
    }
}
