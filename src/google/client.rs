//! Google Calendar API v3 over HTTPS.

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::{CalendarApi, CalendarListPage, EventQuery, EventsPage, NewEvent, RemoteEvent};
use crate::credentials::{Authorizer, CredentialManager};
use crate::error::KcalError;

/// Calendar API client. Every request asks the credential manager for a
/// valid token first, so refreshes happen transparently mid-run.
pub struct GoogleCalendar<A> {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialManager<A>,
}

impl<A: Authorizer> GoogleCalendar<A> {
    pub fn new(base_url: impl Into<String>, credentials: CredentialManager<A>) -> Self {
        GoogleCalendar {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let credential = self.credentials.obtain().await?;

        let response = request
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .context("Calendar API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KcalError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to parse Calendar API response")
    }
}

impl<A: Authorizer> CalendarApi for GoogleCalendar<A> {
    async fn list_calendars(&self, page_token: Option<&str>) -> Result<CalendarListPage> {
        let mut request = self
            .http
            .get(format!("{}/users/me/calendarList", self.base_url));

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        self.send_json(request).await
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
        page_token: Option<&str>,
    ) -> Result<EventsPage> {
        let mut request = self.http.get(self.events_url(calendar_id)).query(&[
            ("timeMin", query.time_min.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            ("timeMax", query.time_max.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        self.send_json(request).await
    }

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> Result<RemoteEvent> {
        let request = self.http.post(self.events_url(calendar_id)).json(event);
        self.send_json(request).await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let url = format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        );

        match self.send(self.http.delete(url)).await {
            Ok(_) => Ok(()),
            Err(e) => {
                let gone = matches!(
                    e.downcast_ref::<KcalError>(),
                    Some(KcalError::Api { status, .. }) if *status == StatusCode::GONE.as_u16()
                );
                if gone {
                    tracing::debug!(event_id, "event already deleted");
                    Ok(())
                } else {
                    Err(e)
                }
            }
        }
    }
}
