//! Google Calendar backend: OAuth flow and the v3 REST client.

mod client;
mod oauth;

pub use client::GoogleCalendar;
pub use oauth::GoogleAuthorizer;
