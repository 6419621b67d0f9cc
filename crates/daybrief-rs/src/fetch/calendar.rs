//! Google Calendar client: today's events from the primary calendar.
//!
//! Talks to the Calendar v3 REST API with a bearer access token supplied by
//! configuration — token acquisition and refresh live outside this program.

use std::time::Duration;

use chrono::{DateTime, Days, Local, Utc};
use serde::Deserialize;
use tracing::debug;

use super::retry::{RetryConfig, retry_call};
use crate::CalendarEvent;

const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";

/// Async HTTP client for the Google Calendar API.
pub struct CalendarClient {
    client: reqwest::Client,
    access_token: String,
    retry: RetryConfig,
}

#[derive(Deserialize, Debug)]
struct RawEvents {
    #[serde(default)]
    items: Vec<RawEvent>,
}

#[derive(Deserialize, Debug)]
struct RawEvent {
    summary: Option<String>,
    location: Option<String>,
    start: RawEventTime,
    end: RawEventTime,
}

/// Either `dateTime` (timed event) or `date` (all-day event) is set.
#[derive(Deserialize, Debug, Default)]
struct RawEventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

impl CalendarClient {
    pub fn new(access_token: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("daybrief/0.3")
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            access_token: access_token.into(),
            retry: RetryConfig::default(),
        })
    }

    /// Fetch today's events (local midnight to local midnight), expanded to
    /// single occurrences and ordered by start time.
    pub async fn todays_events(&self, now: DateTime<Local>) -> Result<Vec<CalendarEvent>, String> {
        let (time_min, time_max) = day_window(now)?;
        let events = retry_call(&self.retry, || self.fetch_events(&time_min, &time_max)).await?;
        debug!("calendar: {} event(s) between {time_min} and {time_max}", events.len());
        Ok(events)
    }

    async fn fetch_events(
        &self,
        time_min: &str,
        time_max: &str,
    ) -> Result<Vec<CalendarEvent>, String> {
        let resp = self
            .client
            .get(EVENTS_URL)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min),
                ("timeMax", time_max),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        if !status.is_success() {
            return Err(format!("calendar API HTTP {status}: {text}"));
        }
        parse_events(&text)
    }
}

/// Today's local-day boundaries as RFC3339 UTC instants.
fn day_window(now: DateTime<Local>) -> Result<(String, String), String> {
    let start_of_day = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).single())
        .ok_or_else(|| "could not resolve local midnight".to_string())?;
    let end_of_day = start_of_day
        .checked_add_days(Days::new(1))
        .ok_or_else(|| "could not resolve end of day".to_string())?;
    Ok((
        start_of_day.with_timezone(&Utc).to_rfc3339(),
        end_of_day.with_timezone(&Utc).to_rfc3339(),
    ))
}

fn parse_events(body: &str) -> Result<Vec<CalendarEvent>, String> {
    let raw: RawEvents =
        serde_json::from_str(body).map_err(|e| format!("malformed calendar response: {e}"))?;
    Ok(raw
        .items
        .into_iter()
        .map(|event| {
            let all_day = event.start.date.is_some();
            CalendarEvent {
                title: event.summary.unwrap_or_else(|| "No Title".to_string()),
                start_time: event
                    .start
                    .date_time
                    .or(event.start.date)
                    .unwrap_or_default(),
                end_time: event.end.date_time.or(event.end.date).unwrap_or_default(),
                location: event.location.unwrap_or_default(),
                all_day,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timed_event_parses() {
        let body = r#"{"items": [{
            "summary": "Standup",
            "location": "Room 4",
            "start": {"dateTime": "2026-01-05T09:30:00-08:00"},
            "end": {"dateTime": "2026-01-05T09:45:00-08:00"}
        }]}"#;
        let events = parse_events(body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Standup");
        assert_eq!(events[0].start_time, "2026-01-05T09:30:00-08:00");
        assert!(!events[0].all_day);
    }

    #[test]
    fn all_day_event_detected_by_date_field() {
        let body = r#"{"items": [{
            "summary": "Conference",
            "start": {"date": "2026-01-05"},
            "end": {"date": "2026-01-06"}
        }]}"#;
        let events = parse_events(body).unwrap();
        assert!(events[0].all_day);
        assert_eq!(events[0].start_time, "2026-01-05");
        assert_eq!(events[0].location, "");
    }

    #[test]
    fn missing_summary_becomes_no_title() {
        let body = r#"{"items": [{
            "start": {"dateTime": "2026-01-05T10:00:00Z"},
            "end": {"dateTime": "2026-01-05T11:00:00Z"}
        }]}"#;
        let events = parse_events(body).unwrap();
        assert_eq!(events[0].title, "No Title");
    }

    #[test]
    fn empty_response_yields_no_events() {
        assert!(parse_events("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_events("not json").is_err());
    }

    #[test]
    fn day_window_spans_one_day() {
        let now = Local.with_ymd_and_hms(2026, 1, 5, 7, 30, 0).unwrap();
        let (min, max) = day_window(now).unwrap();
        let start = DateTime::parse_from_rfc3339(&min).unwrap();
        let end = DateTime::parse_from_rfc3339(&max).unwrap();
        assert_eq!(end - start, chrono::TimeDelta::days(1));
    }
}
