//! Daily morning briefing: weather, calendar, and news assembled into one
//! HTML email.
//!
//! `daybrief-rs` fetches data from a handful of independent services, formats
//! it into a presentation context, renders a Mustache-subset HTML template,
//! and delivers the result — by email or to a local file.
//!
//! The pipeline runs in three layers:
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`fetch`] | Service clients: weather, calendar, RSS news, AI summaries, email delivery — all with retry/backoff |
//! | [`briefing`] | The pure core: [`Context`](briefing::Context) model, template [`render`](briefing::render), data formatters, document assembler |
//! | [`config`] | YAML configuration loading and validation |
//!
//! Every fetch is independent and failure-tolerant: a dead weather API or an
//! unreachable feed downgrades its section of the briefing instead of
//! cancelling the morning email. Only configuration errors, a missing
//! template, and delivery failure abort a run.
//!
//! # Rendering
//!
//! The renderer implements exactly the constructs the briefing template
//! uses: `{{var}}` interpolation, `{{#name}}…{{/name}}` conditional and
//! iteration sections, and `{{^name}}…{{/name}}` inverted sections, with
//! arbitrary nesting. See [`briefing::render`] for the contract.
//!
//! ```
//! use daybrief_rs::briefing::{Context, render};
//!
//! let mut ctx = Context::new();
//! ctx.insert("city", "Portland");
//! ctx.insert("has_events", false);
//!
//! let out = render("{{city}}: {{^has_events}}nothing scheduled{{/has_events}}", &ctx).unwrap();
//! assert_eq!(out, "Portland: nothing scheduled");
//! ```

pub mod briefing;
pub mod config;
pub mod fetch;
pub mod prelude;

use serde::{Deserialize, Serialize};

// ── Domain types ───────────────────────────────────────────────────
//
// The raw shapes the fetch layer hands to the formatters. Kept plain and
// service-agnostic: the formatters neither know nor care which API a
// snapshot came from.

/// Current weather conditions, as fetched (imperial units, full precision —
/// display rounding happens in the formatter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Short condition label, e.g. "Clear" or "Rain".
    pub condition: String,
    /// Longer description, e.g. "scattered clouds".
    pub description: String,
}

/// One forecast slot (3-hour interval).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySlot {
    /// Display label like "3PM".
    pub time: String,
    /// Rounded temperature; `None` when the service omitted a reading.
    pub temperature: Option<i64>,
    /// Probability of precipitation, 0–100.
    pub rain_chance: i64,
    pub condition: String,
}

/// One calendar event for today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    /// ISO-8601 timestamp for timed events, a bare date for all-day ones.
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub all_day: bool,
}

/// One news article, accumulated across the pipeline: RSS fields first,
/// extracted page text and the AI summary filled in later when available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// RFC 2822 publication date, as the feed provided it.
    pub published: String,
    pub summary: String,
    /// Display title of the feed this came from.
    pub source: String,
    /// Extracted page text, when extraction succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// AI-generated summary, when summarization ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}
