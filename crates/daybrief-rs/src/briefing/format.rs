//! Data formatters: raw service payloads → presentation sub-contexts.
//!
//! Each formatter takes one raw payload (or its absence) and returns a
//! [`Context`] carrying an availability flag plus display-ready fields. None
//! of them can fail — missing upstream data yields a flag of `false` and an
//! empty sub-context, so one dead service never blocks the rest of the
//! briefing. The availability flags are always derived from the same
//! non-emptiness check the template sections gate on, so the two never
//! disagree.

use chrono::{DateTime, NaiveDateTime};

use super::context::Context;
use crate::{Article, CalendarEvent, HourlySlot, WeatherSnapshot};

/// Ordered (keyword, icon) table for condition → icon mapping. Checked top
/// to bottom with case-insensitive substring matching; first match wins.
/// "partly" must sit after "clouds"/"cloud" so "Partly cloudy" still maps
/// through the cloud keywords the way OpenWeatherMap labels arrive.
const ICON_TABLE: &[(&str, &str)] = &[
    ("clear", "☀️"),
    ("rain", "🌧️"),
    ("drizzle", "🌧️"),
    ("clouds", "⛅"),
    ("cloud", "⛅"),
    ("partly", "🌤️"),
    ("thunderstorm", "⛈️"),
    ("snow", "❄️"),
    ("mist", "🌫️"),
    ("fog", "🌫️"),
    ("haze", "🌫️"),
];

const DEFAULT_ICON: &str = "🌤️";

/// Map a weather condition label to a representative emoji icon.
pub fn weather_icon(condition: &str) -> &'static str {
    let lower = condition.to_lowercase();
    ICON_TABLE
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_ICON)
}

/// First letter uppercased, the rest lowercased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Format current weather for the template. `None` yields only
/// `weather_available: false`; temperatures are rounded to whole degrees
/// for display.
pub fn format_weather(weather: Option<&WeatherSnapshot>) -> Context {
    let Some(weather) = weather else {
        return Context::new().with("weather_available", false);
    };
    Context::new()
        .with("weather_available", true)
        .with("weather_icon", weather_icon(&weather.condition))
        .with("temperature", weather.temperature.round() as i64)
        .with("temp_min", weather.temp_min.round() as i64)
        .with("temp_max", weather.temp_max.round() as i64)
        .with("condition", weather.condition.as_str())
        .with("description", capitalize(&weather.description))
}

/// Format the hourly forecast strip. Slots with no temperature reading are
/// dropped; if nothing survives, `has_hourly_forecast` is false.
pub fn format_hourly_forecast(slots: &[HourlySlot]) -> Context {
    let hourly: Vec<Context> = slots
        .iter()
        .filter_map(|slot| {
            let temperature = slot.temperature?;
            Some(
                Context::new()
                    .with("time", slot.time.as_str())
                    .with("icon", weather_icon(&slot.condition))
                    .with("rain_chance", slot.rain_chance)
                    .with("temperature", temperature),
            )
        })
        .collect();

    Context::new()
        .with("has_hourly_forecast", !hourly.is_empty())
        .with("hourly", hourly)
}

/// Display label for an event time: the literal `All Day` for all-day
/// events, otherwise the stored ISO-8601 timestamp reformatted as a 12-hour
/// clock. A timestamp that fails to parse is shown unchanged.
pub fn format_event_time(start_time: &str, all_day: bool) -> String {
    if all_day {
        return "All Day".to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(start_time) {
        return dt.format("%I:%M %p").to_string();
    }
    // Timestamps without a UTC offset, e.g. "2026-01-05T14:30:00".
    if let Ok(dt) = NaiveDateTime::parse_from_str(start_time, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%I:%M %p").to_string();
    }
    start_time.to_string()
}

/// Format calendar events for the template.
pub fn format_calendar_events(events: &[CalendarEvent]) -> Context {
    let items: Vec<Context> = events
        .iter()
        .map(|event| {
            Context::new()
                .with("title", event.title.as_str())
                .with("time", format_event_time(&event.start_time, event.all_day))
                .with("location", event.location.as_str())
        })
        .collect();

    Context::new()
        .with("has_events", !items.is_empty())
        .with("events", items)
}

/// Format news articles for the template. Articles pass through largely
/// unchanged — every display field becomes interpolatable, and the optional
/// AI summary doubles as its own section gate (empty when absent).
pub fn format_articles(articles: &[Article]) -> Context {
    let items: Vec<Context> = articles
        .iter()
        .map(|article| {
            Context::new()
                .with("title", article.title.as_str())
                .with("link", article.link.as_str())
                .with("published", article.published.as_str())
                .with("summary", article.summary.as_str())
                .with("source", article.source.as_str())
                .with("ai_summary", article.ai_summary.as_deref().unwrap_or_default())
        })
        .collect();

    Context::new()
        .with("has_articles", !items.is_empty())
        .with("articles", items)
}
