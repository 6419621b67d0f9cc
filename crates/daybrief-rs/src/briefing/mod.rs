//! The briefing core: context model, template renderer, data formatters,
//! and the document assembler.
//!
//! Everything in this module is pure and synchronous — no I/O apart from the
//! assembler's single template read, no shared state, safe to call from
//! multiple tasks without coordination:
//!
//! - [`context`] — [`Context`]/[`Value`], the data model templates read from.
//! - [`render`] — the Mustache-subset substitution engine.
//! - [`format`] — raw payloads → presentation sub-contexts with
//!   availability flags.
//! - [`assemble`] — merge sub-contexts, load the template, produce the
//!   final HTML string.

pub mod assemble;
pub mod context;
pub mod format;
pub mod render;

// Re-export the items callers actually reach for.
pub use assemble::{BriefingData, BriefingError, briefing_context, build_briefing};
pub use context::{Context, Value};
pub use format::{
    format_articles, format_calendar_events, format_event_time, format_hourly_forecast,
    format_weather, weather_icon,
};
pub use render::{TemplateError, render};
