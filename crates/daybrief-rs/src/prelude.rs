//! Convenience re-exports for common `daybrief-rs` types.
//!
//! Meant to be glob-imported when embedding the briefing pipeline:
//!
//! ```ignore
//! use daybrief_rs::prelude::*;
//! ```

// ── Domain types ────────────────────────────────────────────────────
pub use crate::{Article, CalendarEvent, HourlySlot, WeatherSnapshot};

// ── Core ────────────────────────────────────────────────────────────
pub use crate::briefing::{
    BriefingData, BriefingError, Context, TemplateError, Value, briefing_context, build_briefing,
    render,
};

// ── Configuration ───────────────────────────────────────────────────
pub use crate::config::{BriefingConfig, ConfigError, load_config};

// ── Service clients ─────────────────────────────────────────────────
pub use crate::fetch::{
    CalendarClient, EmailClient, NewsClient, OutboundEmail, SummarizerClient, WeatherClient,
    write_briefing,
};
