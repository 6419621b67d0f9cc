//! Document assembler: merges formatter output into one context and renders
//! the briefing template.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::debug;

use super::context::Context;
use super::format::{
    format_articles, format_calendar_events, format_hourly_forecast, format_weather,
};
use super::render::{TemplateError, render};
use crate::{Article, CalendarEvent, HourlySlot, WeatherSnapshot};

/// Everything the briefing document is built from, as handed over by the
/// fetch layer. Any piece may be missing or empty; the formatters turn that
/// into hidden template sections rather than failures.
#[derive(Debug, Clone, Default)]
pub struct BriefingData {
    pub weather: Option<WeatherSnapshot>,
    pub hourly: Vec<HourlySlot>,
    pub events: Vec<CalendarEvent>,
    pub articles: Vec<Article>,
}

/// Fatal conditions for one assembly call.
#[derive(Debug, Error)]
pub enum BriefingError {
    /// The one external read the assembler performs failed.
    #[error("failed to read template {}: {source}", path.display())]
    TemplateSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Build the merged presentation context for one render pass: the four
/// formatter sub-contexts plus the date and clock labels derived from `now`.
pub fn briefing_context(data: &BriefingData, now: DateTime<Local>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("date", now.format("%A, %B %d, %Y").to_string());
    ctx.insert("time", now.format("%I:%M %p").to_string());
    ctx.extend(format_weather(data.weather.as_ref()));
    ctx.extend(format_hourly_forecast(&data.hourly));
    ctx.extend(format_calendar_events(&data.events));
    ctx.extend(format_articles(&data.articles));
    ctx
}

/// Load the template at `template_path` and render the briefing document.
///
/// The template read happens exactly once, before rendering begins; a failed
/// read or a malformed template is fatal for this call and propagated.
pub fn build_briefing(
    template_path: &Path,
    data: &BriefingData,
    now: DateTime<Local>,
) -> Result<String, BriefingError> {
    let template =
        fs::read_to_string(template_path).map_err(|e| BriefingError::TemplateSource {
            path: template_path.to_path_buf(),
            source: e,
        })?;
    debug!(
        "rendering briefing template ({} bytes, {} articles, {} events)",
        template.len(),
        data.articles.len(),
        data.events.len(),
    );
    let ctx = briefing_context(data, now);
    Ok(render(&template, &ctx)?)
}
