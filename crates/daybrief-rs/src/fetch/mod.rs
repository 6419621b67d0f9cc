//! Fetch layer: the external service clients the briefing pulls from.
//!
//! Everything between the orchestrator and the outside world lives here:
//!
//! - [`retry`] — transient error detection (429, 5xx, timeouts) with
//!   exponential backoff. Permanent errors (400/401, bad keys) fail fast.
//! - [`weather`] — OpenWeatherMap current conditions + 3-hourly forecast.
//! - [`calendar`] — Google Calendar events for today's local window.
//! - [`news`] — RSS feed download/parse and article text extraction.
//! - [`summarizer`] — per-article AI summaries via chat completions.
//! - [`delivery`] — SparkPost send, or a timestamped file for dry runs.
//!
//! All clients return `Result<T, String>` with formatted messages — the
//! retry layer classifies errors by their text, and the orchestrator only
//! ever logs them. A failed fetch degrades the matching briefing section;
//! it never takes the whole run down.

pub mod calendar;
pub mod delivery;
pub mod news;
pub mod retry;
pub mod summarizer;
pub mod weather;

// Re-export commonly used items at the module level.
pub use calendar::CalendarClient;
pub use delivery::{EmailClient, OutboundEmail, write_briefing};
pub use news::NewsClient;
pub use retry::RetryConfig;
pub use summarizer::SummarizerClient;
pub use weather::WeatherClient;
