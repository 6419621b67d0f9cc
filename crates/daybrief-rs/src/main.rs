//! Assemble and deliver the morning briefing.
//!
//! Fetches weather, calendar events, and news, generates AI article
//! summaries, renders the HTML email, and sends it to the configured
//! recipient — or saves it to a file with `--dry-run`.
//!
//! # Examples
//!
//! ```sh
//! # Send the briefing using ./config.yaml
//! daybrief
//!
//! # Save to ./output instead of sending, with debug logging
//! daybrief --config /etc/daybrief.yaml --dry-run --debug
//! ```

use std::path::{Path, PathBuf};
use std::process;

use chrono::Local;
use clap::Parser;
use tracing::{error, info, warn};

use daybrief_rs::briefing::{BriefingData, build_briefing};
use daybrief_rs::config::{BriefingConfig, FeedConfig, load_config};
use daybrief_rs::fetch::{
    CalendarClient, EmailClient, NewsClient, OutboundEmail, SummarizerClient, WeatherClient,
    write_briefing,
};

/// Assemble and deliver the morning briefing.
#[derive(Parser)]
#[command(name = "daybrief")]
struct Cli {
    /// Path to the configuration YAML file.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Path to the briefing HTML template.
    #[arg(long, default_value = "templates/email_template.html")]
    template: PathBuf,

    /// Save the briefing under ./output instead of sending it.
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let ok = run_briefing(&cli).await;
    process::exit(if ok { 0 } else { 1 });
}

/// Run the whole pipeline. Fetch failures degrade their section with a
/// warning; only configuration, template, and delivery failures fail the run.
async fn run_briefing(cli: &Cli) -> bool {
    info!("starting morning briefing");

    info!("loading configuration from {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            return false;
        }
    };

    let data = gather_data(&config).await;

    info!("building briefing HTML");
    let now = Local::now();
    let html = match build_briefing(&cli.template, &data, now) {
        Ok(html) => html,
        Err(e) => {
            error!("failed to build briefing: {e}");
            return false;
        }
    };

    if cli.dry_run {
        match write_briefing(&html, Path::new("output"), now) {
            Ok(path) => {
                info!("dry run: briefing saved to {}", path.display());
                true
            }
            Err(e) => {
                error!("failed to save briefing: {e}");
                false
            }
        }
    } else {
        let email = OutboundEmail {
            from: config.email.from_address.clone(),
            to: config.email.recipient.clone(),
            subject: config.email.subject.clone(),
            html,
        };
        let client = match EmailClient::new(&config.apis.sparkpost_key) {
            Ok(client) => client,
            Err(e) => {
                error!("email client unavailable: {e}");
                return false;
            }
        };
        info!("sending briefing to {}", email.to);
        match client.send(&email).await {
            Ok(()) => {
                info!("briefing sent");
                true
            }
            Err(e) => {
                error!("failed to send briefing: {e}");
                false
            }
        }
    }
}

/// Fetch every data source, degrading each on failure.
async fn gather_data(config: &BriefingConfig) -> BriefingData {
    let mut data = BriefingData::default();

    // Weather first; the forecast strip only makes sense when current
    // conditions came through.
    match WeatherClient::new(&config.apis.openweather_key) {
        Ok(client) => {
            let city = &config.location.city;
            let country = &config.location.country_code;
            info!("fetching weather for {city},{country}");
            match client.current(city, country).await {
                Ok(snapshot) => {
                    info!("weather: {}, {:.0}°F", snapshot.condition, snapshot.temperature);
                    data.weather = Some(snapshot);
                    match client.hourly_forecast(city, country).await {
                        Ok(slots) => {
                            info!("hourly forecast: {} slot(s)", slots.len());
                            data.hourly = slots;
                        }
                        Err(e) => warn!("hourly forecast fetch failed: {e}"),
                    }
                }
                Err(e) => warn!("weather fetch failed: {e}"),
            }
        }
        Err(e) => warn!("weather client unavailable: {e}"),
    }

    // Calendar is optional — without a token the section just stays hidden.
    match &config.calendar {
        Some(calendar) => match CalendarClient::new(&calendar.access_token) {
            Ok(client) => match client.todays_events(Local::now()).await {
                Ok(events) => {
                    info!("found {} calendar event(s)", events.len());
                    data.events = events;
                }
                Err(e) => warn!("calendar fetch failed: {e}"),
            },
            Err(e) => warn!("calendar client unavailable: {e}"),
        },
        None => warn!("calendar access token not configured; skipping calendar"),
    }

    // News: fetch feeds, pull article text, then summarize.
    match NewsClient::new() {
        Ok(client) => {
            info!("fetching news articles");
            let feeds: Vec<FeedConfig> = config.news.rss_feeds.values().cloned().collect();
            let mut articles = client.fetch_news(&feeds, config.news.max_articles).await;
            info!("fetched {} news article(s)", articles.len());

            if !articles.is_empty() {
                info!("extracting article content");
                for article in &mut articles {
                    if article.link.is_empty() {
                        article.content = Some(article.summary.clone());
                        continue;
                    }
                    match client.article_content(&article.link).await {
                        Ok(content) => article.content = Some(content),
                        Err(e) => {
                            warn!("content extraction failed for '{}': {e}", article.title);
                            article.content = Some(article.summary.clone());
                        }
                    }
                }

                match SummarizerClient::new(&config.apis.openai_key) {
                    Ok(summarizer) => {
                        info!("generating AI summaries");
                        summarizer
                            .summarize_articles(&mut articles, config.news.summary_sentences)
                            .await;
                    }
                    Err(e) => warn!("summarizer unavailable: {e}"),
                }
            }
            data.articles = articles;
        }
        Err(e) => warn!("news client unavailable: {e}"),
    }

    data
}
