//! Integration tests for the briefing pipeline: formatters, assembler, and
//! renderer driven through the real bundled email template.

use std::path::Path;

use chrono::{Local, TimeZone};
use daybrief_rs::briefing::{BriefingData, build_briefing};
use daybrief_rs::{Article, CalendarEvent, HourlySlot, WeatherSnapshot};

fn template_path() -> &'static Path {
    Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/templates/email_template.html"
    ))
}

fn fixed_now() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2026, 1, 5, 7, 30, 0).unwrap()
}

fn full_data() -> BriefingData {
    BriefingData {
        weather: Some(WeatherSnapshot {
            temperature: 71.6,
            temp_min: 63.9,
            temp_max: 77.2,
            condition: "Clouds".into(),
            description: "scattered clouds".into(),
        }),
        hourly: vec![
            HourlySlot {
                time: "9AM".into(),
                temperature: Some(66),
                rain_chance: 10,
                condition: "Clouds".into(),
            },
            HourlySlot {
                time: "12PM".into(),
                temperature: Some(72),
                rain_chance: 40,
                condition: "Rain".into(),
            },
        ],
        events: vec![
            CalendarEvent {
                title: "Standup".into(),
                start_time: "2026-01-05T09:30:00Z".into(),
                end_time: "2026-01-05T09:45:00Z".into(),
                location: "Room 4".into(),
                all_day: false,
            },
            CalendarEvent {
                title: "Offsite".into(),
                start_time: "2026-01-05".into(),
                end_time: "2026-01-06".into(),
                location: String::new(),
                all_day: true,
            },
        ],
        articles: vec![
            Article {
                title: "First story".into(),
                link: "https://example.com/1".into(),
                published: "Mon, 05 Jan 2026 08:00:00 GMT".into(),
                summary: "Lead paragraph.".into(),
                source: "Example Wire".into(),
                content: Some("Full text.".into()),
                ai_summary: Some("Condensed take.".into()),
            },
            Article {
                title: "Second story".into(),
                link: "https://example.com/2".into(),
                published: "Mon, 05 Jan 2026 06:00:00 GMT".into(),
                summary: "Another blurb.".into(),
                source: "Example Wire".into(),
                content: None,
                ai_summary: None,
            },
        ],
    }
}

#[test]
fn full_briefing_renders_every_section() {
    let html = build_briefing(template_path(), &full_data(), fixed_now()).unwrap();

    // Header labels.
    assert!(html.contains("Monday, January 05, 2026"));
    assert!(html.contains("07:30 AM"));

    // Weather: rounded display temperature and capitalized description.
    assert!(html.contains("72°F"));
    assert!(html.contains("Scattered clouds"));
    assert!(html.contains("High 77° / Low 64°"));
    assert!(!html.contains("Weather data is unavailable"));

    // Hourly strip in order.
    let nine = html.find("9AM").unwrap();
    let noon = html.find("12PM").unwrap();
    assert!(nine < noon);
    assert!(html.contains("40%"));

    // Events: a timed one and an all-day one.
    assert!(html.contains("09:30 AM"));
    assert!(html.contains("All Day"));
    assert!(html.contains("Room 4"));
    assert!(!html.contains("No events on the calendar"));

    // Articles, with the AI summary only where one exists.
    assert!(html.contains("First story"));
    assert!(html.contains("Condensed take."));
    assert!(html.contains("Another blurb."));
    assert!(!html.contains("No news articles"));

    // No unresolved tags of any kind may survive rendering.
    assert!(!html.contains("{{"), "unresolved template tags in output");
}

#[test]
fn empty_briefing_shows_every_fallback() {
    let html = build_briefing(template_path(), &BriefingData::default(), fixed_now()).unwrap();

    assert!(html.contains("Weather data is unavailable today."));
    assert!(html.contains("No events on the calendar today."));
    assert!(html.contains("No news articles this morning."));
    assert!(!html.contains("°F"));
    assert!(!html.contains("{{"));
}

#[test]
fn rendering_is_deterministic_end_to_end() {
    let data = full_data();
    let first = build_briefing(template_path(), &data, fixed_now()).unwrap();
    let second = build_briefing(template_path(), &data, fixed_now()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn article_without_ai_summary_keeps_rss_summary_only() {
    let mut data = full_data();
    data.articles.truncate(2);
    let html = build_briefing(template_path(), &data, fixed_now()).unwrap();

    // The second article has no AI summary; exactly one "Summary:" label
    // (the first article's) may appear.
    assert_eq!(html.matches("Summary:").count(), 1);
}
