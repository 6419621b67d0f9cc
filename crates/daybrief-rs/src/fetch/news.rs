//! News fetching: RSS feeds and article content extraction.
//!
//! Feeds are fetched one by one with a polite delay in between; a feed that
//! fails to download or parse is logged and skipped so the rest of the news
//! section still arrives. Articles are sorted newest-first by their RFC 2822
//! `pubDate` and truncated to the configured maximum.

// Slice offsets below come from `find`/`find_ci` hits on ASCII markup
// delimiters, which always sit on char boundaries.
#![allow(clippy::string_slice)]

use std::time::Duration;

use chrono::DateTime;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, warn};

use super::retry::{RetryConfig, retry_call};
use crate::Article;
use crate::config::FeedConfig;

/// Pause between consecutive feed downloads.
const FEED_DELAY: Duration = Duration::from_millis(500);

/// Hard cap on extracted article text handed to the summarizer.
const MAX_CONTENT_CHARS: usize = 5000;

/// Elements whose entire content is dropped during text extraction.
const DROPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Async HTTP client for RSS feeds and article pages.
pub struct NewsClient {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl NewsClient {
    pub fn new() -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; daybrief/0.3)")
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            retry: RetryConfig::default(),
        })
    }

    /// Download and parse every configured feed, returning up to
    /// `max_articles` articles, newest first. Individual feed failures are
    /// logged and skipped; this never fails as a whole.
    pub async fn fetch_news(&self, feeds: &[FeedConfig], max_articles: usize) -> Vec<Article> {
        let mut all = Vec::new();
        for (idx, feed) in feeds.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(FEED_DELAY).await;
            }
            let xml = match self.fetch_body(&feed.url).await {
                Ok(xml) => xml,
                Err(e) => {
                    warn!("error fetching feed {}: {e}", feed.url);
                    continue;
                }
            };
            match parse_rss(&xml, &feed.title) {
                Ok(articles) => {
                    debug!("feed {}: {} article(s)", feed.url, articles.len());
                    all.extend(articles);
                }
                Err(e) => warn!("error parsing feed {}: {e}", feed.url),
            }
        }
        select_articles(all, max_articles)
    }

    /// Fetch an article page and reduce it to readable text, retrying
    /// transient failures.
    pub async fn article_content(&self, url: &str) -> Result<String, String> {
        let html = retry_call(&self.retry, || self.fetch_body(url)).await?;
        Ok(extract_text(&html))
    }

    async fn fetch_body(&self, url: &str) -> Result<String, String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {status} fetching {url}"));
        }
        resp.text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))
    }
}

// ── RSS parsing ────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum ItemField {
    Title,
    Link,
    Published,
    Summary,
}

#[derive(Default)]
struct PartialItem {
    title: String,
    link: String,
    published: String,
    summary: String,
}

impl PartialItem {
    fn push(&mut self, field: ItemField, text: &str) {
        let slot = match field {
            ItemField::Title => &mut self.title,
            ItemField::Link => &mut self.link,
            ItemField::Published => &mut self.published,
            ItemField::Summary => &mut self.summary,
        };
        slot.push_str(text);
    }

    fn into_article(self, source: &str) -> Article {
        Article {
            title: self.title,
            link: self.link,
            published: self.published,
            summary: self.summary,
            source: source.to_string(),
            content: None,
            ai_summary: None,
        }
    }
}

/// Parse an RSS 2.0 document into articles tagged with the feed's display
/// title. An `<item>` missing some fields still parses — the fields stay
/// empty — so one sparse entry never sinks the rest of the feed.
pub fn parse_rss(xml: &str, source_title: &str) -> Result<Vec<Article>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut articles = Vec::new();
    let mut in_item = false;
    let mut field: Option<ItemField> = None;
    let mut current = PartialItem::default();

    loop {
        match reader.read_event() {
            Err(e) => return Err(format!("malformed feed XML: {e}")),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" => {
                    in_item = true;
                    current = PartialItem::default();
                }
                b"title" if in_item => field = Some(ItemField::Title),
                b"link" if in_item => field = Some(ItemField::Link),
                b"pubDate" if in_item => field = Some(ItemField::Published),
                b"description" if in_item => field = Some(ItemField::Summary),
                _ => field = None,
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"item" && in_item {
                    articles.push(std::mem::take(&mut current).into_article(source_title));
                    in_item = false;
                }
                field = None;
            }
            Ok(Event::Text(e)) => {
                if let Some(f) = field {
                    let text = e
                        .decode()
                        .map_err(|err| format!("malformed feed text: {err}"))?;
                    current.push(f, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(f) = field {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    current.push(f, &text);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(f) = field {
                    let name = e
                        .decode()
                        .map_err(|err| format!("malformed feed entity: {err}"))?;
                    if let Some(resolved) = resolve_entity(&name) {
                        current.push(f, &resolved);
                    }
                }
            }
            Ok(_) => {}
        }
    }
    Ok(articles)
}

/// Sort newest-first by `pubDate` (unparseable dates last) and truncate.
fn select_articles(mut all: Vec<Article>, max_articles: usize) -> Vec<Article> {
    all.sort_by_key(|article| {
        std::cmp::Reverse(DateTime::parse_from_rfc2822(&article.published).ok())
    });
    all.truncate(max_articles);
    all
}

// ── Article text extraction ────────────────────────────────────────

/// Reduce an HTML page to plain text: prefer the `<article>` element, fall
/// back to `<body>`, then the whole document; drop script/style/chrome
/// elements; strip remaining tags; decode common entities; collapse
/// whitespace; cap the length.
pub fn extract_text(html: &str) -> String {
    let scoped = element_content(html, "article")
        .or_else(|| element_content(html, "body"))
        .unwrap_or(html);

    let mut out = String::with_capacity(scoped.len() / 2);
    let mut rest = scoped;
    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        out.push(' ');
        let tag_rest = &rest[lt + 1..];
        if let Some(name) = open_tag_name(tag_rest)
            && DROPPED_ELEMENTS.contains(&name.as_str())
            && let Some(after_close) = skip_past_close(tag_rest, &name)
        {
            rest = after_close;
            continue;
        }
        match tag_rest.find('>') {
            Some(gt) => rest = &tag_rest[gt + 1..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);

    let decoded = decode_entities(&out);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_CONTENT_CHARS).collect()
}

/// Case-insensitive substring search. The needle must be ASCII, which also
/// guarantees any returned offset is a char boundary.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// The content between `<name …>` and the first `</name>` after it.
fn element_content<'a>(html: &'a str, name: &str) -> Option<&'a str> {
    let open_pat = format!("<{name}");
    let start = find_ci(html, &open_pat)?;
    let after_open = &html[start + open_pat.len()..];
    let gt = after_open.find('>')?;
    let content = &after_open[gt + 1..];
    let close_pat = format!("</{name}");
    let end = find_ci(content, &close_pat)?;
    Some(&content[..end])
}

/// The lowercased element name of an opening tag, or `None` for close tags,
/// comments, and other non-element markup.
fn open_tag_name(after_lt: &str) -> Option<String> {
    let mut name = String::new();
    for c in after_lt.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else {
            break;
        }
    }
    if name.is_empty() { None } else { Some(name) }
}

/// Skip from an opening tag (sans `<`) past the matching `</name…>`.
fn skip_past_close<'a>(after_lt: &'a str, name: &str) -> Option<&'a str> {
    let close_pat = format!("</{name}");
    let close = find_ci(after_lt, &close_pat)?;
    let after_close = &after_lt[close + close_pat.len()..];
    let gt = after_close.find('>')?;
    Some(&after_close[gt + 1..])
}

/// Resolve one entity name (without `&`/`;`) to its text.
fn resolve_entity(name: &str) -> Option<String> {
    match name {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        "nbsp" => Some(" ".to_string()),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse().ok()?
            };
            char::from_u32(code).map(String::from)
        }
    }
}

/// Decode the handful of entities that matter for readable text. Anything
/// unrecognized is left as-is.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match after.find(';') {
            // Entity names are short; a distant `;` means this `&` is literal.
            Some(semi) if semi <= 8 => match resolve_entity(&after[..semi]) {
                Some(resolved) => {
                    out.push_str(&resolved);
                    rest = &after[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = after;
                }
            },
            _ => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
