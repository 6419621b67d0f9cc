//! AI article summarization via the OpenAI chat completions API.
//!
//! One short completion per article. A failed summary degrades to an error
//! note in that article's `ai_summary` field; it never stops the batch.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::retry::{RetryConfig, retry_call};
use crate::Article;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Model used for summaries — short factual output, cheap tier.
const SUMMARY_MODEL: &str = "gpt-3.5-turbo";
const SUMMARY_MAX_TOKENS: u32 = 150;
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Pause between consecutive summary calls, to stay clear of rate limits.
const CALL_DELAY: Duration = Duration::from_secs(1);

const SYSTEM_PROMPT: &str = "You are a helpful assistant that creates concise article summaries.";

// ── Request / response shapes ──────────────────────────────────────

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Async HTTP client for the summarization API.
pub struct SummarizerClient {
    client: reqwest::Client,
    api_key: String,
    retry: RetryConfig,
}

impl SummarizerClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("daybrief/0.3")
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            retry: RetryConfig::default(),
        })
    }

    /// Summarize one article text in `num_sentences` sentences.
    pub async fn summarize_article(
        &self,
        article_text: &str,
        num_sentences: usize,
    ) -> Result<String, String> {
        let prompt = summary_prompt(article_text, num_sentences);
        retry_call(&self.retry, || self.chat(&prompt)).await
    }

    /// Summarize a batch of articles, filling each `ai_summary` in place.
    ///
    /// Per-article failures are recorded in the article itself so the rest
    /// of the batch (and the briefing) still goes out.
    pub async fn summarize_articles(&self, articles: &mut [Article], num_sentences: usize) {
        for (idx, article) in articles.iter_mut().enumerate() {
            if idx > 0 {
                tokio::time::sleep(CALL_DELAY).await;
            }
            let text = article_text(article);
            if text.is_empty() {
                article.ai_summary = Some("No content available for summarization.".to_string());
                continue;
            }
            match self.summarize_article(&text, num_sentences).await {
                Ok(summary) => article.ai_summary = Some(summary),
                Err(e) => {
                    warn!("summarization failed for '{}': {e}", article.title);
                    article.ai_summary = Some(format!("Error: {e}"));
                }
            }
        }
    }

    async fn chat(&self, prompt: &str) -> Result<String, String> {
        let body = ChatRequest {
            model: SUMMARY_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: SUMMARY_MAX_TOKENS,
            temperature: SUMMARY_TEMPERATURE,
        };
        debug!("summarizer request: {} chars of prompt", prompt.len());

        let resp = self
            .client
            .post(OPENAI_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        if !status.is_success() {
            return Err(format!("summarizer API HTTP {status}: {text}"));
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(err) = parsed.error {
            return Err(format!("summarizer API error: {}", err.message));
        }

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| "empty summarizer response".to_string())
    }
}

fn summary_prompt(article_text: &str, num_sentences: usize) -> String {
    format!("Summarize the following article in exactly {num_sentences} sentences:\n\n{article_text}")
}

/// The best available text for an article: extracted content, then the RSS
/// summary, then the bare title.
fn article_text(article: &Article) -> String {
    if let Some(content) = article.content.as_deref()
        && !content.is_empty()
    {
        return content.to_string();
    }
    if !article.summary.is_empty() {
        return article.summary.clone();
    }
    article.title.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            title: "Headline".into(),
            link: "https://example.com/a".into(),
            published: String::new(),
            summary: "RSS blurb".into(),
            source: "Wire".into(),
            content: None,
            ai_summary: None,
        }
    }

    #[test]
    fn prompt_names_the_sentence_count() {
        let prompt = summary_prompt("body text", 3);
        assert!(prompt.contains("exactly 3 sentences"));
        assert!(prompt.ends_with("body text"));
    }

    #[test]
    fn article_text_prefers_extracted_content() {
        let mut a = article();
        a.content = Some("full extracted text".into());
        assert_eq!(article_text(&a), "full extracted text");
    }

    #[test]
    fn article_text_falls_back_to_summary_then_title() {
        let mut a = article();
        assert_eq!(article_text(&a), "RSS blurb");
        a.summary = String::new();
        assert_eq!(article_text(&a), "Headline");
    }

    #[test]
    fn request_body_serializes_expected_fields() {
        let body = ChatRequest {
            model: SUMMARY_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: SUMMARY_MAX_TOKENS,
            temperature: SUMMARY_TEMPERATURE,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 150);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn successful_response_parses_to_content() {
        let body = r#"{"choices": [{"message": {"content": "  A summary.  "}}]}"#;
        let parsed: RawChatResponse = serde_json::from_str(body).unwrap();
        let content = parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string());
        assert_eq!(content.as_deref(), Some("A summary."));
    }

    #[test]
    fn api_error_payload_parses() {
        let body = r#"{"error": {"message": "quota exceeded"}}"#;
        let parsed: RawChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.unwrap().message, "quota exceeded");
    }
}
