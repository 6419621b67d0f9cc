//! Outbound delivery: send the briefing via the SparkPost transmissions API,
//! or persist it to a timestamped file for dry runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::retry::{RetryConfig, retry_call};

const TRANSMISSIONS_URL: &str = "https://api.sparkpost.com/api/v1/transmissions";

/// Async HTTP client for the SparkPost email API.
pub struct EmailClient {
    client: reqwest::Client,
    api_key: String,
    retry: RetryConfig,
}

#[derive(Deserialize, Debug)]
struct RawTransmission {
    #[serde(default)]
    results: Option<TransmissionResults>,
}

#[derive(Deserialize, Debug, Default)]
struct TransmissionResults {
    #[serde(default)]
    total_accepted_recipients: u32,
}

/// One outbound email, addressed and filled in.
#[derive(Serialize, Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl EmailClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("daybrief/0.3")
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            retry: RetryConfig::default(),
        })
    }

    /// Send the email, retrying transient failures. Succeeds only when the
    /// API reports at least one accepted recipient.
    pub async fn send(&self, email: &OutboundEmail) -> Result<(), String> {
        retry_call(&self.retry, || self.transmit(email)).await
    }

    async fn transmit(&self, email: &OutboundEmail) -> Result<(), String> {
        let body = transmission_body(email);
        let resp = self
            .client
            .post(TRANSMISSIONS_URL)
            .header("Authorization", &self.api_key)
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
            return Err(format!("SparkPost API HTTP {status}: {text}"));
        }

        let parsed: RawTransmission =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;
        let accepted = parsed.results.unwrap_or_default().total_accepted_recipients;
        if accepted == 0 {
            return Err("no recipients accepted".to_string());
        }
        debug!("SparkPost accepted {accepted} recipient(s)");
        Ok(())
    }
}

/// The SparkPost transmissions payload for one email.
fn transmission_body(email: &OutboundEmail) -> serde_json::Value {
    json!({
        "recipients": [{"address": {"email": email.to}}],
        "content": {
            "from": {"email": email.from},
            "subject": email.subject,
            "html": email.html,
        },
    })
}

/// Persist the rendered briefing to `output_dir/briefing_YYYYMMDD_HHMMSS.html`
/// instead of sending it. Returns the path written.
pub fn write_briefing(
    html: &str,
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf, String> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("failed to create {}: {e}", output_dir.display()))?;
    let path = output_dir.join(format!("briefing_{}.html", now.format("%Y%m%d_%H%M%S")));
    std::fs::write(&path, html).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    info!("briefing saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn transmission_body_addresses_recipient_and_content() {
        let email = OutboundEmail {
            from: "briefing@example.com".into(),
            to: "me@example.com".into(),
            subject: "Morning Briefing".into(),
            html: "<html></html>".into(),
        };
        let body = transmission_body(&email);
        assert_eq!(body["recipients"][0]["address"]["email"], "me@example.com");
        assert_eq!(body["content"]["from"]["email"], "briefing@example.com");
        assert_eq!(body["content"]["subject"], "Morning Briefing");
        assert_eq!(body["content"]["html"], "<html></html>");
    }

    #[test]
    fn accepted_recipients_parse() {
        let body = r#"{"results": {"total_accepted_recipients": 1, "id": "tx-1"}}"#;
        let parsed: RawTransmission = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results.unwrap().total_accepted_recipients, 1);
    }

    #[test]
    fn missing_results_counts_as_zero_accepted() {
        let parsed: RawTransmission = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.results.unwrap_or_default().total_accepted_recipients, 0);
    }

    #[test]
    fn write_briefing_creates_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2026, 1, 5, 7, 30, 0).unwrap();
        let path = write_briefing("<html>hi</html>", dir.path(), now).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "briefing_20260105_073000.html"
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html>hi</html>");
    }
}
