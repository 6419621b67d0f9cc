//! OpenWeatherMap client: current conditions and the 3-hourly forecast.

use std::time::Duration;

use chrono::{Local, TimeZone};
use serde::Deserialize;
use tracing::debug;

use super::retry::{RetryConfig, retry_call};
use crate::{HourlySlot, WeatherSnapshot};

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// How many forecast slots the briefing shows (3-hour intervals).
const FORECAST_SLOTS: usize = 4;

/// Async HTTP client for the OpenWeatherMap API.
pub struct WeatherClient {
    client: reqwest::Client,
    api_key: String,
    retry: RetryConfig,
}

// ── Raw response shapes (internal deserialization targets) ─────────

#[derive(Deserialize, Debug)]
struct RawCurrent {
    main: RawMain,
    weather: Vec<RawCondition>,
}

#[derive(Deserialize, Debug)]
struct RawMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Deserialize, Debug)]
struct RawCondition {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize, Debug)]
struct RawForecast {
    list: Vec<RawForecastEntry>,
}

#[derive(Deserialize, Debug)]
struct RawForecastEntry {
    dt: i64,
    main: RawForecastMain,
    /// Probability of precipitation, 0.0–1.0.
    #[serde(default)]
    pop: f64,
    #[serde(default)]
    weather: Vec<RawCondition>,
}

#[derive(Deserialize, Debug)]
struct RawForecastMain {
    temp: Option<f64>,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("daybrief/0.3")
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            retry: RetryConfig::default(),
        })
    }

    /// Fetch current conditions for a city, in imperial units.
    pub async fn current(&self, city: &str, country_code: &str) -> Result<WeatherSnapshot, String> {
        retry_call(&self.retry, || self.fetch_current(city, country_code)).await
    }

    /// Fetch the next few 3-hour forecast slots for a city.
    pub async fn hourly_forecast(
        &self,
        city: &str,
        country_code: &str,
    ) -> Result<Vec<HourlySlot>, String> {
        retry_call(&self.retry, || self.fetch_forecast(city, country_code)).await
    }

    async fn fetch_current(&self, city: &str, country_code: &str) -> Result<WeatherSnapshot, String> {
        let body = self
            .get_json(CURRENT_URL, city, country_code, &[])
            .await
            .map_err(|e| format!("weather {e}"))?;
        let raw: RawCurrent = serde_json::from_str(&body)
            .map_err(|e| format!("malformed weather response: {e}"))?;
        let condition = raw
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| "malformed weather response: no conditions".to_string())?;
        debug!(
            "weather: {} {:.1}°F ({:.0}–{:.0})",
            condition.main, raw.main.temp, raw.main.temp_min, raw.main.temp_max,
        );
        Ok(WeatherSnapshot {
            temperature: raw.main.temp,
            temp_min: raw.main.temp_min,
            temp_max: raw.main.temp_max,
            condition: condition.main,
            description: condition.description,
        })
    }

    async fn fetch_forecast(&self, city: &str, country_code: &str) -> Result<Vec<HourlySlot>, String> {
        let body = self
            .get_json(FORECAST_URL, city, country_code, &[("cnt", "40")])
            .await
            .map_err(|e| format!("forecast {e}"))?;
        let raw: RawForecast = serde_json::from_str(&body)
            .map_err(|e| format!("malformed forecast response: {e}"))?;
        Ok(raw
            .list
            .into_iter()
            .take(FORECAST_SLOTS)
            .map(slot_from_entry)
            .collect())
    }

    async fn get_json(
        &self,
        url: &str,
        city: &str,
        country_code: &str,
        extra: &[(&str, &str)],
    ) -> Result<String, String> {
        let mut query: Vec<(&str, String)> = vec![
            ("q", format!("{city},{country_code}")),
            ("appid", self.api_key.clone()),
            ("units", "imperial".to_string()),
        ];
        for &(k, v) in extra {
            query.push((k, v.to_string()));
        }

        let resp = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        if status.as_u16() == 401 {
            return Err("API HTTP 401: invalid API key".to_string());
        }
        if !status.is_success() {
            return Err(format!("API HTTP {status}: {text}"));
        }
        Ok(text)
    }
}

fn slot_from_entry(entry: RawForecastEntry) -> HourlySlot {
    let time = Local
        .timestamp_opt(entry.dt, 0)
        .single()
        .map(|dt| {
            // "03PM" → "3PM", matching how the strip labels read.
            let label = dt.format("%I%p").to_string();
            label.trim_start_matches('0').to_string()
        })
        .unwrap_or_default();
    HourlySlot {
        time,
        temperature: entry.main.temp.map(|t| t.round() as i64),
        rain_chance: (entry.pop * 100.0) as i64,
        condition: entry
            .weather
            .first()
            .map(|c| c.main.clone())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_response_parses() {
        let body = r#"{
            "main": {"temp": 71.6, "temp_min": 64.0, "temp_max": 77.2},
            "weather": [{"main": "Clouds", "description": "scattered clouds"}]
        }"#;
        let raw: RawCurrent = serde_json::from_str(body).unwrap();
        assert_eq!(raw.weather[0].main, "Clouds");
        assert!((raw.main.temp - 71.6).abs() < f64::EPSILON);
    }

    #[test]
    fn forecast_entry_maps_to_slot() {
        let entry = RawForecastEntry {
            dt: 1_767_646_800,
            main: RawForecastMain { temp: Some(68.4) },
            pop: 0.35,
            weather: vec![RawCondition {
                main: "Rain".into(),
                description: "light rain".into(),
            }],
        };
        let slot = slot_from_entry(entry);
        assert_eq!(slot.temperature, Some(68));
        assert_eq!(slot.rain_chance, 35);
        assert_eq!(slot.condition, "Rain");
        assert!(!slot.time.is_empty());
        assert!(!slot.time.starts_with('0'));
    }

    #[test]
    fn forecast_entry_without_temperature_keeps_none() {
        let entry = RawForecastEntry {
            dt: 1_767_646_800,
            main: RawForecastMain { temp: None },
            pop: 0.0,
            weather: vec![],
        };
        let slot = slot_from_entry(entry);
        assert_eq!(slot.temperature, None);
        assert_eq!(slot.condition, "");
    }

    #[test]
    fn forecast_response_takes_first_four_entries() {
        let entries: Vec<String> = (0..6)
            .map(|i| {
                format!(
                    r#"{{"dt": {}, "main": {{"temp": 60.0}}, "pop": 0.1,
                        "weather": [{{"main": "Clear"}}]}}"#,
                    1_767_646_800 + i * 10_800
                )
            })
            .collect();
        let body = format!(r#"{{"list": [{}]}}"#, entries.join(","));
        let raw: RawForecast = serde_json::from_str(&body).unwrap();
        let slots: Vec<HourlySlot> = raw
            .list
            .into_iter()
            .take(FORECAST_SLOTS)
            .map(slot_from_entry)
            .collect();
        assert_eq!(slots.len(), 4);
    }
}
