use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone};
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{Config, error::WeatherError, model::WeatherQuery};

use super::{RawWeather, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: Client::new() }
    }

    /// Build a provider from config: API key, base URL and optional timeout.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { api_key: config.api_key(), base_url: config.base_url.clone(), http })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_current(&self, query: &WeatherQuery) -> Result<CurrentPayload, WeatherError> {
        self.get_json("weather", query).await
    }

    async fn fetch_forecast(&self, query: &WeatherQuery) -> Result<ForecastPayload, WeatherError> {
        self.get_json("forecast", query).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &WeatherQuery,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query.city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", query.language.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                let message = format!("Failed to send request to OpenWeather ({endpoint}): {e}");
                WeatherError::network(None, message)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::network(
                Some(status.as_u16()),
                format!("Failed to read OpenWeather {endpoint} response body: {e}"),
            )
        })?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "OpenWeather request failed");
            let message = error_message(status, &body);
            return Err(WeatherError::network(Some(status.as_u16()), message));
        }

        debug!(endpoint, bytes = body.len(), "OpenWeather response received");

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("OpenWeather {endpoint} JSON: {e}")))
    }
}

/// Response shape of the `/weather` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentPayload {
    pub name: String,
    pub main: OwMain,
    pub wind: OwWind,
    pub weather: Vec<OwWeather>,
}

/// Response shape of the `/forecast` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<OwForecastEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwWind {
    /// Metres per second with `units=metric`.
    pub speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwWeather {
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwForecastEntry {
    #[serde(default)]
    pub dt: Option<i64>,
    #[serde(default)]
    pub dt_txt: Option<String>,
    pub main: OwMain,
    pub weather: Vec<OwWeather>,
}

impl OwForecastEntry {
    /// Wall-clock time of the sample.
    ///
    /// `dt_txt` is taken as written, so a sample stays on the day its text
    /// names. Without it the unix `dt` is converted into `tz`.
    pub fn local_time<Tz: TimeZone>(&self, tz: &Tz) -> Result<NaiveDateTime, WeatherError> {
        if let Some(text) = &self.dt_txt {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
                return Ok(naive);
            }
        }

        self.dt
            .and_then(|ts| tz.timestamp_opt(ts, 0).single())
            .map(|local| local.naive_local())
            .ok_or_else(|| {
                WeatherError::Parse(format!(
                    "forecast sample has no usable timestamp (dt_txt: {:?}, dt: {:?})",
                    self.dt_txt, self.dt
                ))
            })
    }
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self, query), fields(city = %query.city, lang = %query.language))]
    async fn fetch(&self, query: &WeatherQuery) -> Result<RawWeather, WeatherError> {
        let (current, forecast) =
            tokio::try_join!(self.fetch_current(query), self.fetch_forecast(query))?;

        debug!(samples = forecast.list.len(), "OpenWeather fetch complete");

        Ok(RawWeather { current, forecast })
    }
}

/// The provider's own error text when the body carries one.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<OwErrorBody>(body) {
        Ok(OwErrorBody { message: Some(message) }) if !message.is_empty() => message,
        _ => format!("OpenWeather request failed with status {}: {}", status, truncate_body(body)),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
