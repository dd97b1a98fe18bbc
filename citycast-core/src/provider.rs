use async_trait::async_trait;
use chrono::TimeZone;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    forecast::{aggregate_daily, round_half_up},
    model::{CurrentConditions, ForecastSample, WeatherQuery, WeatherSnapshot},
    provider::openweather::{CurrentPayload, ForecastPayload, OpenWeatherProvider},
};

pub mod openweather;

/// Raw provider payloads, exactly as decoded from the two endpoints.
#[derive(Debug, Clone)]
pub struct RawWeather {
    pub current: CurrentPayload,
    pub forecast: ForecastPayload,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions and the 3-hour forecast for one query.
    async fn fetch(&self, query: &WeatherQuery) -> Result<RawWeather, WeatherError>;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    Ok(Box::new(OpenWeatherProvider::from_config(config)?))
}

const MS_TO_KMH: f64 = 3.6;

impl WeatherSnapshot {
    /// Build a snapshot from raw payloads.
    ///
    /// Forecast days follow the date written in each sample's `dt_txt`; `tz`
    /// only places samples that carry a bare unix `dt`.
    pub fn from_raw<Tz: TimeZone>(raw: RawWeather, tz: &Tz) -> Result<Self, WeatherError> {
        let RawWeather { current, forecast } = raw;

        let icon_code = current.weather.first().map(|w| w.icon.clone()).ok_or_else(|| {
            WeatherError::Parse("current conditions contained no weather entry".into())
        })?;
        let description =
            current.weather.first().map(|w| w.description.clone()).unwrap_or_default();

        let samples = forecast
            .list
            .iter()
            .map(|entry| {
                let icon_code = entry.weather.first().map(|w| w.icon.clone()).ok_or_else(|| {
                    WeatherError::Parse("forecast sample contained no weather entry".into())
                })?;

                Ok(ForecastSample {
                    local_time: entry.local_time(tz)?,
                    temperature_c: entry.main.temp,
                    icon_code,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        Ok(WeatherSnapshot {
            current: CurrentConditions {
                icon_code,
                temperature_c: round_half_up(current.main.temp),
                city_name: current.name,
                humidity_pct: current.main.humidity,
                wind_speed_kmh: current.wind.speed * MS_TO_KMH,
                description,
            },
            daily: aggregate_daily(&samples),
        })
    }
}
