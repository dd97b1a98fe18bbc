//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap fetch client
//! - Aggregation of 3-hour forecast samples into daily summaries
//! - A caching query controller that exposes loading/success/error state
//!
//! It is used by `citycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod query;

pub use config::Config;
pub use error::WeatherError;
pub use forecast::aggregate_daily;
pub use model::{
    CurrentConditions, DailyForecastEntry, ForecastSample, Language, WeatherQuery, WeatherSnapshot,
};
pub use provider::{RawWeather, WeatherProvider, openweather::OpenWeatherProvider};
pub use query::{QueryController, QueryState, QueryStatus, ViewState};
