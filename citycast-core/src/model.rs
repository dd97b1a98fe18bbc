use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Languages the provider is asked to localize descriptions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    pub const fn all() -> &'static [Language] {
        &[Language::En, Language::Fr]
    }

    /// French for any `fr*` locale, English otherwise.
    pub fn from_locale(locale: &str) -> Self {
        if locale.trim().to_lowercase().starts_with("fr") { Language::Fr } else { Language::En }
    }

    /// Detect the language from the process locale (`LC_ALL`, `LC_MESSAGES`, `LANG`).
    pub fn detect() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .map(|value| Self::from_locale(&value))
            .unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            _ => Err(anyhow::anyhow!("Unknown language '{value}'. Supported languages: en, fr.")),
        }
    }
}

/// Identifies one weather lookup. Both fields together form the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub city: String,
    pub language: Language,
}

impl WeatherQuery {
    pub fn new(city: impl AsRef<str>, language: Language) -> Self {
        Self { city: city.as_ref().trim().to_string(), language }
    }

    pub fn is_blank(&self) -> bool {
        self.city.is_empty()
    }
}

impl fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.city, self.language)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub icon_code: String,
    pub temperature_c: i32,
    pub city_name: String,
    pub humidity_pct: u8,
    /// Converted from the provider's metric m/s reading.
    pub wind_speed_kmh: f64,
    /// Localized condition text, e.g. "clear sky" or "ciel dégagé".
    pub description: String,
}

/// One decoded 3-hour forecast sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Wall-clock time the sample is filed under; its date picks the day.
    pub local_time: NaiveDateTime,
    pub temperature_c: f64,
    pub icon_code: String,
}

/// Daily summary built from the samples of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub icon_code: String,
}

impl DailyForecastEntry {
    /// Calendar day formatted the way the given language writes short dates.
    pub fn label(&self, language: Language) -> String {
        match language {
            Language::En => self.date.format("%-m/%-d/%Y").to_string(),
            Language::Fr => self.date.format("%d/%m/%Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub daily: Vec<DailyForecastEntry>,
}
