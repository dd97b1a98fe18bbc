//! Terminal rendering of weather snapshots and query state.

use chrono::Local;
use citycast_core::{Language, ViewState, WeatherSnapshot};

/// Display category for a provider icon code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Clear,
    Cloud,
    Drizzle,
    Rain,
    Snow,
}

impl Condition {
    /// Unknown codes fall back to `Clear`.
    pub fn from_icon(code: &str) -> Self {
        match code.get(..2) {
            Some("02" | "03") => Condition::Cloud,
            Some("04") => Condition::Drizzle,
            Some("09" | "10") => Condition::Rain,
            Some("13") => Condition::Snow,
            _ => Condition::Clear,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Condition::Clear => "☀️",
            Condition::Cloud => "☁️",
            Condition::Drizzle => "🌦️",
            Condition::Rain => "🌧️",
            Condition::Snow => "❄️",
        }
    }
}

struct Labels {
    humidity: &'static str,
    wind: &'static str,
    forecast: &'static str,
    loading: &'static str,
    error: &'static str,
    updated: &'static str,
}

fn labels(language: Language) -> Labels {
    match language {
        Language::En => Labels {
            humidity: "Humidity",
            wind: "Wind",
            forecast: "5-day forecast",
            loading: "Loading...",
            error: "Error loading weather data.",
            updated: "Updated",
        },
        Language::Fr => Labels {
            humidity: "Humidité",
            wind: "Vent",
            forecast: "Prévisions sur 5 jours",
            loading: "Chargement...",
            error: "Erreur lors du chargement des données météo.",
            updated: "Mis à jour",
        },
    }
}

pub fn loading(language: Language) -> &'static str {
    labels(language).loading
}

pub fn snapshot(snapshot: &WeatherSnapshot, language: Language) -> String {
    let l = labels(language);
    let current = &snapshot.current;

    let mut out = format!(
        "{} {}°C  {}\n",
        Condition::from_icon(&current.icon_code).glyph(),
        current.temperature_c,
        current.city_name,
    );
    if !current.description.is_empty() {
        out.push_str(&format!("   {}\n", current.description));
    }
    out.push_str(&format!(
        "   {}: {}%   {}: {:.1} km/h\n",
        l.humidity, current.humidity_pct, l.wind, current.wind_speed_kmh,
    ));

    if !snapshot.daily.is_empty() {
        out.push_str(&format!("\n{}\n", l.forecast));
        for day in &snapshot.daily {
            out.push_str(&format!(
                "   {:<12} {}  {:>3}°C\n",
                day.label(language),
                Condition::from_icon(&day.icon_code).glyph(),
                day.temperature_c,
            ));
        }
    }

    out.push_str(&format!("\n{} {}\n", l.updated, Local::now().format("%H:%M")));
    out
}

/// Render whatever the controller currently exposes.
pub fn view(view: &ViewState, language: Language) -> Option<String> {
    let l = labels(language);

    if view.is_loading {
        return Some(l.loading.to_string());
    }
    if view.is_error {
        let detail = view.error.as_ref().map(|e| format!(" ({e})")).unwrap_or_default();
        return Some(format!("{}{detail}", l.error));
    }
    view.data.as_ref().map(|data| snapshot(data, language))
}
