//! Reduction of 3-hour forecast samples into daily summaries.

use chrono::NaiveDate;

use crate::model::{DailyForecastEntry, ForecastSample};

/// Maximum number of daily entries produced.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Group samples by the calendar day of their local wall time and summarize
/// the first [`MAX_FORECAST_DAYS`] days.
///
/// Days keep the order in which they first appear. Each day's temperature is
/// the rounded mean of its samples and its icon is the icon of its first
/// sample.
pub fn aggregate_daily(samples: &[ForecastSample]) -> Vec<DailyForecastEntry> {
    let mut days: Vec<(NaiveDate, Vec<&ForecastSample>)> = Vec::new();

    for sample in samples {
        let date = sample.local_time.date();
        match days.iter_mut().find(|(day, _)| *day == date) {
            Some((_, group)) => group.push(sample),
            None => days.push((date, vec![sample])),
        }
    }

    days.into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|(date, group)| {
            let sum: f64 = group.iter().map(|s| s.temperature_c).sum();
            let mean = sum / group.len() as f64;

            DailyForecastEntry {
                date,
                temperature_c: round_half_up(mean),
                // groups are never empty
                icon_code: group.first().map(|s| s.icon_code.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Round to the nearest integer, halves toward positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
