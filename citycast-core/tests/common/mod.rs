//! Shared fixtures for tests running against a mock OpenWeather server.

#![allow(dead_code)]

use std::time::Duration;

use citycast_core::OpenWeatherProvider;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub fn current_body(city: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 2.3488, "lat": 48.8534 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "main": { "temp": temp, "feels_like": temp - 1.0, "pressure": 1016, "humidity": 58 },
        "wind": { "speed": 4.1, "deg": 250 },
        "dt": 1745236800,
        "name": city,
        "cod": 200
    })
}

pub fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "cnt": 4,
        "list": [
            { "dt": 1745236800, "dt_txt": "2025-04-21 12:00:00", "main": { "temp": 18.2 }, "weather": [{ "icon": "01d" }] },
            { "dt": 1745247600, "dt_txt": "2025-04-21 15:00:00", "main": { "temp": 19.8 }, "weather": [{ "icon": "02d" }] },
            { "dt": 1745323200, "dt_txt": "2025-04-22 12:00:00", "main": { "temp": 14.0 }, "weather": [{ "icon": "10d" }] },
            { "dt": 1745409600, "dt_txt": "2025-04-23 12:00:00", "main": { "temp": 12.0 }, "weather": [{ "icon": "04d" }] }
        ],
        "city": { "name": "Paris", "country": "FR" }
    })
}

pub fn not_found_body() -> serde_json::Value {
    serde_json::json!({ "cod": "404", "message": "city not found" })
}

/// Mount both endpoints for `city`, each expected to be hit `times` times.
pub async fn mount_city(server: &MockServer, city: &str, delay: Duration, times: u64) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", city))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body(city, 18.6))
                .set_delay(delay),
        )
        .expect(times)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", city))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()).set_delay(delay))
        .expect(times)
        .mount(server)
        .await;
}

pub fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new("TEST_KEY".to_string()).with_base_url(server.uri())
}
