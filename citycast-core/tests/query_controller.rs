//! Query lifecycle, caching and stale-response handling against a mock server.

mod common;

use std::{sync::Arc, time::Duration};

use citycast_core::{Language, QueryController, QueryStatus, WeatherError, WeatherQuery};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use common::{mount_city, not_found_body, provider};

fn controller(server: &MockServer, ttl: Duration) -> QueryController {
    QueryController::new(Arc::new(provider(server)), ttl)
}

fn paris() -> WeatherQuery {
    WeatherQuery::new("Paris", Language::En)
}

fn city_of(status: &QueryStatus) -> Option<String> {
    match status {
        QueryStatus::Success(snapshot) => Some(snapshot.current.city_name.clone()),
        _ => None,
    }
}

#[tokio::test]
async fn blank_query_stays_idle_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctl = controller(&server, Duration::from_secs(60));

    assert!(ctl.request(WeatherQuery::new("   ", Language::En)).await.is_none());

    let state = ctl.state();
    assert!(state.query.is_none());
    assert!(matches!(state.status, QueryStatus::Idle));
}

#[tokio::test]
async fn blank_query_keeps_previous_success() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", Duration::ZERO, 1).await;

    let ctl = controller(&server, Duration::from_secs(60));
    ctl.request(paris()).await.unwrap().await.unwrap();

    assert!(ctl.request(WeatherQuery::new("  ", Language::En)).await.is_none());

    let state = ctl.state();
    assert_eq!(state.query, Some(paris()));
    assert_eq!(city_of(&state.status).as_deref(), Some("Paris"));
}

#[tokio::test]
async fn blank_query_does_not_discard_pending_fetch() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", Duration::from_millis(200), 1).await;

    let ctl = controller(&server, Duration::from_secs(60));
    let handle = ctl.request(paris()).await.unwrap();

    assert!(ctl.request(WeatherQuery::new("", Language::En)).await.is_none());
    assert!(ctl.state().view().is_loading);

    handle.await.unwrap();

    let state = ctl.state();
    assert_eq!(state.query, Some(paris()));
    assert_eq!(city_of(&state.status).as_deref(), Some("Paris"));
}

#[tokio::test]
async fn request_goes_pending_then_success() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", Duration::from_millis(100), 1).await;

    let ctl = controller(&server, Duration::from_secs(60));
    let handle = ctl.request(paris()).await.expect("uncached query spawns a fetch");

    assert!(ctl.state().view().is_loading);

    handle.await.unwrap();

    let view = ctl.state().view();
    assert!(!view.is_loading);
    assert!(!view.is_error);
    let data = view.data.expect("snapshot after success");
    assert_eq!(data.current.city_name, "Paris");
    assert!(!data.daily.is_empty());
    assert!(data.daily.len() <= 5);
}

#[tokio::test]
async fn cached_query_is_served_without_refetch() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", Duration::ZERO, 1).await;
    mount_city(&server, "London", Duration::ZERO, 1).await;

    let ctl = controller(&server, Duration::from_secs(60));

    ctl.request(paris()).await.unwrap().await.unwrap();
    ctl.request(WeatherQuery::new("London", Language::En)).await.unwrap().await.unwrap();

    // Back to Paris: served from cache, no task spawned.
    assert!(ctl.request(paris()).await.is_none());
    assert_eq!(city_of(&ctl.state().status).as_deref(), Some("Paris"));
}

#[tokio::test]
async fn language_is_part_of_the_cache_key() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", Duration::ZERO, 2).await;

    let ctl = controller(&server, Duration::from_secs(60));

    ctl.request(paris()).await.unwrap().await.unwrap();
    let french = ctl.request(WeatherQuery::new("Paris", Language::Fr)).await;
    assert!(french.is_some());
    french.unwrap().await.unwrap();
}

#[tokio::test]
async fn concurrent_loads_of_one_key_share_a_fetch() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", Duration::from_millis(200), 1).await;

    let ctl = controller(&server, Duration::from_secs(60));

    let (a, b) = tokio::join!(ctl.fetch(paris()), ctl.fetch(paris()));

    assert_eq!(a.unwrap().current.city_name, "Paris");
    assert_eq!(b.unwrap().current.city_name, "Paris");
}

#[tokio::test]
async fn superseded_response_is_discarded() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", Duration::from_millis(300), 1).await;
    mount_city(&server, "London", Duration::ZERO, 1).await;

    let ctl = controller(&server, Duration::from_secs(60));
    let mut rx = ctl.subscribe();

    let slow = ctl.request(paris()).await.unwrap();
    let fast = ctl.request(WeatherQuery::new("London", Language::En)).await.unwrap();

    fast.await.unwrap();
    assert_eq!(city_of(&ctl.state().status).as_deref(), Some("London"));

    slow.await.unwrap();
    let state = ctl.state();
    assert_eq!(state.query, Some(WeatherQuery::new("London", Language::En)));
    assert_eq!(city_of(&state.status).as_deref(), Some("London"));

    // Subscribers end on London too.
    let seen = rx.borrow_and_update().clone();
    assert_eq!(city_of(&seen.status).as_deref(), Some("London"));
}

#[tokio::test]
async fn provider_failure_reaches_error_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::forecast_body()))
        .mount(&server)
        .await;

    let ctl = controller(&server, Duration::from_secs(60));
    let query = WeatherQuery::new("Atlantis", Language::En);
    let mut rx = ctl.subscribe();

    let handle = ctl.request(query.clone()).await.unwrap();
    let settled = rx.wait_for(|state| state.is_settled()).await.unwrap().clone();
    handle.await.unwrap();

    let view = settled.view();
    assert!(view.is_error);
    assert!(view.data.is_none());
    assert_eq!(view.error.unwrap().to_string(), "city not found");

    // Errors are not cached: asking again goes back to the provider.
    let retry = ctl.request(query).await;
    assert!(retry.is_some());
    retry.unwrap().await.unwrap();
    assert!(matches!(ctl.state().status, QueryStatus::Error(_)));
}

#[tokio::test]
async fn refresh_bypasses_the_cache() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", Duration::ZERO, 2).await;

    let ctl = controller(&server, Duration::from_secs(60));

    ctl.request(paris()).await.unwrap().await.unwrap();
    ctl.refresh().await.expect("refresh refetches").await.unwrap();

    assert_eq!(city_of(&ctl.state().status).as_deref(), Some("Paris"));
}

#[tokio::test]
async fn refresh_without_query_does_nothing() {
    let server = MockServer::start().await;
    let ctl = controller(&server, Duration::from_secs(60));

    assert!(ctl.refresh().await.is_none());
    assert!(matches!(ctl.state().status, QueryStatus::Idle));
}

#[tokio::test]
async fn expired_entries_are_fetched_again() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", Duration::ZERO, 2).await;

    let ctl = controller(&server, Duration::from_millis(50));

    ctl.request(paris()).await.unwrap().await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    let again = ctl.request(paris()).await;
    assert!(again.is_some());
    again.unwrap().await.unwrap();
}

#[tokio::test]
async fn blank_fetch_is_a_validation_error() {
    let server = MockServer::start().await;
    let ctl = controller(&server, Duration::from_secs(60));

    let err = ctl.fetch(WeatherQuery::new("", Language::En)).await.unwrap_err();
    assert!(matches!(*err, WeatherError::Validation));
}
