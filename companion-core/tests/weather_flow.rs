//! End-to-end tests of the weather request flow against mock HTTP services.

use async_trait::async_trait;
use companion_core::{
    CachedOutcome, Config, DeviceChannel, GeocodeCache, InboundMessage, KeyValueStore,
    MemoryStore, OutboundMessage, Preferences, RequestOrchestrator,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default)]
struct RecordingChannel {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingChannel {
    fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl DeviceChannel for RecordingChannel {
    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        self.sent.lock().push(*message);
        Ok(())
    }
}

struct Setup {
    store: Arc<MemoryStore>,
    channel: Arc<RecordingChannel>,
    orchestrator: RequestOrchestrator,
}

fn setup(server: &MockServer, place: Option<&str>) -> Setup {
    let mut config = Config::default();
    config.endpoints.geocode_url = format!("{}/api", server.uri());
    config.endpoints.weather_url = format!("{}/v1/forecast", server.uri());

    let store = Arc::new(MemoryStore::new());
    if let Some(place) = place {
        Preferences::new(store.clone())
            .set_weather_location(place)
            .unwrap();
    }

    let channel = Arc::new(RecordingChannel::default());
    let orchestrator =
        RequestOrchestrator::from_config(&config, store.clone(), channel.clone()).unwrap();

    Setup {
        store,
        channel,
        orchestrator,
    }
}

fn features(points: &[(f64, f64)]) -> serde_json::Value {
    let features: Vec<_> = points
        .iter()
        .map(|(lon, lat)| json!({"geometry": {"coordinates": [lon, lat]}}))
        .collect();
    json!({ "features": features })
}

fn current(temperature: f64, code: i32, is_day: u8) -> serde_json::Value {
    json!({
        "current": {
            "temperature_2m": temperature,
            "weather_code": code,
            "is_day": is_day
        }
    })
}

#[tokio::test]
async fn reykjavik_snow_at_night() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("limit", "1"))
        .and(query_param("q", "Reykjavik"))
        .respond_with(ResponseTemplate::new(200).set_body_json(features(&[(-21.94, 64.15)])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "64.15"))
        .and(query_param("longitude", "-21.94"))
        .and(query_param("current", "temperature_2m,weather_code,is_day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current(3.4, 71, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let s = setup(&server, Some("Reykjavik"));
    s.orchestrator
        .handle(&InboundMessage::weather_request())
        .await
        .unwrap();

    let sent = s.channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        serde_json::to_value(sent[0]).unwrap(),
        json!({"weatherIconOrdinal": u32::from('H'), "weatherTemperature": 3})
    );
}

#[tokio::test]
async fn ambiguous_place_fails_and_leaves_tombstone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("q", "Springfield"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(features(&[(-89.65, 39.78), (-72.59, 42.10)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current(20.0, 0, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let s = setup(&server, Some("Springfield"));
    s.orchestrator
        .handle(&InboundMessage::weather_request())
        .await
        .unwrap();

    assert_eq!(s.channel.sent(), vec![OutboundMessage::WeatherFailed]);
    assert_eq!(
        serde_json::to_value(OutboundMessage::WeatherFailed).unwrap(),
        json!({"weatherFailed": 1})
    );

    let cache = GeocodeCache::new(s.store.clone());
    assert_eq!(cache.get("Springfield"), Some(CachedOutcome::Failure));

    // The tombstone is replayed without asking the geocoder again.
    s.orchestrator
        .handle(&InboundMessage::weather_request())
        .await
        .unwrap();
    assert_eq!(
        s.channel.sent(),
        vec![OutboundMessage::WeatherFailed, OutboundMessage::WeatherFailed]
    );
}

#[tokio::test]
async fn weather_server_error_is_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(features(&[(2.35, 48.85)])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(2)
        .mount(&server)
        .await;

    let s = setup(&server, Some("Paris"));
    for _ in 0..2 {
        s.orchestrator
            .handle(&InboundMessage::weather_request())
            .await
            .unwrap();
    }

    assert_eq!(
        s.channel.sent(),
        vec![OutboundMessage::WeatherFailed, OutboundMessage::WeatherFailed]
    );
}

#[tokio::test]
async fn geocode_server_error_is_retried_next_time() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let s = setup(&server, Some("Berlin"));
    for _ in 0..2 {
        s.orchestrator
            .handle(&InboundMessage::weather_request())
            .await
            .unwrap();
    }

    assert_eq!(
        s.channel.sent(),
        vec![OutboundMessage::WeatherFailed, OutboundMessage::WeatherFailed]
    );
    assert!(GeocodeCache::new(s.store.clone()).current().is_none());
}

#[tokio::test]
async fn malformed_weather_body_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(features(&[(2.35, 48.85)])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current": {}})))
        .mount(&server)
        .await;

    let s = setup(&server, Some("Paris"));
    let outbound = s.orchestrator.answer_weather_request().await;

    assert_eq!(outbound, OutboundMessage::WeatherFailed);
}

#[tokio::test]
async fn same_place_is_geocoded_once_and_new_place_replaces_it() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(features(&[(2.35, 48.85)])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("q", "Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(features(&[(13.40, 52.52)])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current(17.5, 2, 1)))
        .expect(3)
        .mount(&server)
        .await;

    let s = setup(&server, Some("Paris"));
    s.orchestrator.answer_weather_request().await;
    let second = s.orchestrator.answer_weather_request().await;

    let OutboundMessage::Weather(reading) = second else {
        panic!("expected a reading, got {second:?}");
    };
    assert_eq!(reading.icon.as_char(), 'c');
    assert_eq!(reading.temperature_c, 18);

    Preferences::new(s.store.clone())
        .set_weather_location("Berlin")
        .unwrap();
    s.orchestrator.answer_weather_request().await;

    let cache = GeocodeCache::new(s.store.clone());
    assert_eq!(cache.get("Paris"), None);
    assert!(matches!(cache.get("Berlin"), Some(CachedOutcome::Success(_))));
    assert!(s.store.get("geocode_cache").unwrap().is_some());
}

#[tokio::test]
async fn no_place_and_no_device_position_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let s = setup(&server, None);
    s.orchestrator
        .handle(&InboundMessage::weather_request())
        .await
        .unwrap();

    assert_eq!(s.channel.sent(), vec![OutboundMessage::WeatherFailed]);
}
