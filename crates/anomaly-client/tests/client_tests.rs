//! Anomaly sources exercised against an in-process fake service.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anomaly_client::{AnomalySource, ClientConfig, HttpAnomalySource, MockAnomalySource, RequestGate};
use anomaly_common::{AnomalyError, ForecastHour, Statistics};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use test_utils::{scenario, scenario_response_json};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Serve `handler` on an ephemeral port and return a client config for it.
async fn spawn_service(app: Router) -> ClientConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ClientConfig {
        api_url: format!("http://{}", addr),
        timeout_secs: 5,
        use_mock: false,
    }
}

async fn scenario_handler(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let hour = params
        .get("forecast_hour")
        .and_then(|h| h.parse().ok())
        .unwrap_or(0);
    seen.lock().unwrap().push(params);
    (
        [("content-type", "application/json")],
        scenario_response_json(hour),
    )
}

#[tokio::test]
async fn test_fetch_sends_query_and_decodes() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/api/v1/temperature/anomaly", get(scenario_handler))
        .with_state(seen.clone());
    let mut config = spawn_service(app).await;
    config.use_mock = true;

    let source = HttpAnomalySource::new(&config).unwrap();
    let response = source.fetch(ForecastHour::new(24).unwrap()).await.unwrap();

    assert_eq!(response.forecast_hour, Some(24));
    assert_eq!(response.anomaly_data.lats, scenario::LATS.to_vec());
    assert_eq!(response.statistics.min_anomaly, scenario::MIN_ANOMALY);
    assert_eq!(response.statistics.max_anomaly, scenario::MAX_ANOMALY);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get("forecast_hour").map(String::as_str), Some("24"));
    assert_eq!(seen[0].get("use_mock").map(String::as_str), Some("true"));
}

#[tokio::test]
async fn test_server_error_uses_detail() {
    let app = Router::new().route(
        "/api/v1/temperature/anomaly",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "application/json")],
                r#"{"detail": "NOMADS unavailable"}"#,
            )
        }),
    );
    let config = spawn_service(app).await;
    let source = HttpAnomalySource::new(&config).unwrap();

    let err = source.fetch(ForecastHour::ANALYSIS).await.unwrap_err();
    match &err {
        AnomalyError::Http { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "NOMADS unavailable");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
    assert!(!err.is_fatal());
    assert!(err.user_message().contains("NOMADS unavailable"));
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let app = Router::new().route(
        "/api/v1/temperature/anomaly",
        get(|| async { "{not json" }),
    );
    let config = spawn_service(app).await;
    let source = HttpAnomalySource::new(&config).unwrap();

    let err = source.fetch(ForecastHour::ANALYSIS).await.unwrap_err();
    assert!(matches!(err, AnomalyError::Decode(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_error_payload_with_ok_status() {
    let app = Router::new().route(
        "/api/v1/temperature/anomaly",
        get(|| async { r#"{"error": "GRIB file truncated"}"# }),
    );
    let config = spawn_service(app).await;
    let source = HttpAnomalySource::new(&config).unwrap();

    let err = source.fetch(ForecastHour::ANALYSIS).await.unwrap_err();
    assert!(matches!(err, AnomalyError::Decode(ref m) if m.contains("GRIB file truncated")));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Bind then drop so the port is very likely closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        api_url: format!("http://{}", addr),
        timeout_secs: 2,
        use_mock: false,
    };
    let source = HttpAnomalySource::new(&config).unwrap();

    let err = source.fetch(ForecastHour::ANALYSIS).await.unwrap_err();
    assert!(matches!(err, AnomalyError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let app = Router::new().route(
        "/api/v1/temperature/anomaly",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }),
    );
    let mut config = spawn_service(app).await;
    config.timeout_secs = 1;
    let source = HttpAnomalySource::new(&config).unwrap();

    let err = source.fetch(ForecastHour::ANALYSIS).await.unwrap_err();
    assert!(matches!(err, AnomalyError::Transport(_)), "got {:?}", err);
}

#[test]
fn test_invalid_config_rejected() {
    let config = ClientConfig {
        api_url: "localhost:8000".to_string(),
        ..Default::default()
    };
    let err = HttpAnomalySource::new(&config).unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_mock_statistics_match_grid() {
    let source = MockAnomalySource::new(11);
    let response = source.fetch(ForecastHour::new(72).unwrap()).await.unwrap();

    assert!(response.validate().is_ok());
    let recomputed = Statistics::from_grid(&response.anomaly_data).unwrap();
    assert_eq!(recomputed, response.statistics);
    assert!(response.statistics.min_anomaly < 0.0);
    assert!(response.statistics.max_anomaly > 5.0);
}

#[tokio::test]
async fn test_gate_discards_overtaken_fetch() {
    let gate = Arc::new(RequestGate::new());
    let slow = MockAnomalySource::new(1).with_delay(Duration::from_millis(200));
    let fast = MockAnomalySource::new(2);

    let slow_ticket = gate.issue();
    let slow_task = {
        let gate = gate.clone();
        tokio::spawn(async move {
            let response = slow.fetch(ForecastHour::new(6).unwrap()).await.unwrap();
            gate.accept(slow_ticket, response)
        })
    };

    let fast_ticket = gate.issue();
    let fast_response = fast.fetch(ForecastHour::new(12).unwrap()).await.unwrap();
    let accepted = gate.accept(fast_ticket, fast_response);

    assert_eq!(accepted.and_then(|r| r.forecast_hour), Some(12));
    assert!(slow_task.await.unwrap().is_none());
}

#[tokio::test]
async fn test_sources_behind_trait_object() {
    let sources: Vec<Arc<dyn AnomalySource>> = vec![Arc::new(MockAnomalySource::default())];
    for source in &sources {
        assert_eq!(source.name(), "mock");
        let response = source.fetch(ForecastHour::ANALYSIS).await.unwrap();
        assert!(response.mock_data);
    }
}
