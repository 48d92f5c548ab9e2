//! Anomaly service client over HTTP.

use std::time::{Duration, Instant};

use anomaly_common::{AnomalyError, AnomalyResponse, AnomalyResult, ForecastHour};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::source::AnomalySource;

/// Fetches snapshots from `GET {api_url}/api/v1/temperature/anomaly`.
///
/// A single attempt is made per call; the caller decides whether to ask
/// again.
#[derive(Debug, Clone)]
pub struct HttpAnomalySource {
    client: Client,
    endpoint: String,
    use_mock: bool,
}

impl HttpAnomalySource {
    pub fn new(config: &ClientConfig) -> AnomalyResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout().min(Duration::from_secs(10)))
            .build()
            .map_err(|e| AnomalyError::invalid_config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            use_mock: config.use_mock,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, hour: ForecastHour) -> AnomalyResult<AnomalyResponse> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("forecast_hour", hour.hours().to_string()),
                ("use_mock", self.use_mock.to_string()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(AnomalyError::Http {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        decode_body(&body)
    }
}

#[async_trait]
impl AnomalySource for HttpAnomalySource {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint, forecast_hour = hour.hours()))]
    async fn fetch(&self, hour: ForecastHour) -> AnomalyResult<AnomalyResponse> {
        let start = Instant::now();
        let result = self.request(hour).await;
        let elapsed = start.elapsed();

        histogram!("anomaly_fetch_duration_seconds").record(elapsed.as_secs_f64());

        match &result {
            Ok(response) => {
                counter!("anomaly_fetch_total", "outcome" => "ok").increment(1);
                if response.mock_data {
                    warn!("Service returned synthetic data");
                }
                info!(
                    rows = response.anomaly_data.height(),
                    cols = response.anomaly_data.width(),
                    valid_time = %response.valid_time,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Fetched anomaly snapshot"
                );
            }
            Err(e) => {
                counter!("anomaly_fetch_total", "outcome" => "error").increment(1);
                warn!(error = %e, elapsed_ms = elapsed.as_millis() as u64, "Anomaly fetch failed");
            }
        }

        result
    }
}

fn transport_error(err: reqwest::Error) -> AnomalyError {
    if err.is_timeout() {
        AnomalyError::Transport(format!("request timed out: {}", err))
    } else {
        AnomalyError::Transport(err.to_string())
    }
}

/// Parse and validate a 2xx body.
///
/// The service reports some failures as a 200 carrying `{"error": "..."}`.
pub(crate) fn decode_body(body: &str) -> AnomalyResult<AnomalyResponse> {
    let value: Value = serde_json::from_str(body)?;

    if let Some(err) = value.get("error") {
        let message = err
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(AnomalyError::Decode(format!("service reported an error: {}", message)));
    }

    let response: AnomalyResponse = serde_json::from_value(value)?;
    response.validate()?;
    debug!(valid_cells = response.anomaly_data.valid_count(), "Decoded anomaly response");
    Ok(response)
}

/// Pull a readable message out of an error body.
///
/// FastAPI puts it under `detail`, either as a string or as a list of
/// validation errors with a `msg` each.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Array(items)) => {
                let messages: Vec<String> = items
                    .iter()
                    .map(|item| match item.get("msg").and_then(Value::as_str) {
                        Some(msg) => msg.to_string(),
                        None => item.to_string(),
                    })
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            Some(other) => return other.to_string(),
            None => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
