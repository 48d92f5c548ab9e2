use std::sync::Arc;

use anomaly_common::{AnomalyResponse, AnomalyResult, ForecastHour};
use async_trait::async_trait;

/// Anything that can produce an anomaly snapshot for a forecast hour.
///
/// Responses are validated (grid shape and statistics) before they are
/// returned.
#[async_trait]
pub trait AnomalySource: Send + Sync {
    /// Short name used in logs and metrics labels.
    fn name(&self) -> &'static str;

    async fn fetch(&self, hour: ForecastHour) -> AnomalyResult<AnomalyResponse>;
}

#[async_trait]
impl<S: AnomalySource + ?Sized> AnomalySource for Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch(&self, hour: ForecastHour) -> AnomalyResult<AnomalyResponse> {
        (**self).fetch(hour).await
    }
}
