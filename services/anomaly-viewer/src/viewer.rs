//! Fetch, project, render, write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anomaly_client::{AnomalySource, HttpAnomalySource, MockAnomalySource, RequestGate};
use anomaly_common::{AnomalyResponse, AnomalyResult, ForecastHour};
use anyhow::{Context, Result};
use renderer::{
    AnomalyProjector, JsonSurface, PngSurface, ProjectionOutput, ProjectorConfig, RenderSurface,
    SvgSurface,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

use crate::config::{OutputFormat, SourceKind, ViewerConfig};

/// One map written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMap {
    pub forecast_hour: ForecastHour,
    pub path: PathBuf,
    pub bytes: usize,
    /// Number of drawable points, or `None` in raster mode
    pub points: Option<usize>,
    pub valid_time: String,
    pub mock_data: bool,
}

/// Outcome counts of a `watch` session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub requested: usize,
    pub rendered: usize,
    pub stale: usize,
    pub failed: usize,
    pub rejected: usize,
}

enum TaskOutcome {
    Rendered,
    Stale,
    Failed,
}

pub struct Viewer {
    source: Arc<dyn AnomalySource>,
    projector: AnomalyProjector,
    format: OutputFormat,
    output_dir: PathBuf,
    point_radius: f64,
    gate: RequestGate,
}

impl Viewer {
    /// Build a viewer with the source the configuration names.
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        let source: Arc<dyn AnomalySource> = match config.source {
            SourceKind::Http => Arc::new(
                HttpAnomalySource::new(&config.client)
                    .context("Failed to create anomaly service client")?,
            ),
            SourceKind::Mock => Arc::new(MockAnomalySource::new(config.mock_seed)),
        };
        Self::with_source(config, source)
    }

    /// Build a viewer around an existing source.
    pub fn with_source(config: &ViewerConfig, source: Arc<dyn AnomalySource>) -> Result<Self> {
        config.validate()?;
        let projector = AnomalyProjector::new(config.projector.clone())
            .context("Failed to create projector")?;

        info!(
            source = source.name(),
            format = ?config.format,
            mode = ?config.projector.mode,
            width = config.projector.width,
            height = config.projector.height,
            output_dir = %config.output_dir.display(),
            "Viewer ready"
        );

        Ok(Self {
            source,
            projector,
            format: config.format,
            output_dir: config.output_dir.clone(),
            point_radius: config.point_radius,
            gate: RequestGate::new(),
        })
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn projector_config(&self) -> &ProjectorConfig {
        self.projector.config()
    }

    fn surface(&self) -> Box<dyn RenderSurface> {
        let config = self.projector_config();
        match self.format {
            OutputFormat::Png => Box::new(
                PngSurface::new(config.width, config.height)
                    .with_background(config.background)
                    .with_default_radius(self.point_radius),
            ),
            OutputFormat::Svg => Box::new(
                SvgSurface::new(config.width, config.height)
                    .with_background(config.background)
                    .with_default_radius(self.point_radius),
            ),
            OutputFormat::Json => Box::new(JsonSurface::new().pretty()),
        }
    }

    /// File the map for `hour` is written to.
    pub fn output_path(&self, hour: ForecastHour) -> PathBuf {
        let extension = match self.format {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Json => "json",
        };
        self.output_dir
            .join(format!("anomaly_f{:03}.{}", hour.hours(), extension))
    }

    /// Project and encode a response without touching the filesystem.
    pub fn render_response(
        &self,
        response: &AnomalyResponse,
    ) -> AnomalyResult<(ProjectionOutput, Vec<u8>)> {
        let output = self
            .projector
            .project(&response.anomaly_data, &response.statistics)?;
        let bytes = self.surface().render(&output, &response.statistics)?;
        Ok((output, bytes))
    }

    /// Fetch one forecast hour and write its map.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn render_hour(&self, hour: ForecastHour) -> Result<RenderedMap> {
        let response = self
            .source
            .fetch(hour)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        self.write_map(hour, &response).await
    }

    async fn write_map(&self, hour: ForecastHour, response: &AnomalyResponse) -> Result<RenderedMap> {
        let (output, bytes) = self
            .render_response(response)
            .with_context(|| format!("Failed to render forecast hour {}", hour))?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        let path = self.output_path(hour);
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let map = RenderedMap {
            forecast_hour: hour,
            path,
            bytes: bytes.len(),
            points: output.points().map(<[_]>::len),
            valid_time: response.valid_time.clone(),
            mock_data: response.mock_data,
        };

        info!(
            forecast_hour = hour.hours(),
            label = %hour.label(),
            path = %map.path.display(),
            bytes = map.bytes,
            points = ?map.points,
            valid_time = %map.valid_time,
            "Wrote anomaly map"
        );
        Ok(map)
    }

    /// Render every hour read from `input`, one per line, last request wins.
    ///
    /// Each selection is fetched in its own task. A result that arrives after
    /// a newer selection was made is discarded. Blank lines are ignored and
    /// `q` or `quit` ends the session; pending fetches are still awaited.
    pub async fn watch<R>(self: Arc<Self>, input: R) -> Result<WatchSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut summary = WatchSummary::default();
        let mut tasks = JoinSet::new();
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await.context("Failed to read input")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
                break;
            }

            let hour: ForecastHour = match line.parse() {
                Ok(hour) => hour,
                Err(e) => {
                    warn!(input = %line, error = %e, "Ignoring selection");
                    summary.rejected += 1;
                    continue;
                }
            };

            summary.requested += 1;
            let ticket = self.gate.issue();
            let viewer = Arc::clone(&self);

            tasks.spawn(async move {
                let response = match viewer.source.fetch(hour).await {
                    Ok(response) => response,
                    Err(e) => {
                        if viewer.gate.is_current(ticket) {
                            error!(forecast_hour = hour.hours(), "{}", e.user_message());
                        }
                        return TaskOutcome::Failed;
                    }
                };

                let Some(response) = viewer.gate.accept(ticket, response) else {
                    return TaskOutcome::Stale;
                };

                match viewer.write_map(hour, &response).await {
                    Ok(_) => TaskOutcome::Rendered,
                    Err(e) => {
                        let message = format!("{:#}", e);
                        error!(forecast_hour = hour.hours(), error = %message, "Render failed");
                        TaskOutcome::Failed
                    }
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(TaskOutcome::Rendered) => summary.rendered += 1,
                Ok(TaskOutcome::Stale) => summary.stale += 1,
                Ok(TaskOutcome::Failed) => summary.failed += 1,
                Err(e) => {
                    error!(error = %e, "Render task panicked");
                    summary.failed += 1;
                }
            }
        }

        info!(
            requested = summary.requested,
            rendered = summary.rendered,
            stale = summary.stale,
            failed = summary.failed,
            "Watch session finished"
        );
        Ok(summary)
    }
}
