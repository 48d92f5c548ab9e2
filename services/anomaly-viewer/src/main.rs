//! Temperature anomaly map viewer.
//!
//! Commands:
//! - `render`: fetch one forecast hour (or all of them) and write the map
//! - `watch`: read forecast hours from stdin and render each, last request wins
//! - `hours`: list the forecast hours the service publishes

use std::path::PathBuf;
use std::sync::Arc;

use anomaly_common::{ForecastHour, RegionOfInterest};
use anomaly_viewer::{OutputFormat, SourceKind, Viewer, ViewerConfig};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use renderer::RenderMode;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "anomaly-viewer")]
#[command(about = "Render GFS temperature anomaly maps")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "ANOMALY_VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and render a single forecast hour
    Render {
        /// Forecast hour, e.g. 0, 24 or +48h
        #[arg(long, default_value = "0")]
        hour: ForecastHour,

        /// Render every supported forecast hour
        #[arg(long, conflicts_with = "hour")]
        all: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Render forecast hours read from stdin, one per line
    Watch {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// List supported forecast hours
    Hours,
}

/// Command-line overrides applied on top of file and environment settings.
#[derive(ClapArgs, Debug, Default)]
struct Overrides {
    /// Anomaly service base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Data source
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Ask the service for its synthetic field
    #[arg(long)]
    service_mock: bool,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Render a dense raster instead of points
    #[arg(long)]
    raster: bool,

    /// Region as min_lat,max_lat,min_lon,max_lon
    #[arg(long)]
    region: Option<String>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Sample every k-th cell or pixel
    #[arg(long)]
    stride: Option<usize>,
}

impl Overrides {
    fn apply(self, config: &mut ViewerConfig) -> Result<()> {
        if let Some(url) = self.api_url {
            config.client.api_url = url;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if self.service_mock {
            config.client.use_mock = true;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.raster {
            config.projector.mode = RenderMode::Raster;
        }
        if let Some(region) = self.region {
            config.projector.region =
                RegionOfInterest::from_csv(&region).context("Invalid --region")?;
        }
        if let Some(width) = self.width {
            config.projector.width = width;
        }
        if let Some(height) = self.height {
            config.projector.height = height;
        }
        if let Some(stride) = self.stride {
            config.projector.stride = stride;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match args.command {
        Command::Hours => {
            for hour in ForecastHour::all() {
                println!("{:>4}  {}", hour.hours(), hour.label());
            }
            Ok(())
        }
        Command::Render {
            hour,
            all,
            overrides,
        } => {
            let viewer = build_viewer(args.config, overrides)?;
            let hours: Vec<ForecastHour> = if all {
                ForecastHour::all().collect()
            } else {
                vec![hour]
            };
            for hour in hours {
                let map = viewer.render_hour(hour).await?;
                println!("{}", map.path.display());
            }
            Ok(())
        }
        Command::Watch { overrides } => {
            let viewer = Arc::new(build_viewer(args.config, overrides)?);
            info!("Reading forecast hours from stdin (q to quit)");
            let summary = viewer.watch(BufReader::new(tokio::io::stdin())).await?;
            println!(
                "requested {}, rendered {}, stale {}, failed {}",
                summary.requested, summary.rendered, summary.stale, summary.failed
            );
            Ok(())
        }
    }
}

fn build_viewer(config_path: Option<PathBuf>, overrides: Overrides) -> Result<Viewer> {
    let required = config_path.is_some();
    let path = config_path.unwrap_or_else(|| PathBuf::from("config/viewer.yaml"));
    let mut config = ViewerConfig::load(Some(path.as_path()), required)?;
    overrides.apply(&mut config)?;
    config.validate()?;

    info!(
        source = ?config.source,
        api_url = %config.client.api_url,
        format = ?config.format,
        "Loaded configuration"
    );

    Viewer::new(&config)
}
