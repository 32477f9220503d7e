use anyhow::Result;
use clap::Parser;
use octodash::config::SinkKind;
use octodash::sink::build_sink;
use octodash::tariff::TariffClient;
use octodash::{Config, Dashboard};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::{error, info};

/// Octopus Agile price dashboard
#[derive(Debug, Parser)]
#[command(version = env!("APP_VERSION"), about)]
struct Cli {
    /// Configuration file (default: search octodash.yaml, /data, /etc/octodash)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generate tomorrow's prices when none are published yet
    #[arg(long)]
    mock_tomorrow: bool,

    /// Render a single frame and exit
    #[arg(long)]
    once: bool,

    /// Output sink
    #[arg(long, value_enum)]
    sink: Option<SinkKind>,

    /// Directory for PNG snapshots
    #[arg(long)]
    output_dir: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;
    if let Some(sink) = cli.sink {
        config.display.sink = sink;
    }
    if let Some(dir) = cli.output_dir {
        config.display.output_dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    octodash::logging::init_logging(&config.logging)?;
    info!("Octodash {} starting up", env!("APP_VERSION"));

    let fetcher = TariffClient::new(&config.tariff, config.tz()?)?;
    let sink = build_sink(&config.display)?;
    let mut dashboard = Dashboard::new(config, fetcher, sink)?;
    if cli.mock_tomorrow {
        dashboard = dashboard.with_mock_tomorrow(StdRng::from_entropy());
    }

    if cli.once {
        let report = dashboard.run_once().await?;
        info!(
            "Rendered snapshot: {} points today, {} tomorrow",
            report.today_points, report.tomorrow_points
        );
        return Ok(());
    }

    match dashboard.run().await {
        Ok(()) => {
            info!("Dashboard shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Dashboard failed with error: {}", e);
            Err(anyhow::anyhow!("Dashboard error: {}", e))
        }
    }
}
