//! Dashboard driver.
//!
//! Loads a YAML layout, builds the widgets over simulated data sources and
//! runs the compositor until Ctrl-C (or until the output window closes).
//!
//! ```text
//! panel-dashboard [CONFIG]        # default: dashboard.yaml
//! RUST_LOG=panel_dashboard=debug panel-dashboard
//! ```
//!
//! Built with `--features simulator` the frames go to an SDL window;
//! otherwise they are counted and discarded.

use std::process::ExitCode;

use panel_dashboard::config::DisplayConfig;
use panel_dashboard::error::DashboardError;
use panel_dashboard::readers::ReaderSet;
use panel_dashboard::sink::OutputSink;
use panel_dashboard::{Compositor, DashboardConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Layout loaded when no path is given.
const DEFAULT_CONFIG_PATH: &str = "dashboard.yaml";

/// Window pixels per display pixel.
#[cfg(feature = "simulator")]
const SIMULATOR_SCALE: u32 = 4;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "dashboard failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(path: &str) -> Result<(), DashboardError> {
    let config = DashboardConfig::load(path)?;
    info!(path, widgets = config.widgets.len(), "config loaded");

    let sink = open_sink(&config.display)?;
    let mut compositor = Compositor::new(&config, &ReaderSet::simulated(), sink)?;
    compositor.start()?;

    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            signal.map_err(DashboardError::from)
        }
        finished = compositor.finished() => finished,
    };

    compositor.stop().await?;
    outcome
}

#[cfg(feature = "simulator")]
fn open_sink(display: &DisplayConfig) -> Result<Box<dyn OutputSink>, DashboardError> {
    use panel_dashboard::sink::SimulatorSink;

    Ok(Box::new(SimulatorSink::open(display.width, display.height, SIMULATOR_SCALE)?))
}

#[cfg(not(feature = "simulator"))]
fn open_sink(display: &DisplayConfig) -> Result<Box<dyn OutputSink>, DashboardError> {
    use panel_dashboard::sink::NullSink;

    info!("headless build, frames are discarded (enable the `simulator` feature for a window)");
    Ok(Box::new(NullSink::new(display.width, display.height)))
}
