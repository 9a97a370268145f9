use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use floater_wm::config::FloaterConfig;
use floater_wm::drivers::OutputDriver;
use floater_wm::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use floater_wm::persist::{JsonRectStore, RectStore};
use floater_wm::runner::{DemoApp, DemoOptions, run};
use floater_wm::tracing_sub;

#[derive(Parser, Debug)]
#[command(
    name = "floater-demo",
    version = env!("CARGO_PKG_VERSION"),
    about = "Floating windows in the terminal: drag, snap, tabs and modal dialogs"
)]
struct Cli {
    /// JSON file of canvas tunables. Fields left out keep their defaults.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON file where window positions are remembered between runs.
    #[arg(short = 'p', long = "positions", value_name = "FILE")]
    positions: Option<PathBuf>,

    /// Append log output to this file. Without it nothing is logged.
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// error, warn, info, debug or trace.
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Plain windows to open at startup.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 3)]
    windows: usize,

    /// Overrides the snap margin from the config.
    #[arg(long = "snap-margin", value_name = "CELLS")]
    snap_margin: Option<i32>,

    /// Frames per second to redraw at.
    #[arg(short = 'f', long = "fps", value_name = "FPS", default_value_t = 60)]
    fps: u32,
}

impl Cli {
    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.clamp(1, 240)))
    }

    fn load_config(&self) -> io::Result<FloaterConfig> {
        let mut config = match &self.config {
            Some(path) => FloaterConfig::load(path).map_err(io::Error::other)?,
            None => FloaterConfig::terminal(),
        };
        if let Some(margin) = self.snap_margin {
            config.snap_margin = margin;
        }
        config.validate().map_err(io::Error::other)?;
        Ok(config)
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let level = tracing_sub::parse_level(&cli.log_level).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unknown log level `{}`", cli.log_level),
        )
    })?;
    tracing_sub::init(cli.log_file.as_deref(), level)?;

    let config = cli.load_config()?;
    let store = match &cli.positions {
        Some(path) => {
            let store = JsonRectStore::open(path).map_err(io::Error::other)?;
            Some(Box::new(store) as Box<dyn RectStore>)
        }
        None => None,
    };

    let mut output = ConsoleOutputDriver::new()?;
    let (width, height) = output.size()?;
    let mut app = DemoApp::new(
        DemoOptions {
            config,
            windows: cli.windows,
            store,
        },
        width,
        height,
    );
    tracing::info!(width, height, windows = cli.windows, "demo started");

    run(
        &mut app,
        ConsoleInputDriver::new(),
        &mut output,
        cli.frame_interval(),
    )
}
