use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::controllers::streaming::data::coordinator_config::CoordinatorConfig;
use crate::controllers::streaming::data::render_params::{
    DEFAULT_HEIGHT, DEFAULT_METHOD, DEFAULT_WIDTH, RenderParams,
};
use crate::core::data::render_request::{DEFAULT_ITERATION_BOUND, RenderMode};
use crate::core::data::viewport::Viewport;

/// A method selector served by a remote compute worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRoute {
    pub name: String,
    pub url: String,
}

fn parse_route(value: &str) -> Result<WorkerRoute, String> {
    match value.split_once('=') {
        Some((name, url)) if !name.is_empty() && !url.is_empty() => Ok(WorkerRoute {
            name: name.to_owned(),
            url: url.to_owned(),
        }),
        _ => Err(format!("expected NAME=URL, got `{value}`")),
    }
}

/// Render one Mandelbrot frame through the streaming coordinator and save it
/// as PNG.
#[derive(Debug, Parser)]
#[command(name = "fractal_stream", version)]
pub struct RenderArgs {
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub center_x: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub center_y: f64,

    #[arg(short, long, default_value_t = 1.0)]
    pub zoom: f64,

    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    #[arg(short, long, default_value_t = DEFAULT_ITERATION_BOUND)]
    pub iterations: u32,

    /// pixel, line or image
    #[arg(short, long, default_value_t = RenderMode::Image)]
    pub mode: RenderMode,

    /// Backend selector: `local` or the name of a `--worker` route
    #[arg(long, default_value = DEFAULT_METHOD)]
    pub method: String,

    /// Remote compute worker, e.g. `go=http://127.0.0.1:6001/compute`
    #[arg(long = "worker", value_name = "NAME=URL", value_parser = parse_route)]
    pub workers: Vec<WorkerRoute>,

    #[arg(long, default_value_t = 300)]
    pub throttle_ms: u64,

    /// Per-call timeout; 0 waits indefinitely
    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,

    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Threads running backend calls
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..))]
    pub call_threads: u64,

    #[arg(short, long, default_value = "output/mandelbrot.png")]
    pub output: PathBuf,
}

impl RenderArgs {
    #[must_use]
    pub fn params(&self) -> RenderParams {
        RenderParams {
            viewport: Viewport::new(self.center_x, self.center_y, self.zoom),
            width: self.width,
            height: self.height,
            iteration_bound: self.iterations,
            mode: self.mode,
            method: self.method.clone(),
        }
    }

    #[must_use]
    pub fn call_timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    #[must_use]
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            throttle_interval: Duration::from_millis(self.throttle_ms),
            call_timeout: self.call_timeout(),
            max_retries: self.retries,
            call_threads: self.call_threads as usize,
            ..CoordinatorConfig::default()
        }
    }
}
