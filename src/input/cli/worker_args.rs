use std::num::NonZeroUsize;
use std::thread;

use clap::Parser;

use crate::server::response_format::ResponseFormat;

fn default_threads() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// HTTP compute worker serving `/fractal` and `/compute`.
#[derive(Debug, Parser)]
#[command(name = "worker", version)]
pub struct WorkerArgs {
    #[arg(long, default_value = "127.0.0.1:6001")]
    pub addr: String,

    /// Requests served concurrently
    #[arg(long, default_value_t = default_threads())]
    pub threads: usize,

    /// Response body when the client does not ask for one
    #[arg(long, value_enum, default_value_t = ResponseFormat::Json)]
    pub format: ResponseFormat,
}
