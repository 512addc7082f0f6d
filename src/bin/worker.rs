use anyhow::Context;
use clap::Parser;

use fractal_stream::WorkerServer;
use fractal_stream::input::cli::worker_args::WorkerArgs;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = WorkerArgs::parse();

    let server = WorkerServer::bind(&args.addr, args.threads, args.format)
        .with_context(|| format!("cannot start worker on {}", args.addr))?;

    server.join();

    Ok(())
}
