use std::fs;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use log::info;

use fractal_stream::input::cli::render_args::RenderArgs;
use fractal_stream::{
    BackendRouter, ChannelSink, DeliveryEvent, HttpBackend, LocalBackend, StreamingCoordinator,
    write_png,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = RenderArgs::parse();

    let mut router = BackendRouter::new().with_route("local", Arc::new(LocalBackend));
    for route in &args.workers {
        router.add_route(
            route.name.clone(),
            Arc::new(HttpBackend::new(route.url.clone(), args.call_timeout())),
        );
    }
    info!("backends: {}", router.methods().join(", "));

    let (sink, events) = ChannelSink::new();
    let mut coordinator =
        StreamingCoordinator::new(Arc::new(router), Arc::new(sink), args.coordinator_config());

    let generation = coordinator.submit(args.params());

    let frame = loop {
        let event = events
            .recv()
            .context("coordinator stopped before delivering a frame")?;

        match event {
            DeliveryEvent::Started(started) => {
                info!(
                    "rendering {}x{} in {} mode",
                    started.width, started.height, started.mode
                );
            }
            DeliveryEvent::Rows(rows) => {
                if rows.rows_received % 50 == 0 || rows.rows_received == rows.total_rows {
                    info!("{}/{} rows", rows.rows_received, rows.total_rows);
                }
            }
            DeliveryEvent::Frame(frame) if frame.generation == generation => {
                info!("frame rendered in {:?}", frame.render_duration);
                break frame.frame;
            }
            DeliveryEvent::Error(error) if error.generation == generation => {
                bail!("render failed: {}", error.error);
            }
            _ => {}
        }
    };

    coordinator.shutdown();

    if let Some(parent) = args.output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    write_png(&frame, &args.output)
        .with_context(|| format!("cannot write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());

    Ok(())
}
