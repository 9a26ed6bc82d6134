use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tracing::info;

mod config;
mod content;
mod error;
mod handler;
mod http;
mod logger;
mod server;
mod store;
mod upstream;

#[cfg(test)]
mod test_support;

use server::signal::{start_signal_handler, SignalHandler};
use server::{create_reusable_listener, start_server_loop};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg.logging)?;

    // Create the Tokio runtime, sized by `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = create_reusable_listener(addr, cfg.server.backlog)?;

    let state = Arc::new(config::AppState::new(&cfg)?);
    let active_connections = Arc::new(AtomicUsize::new(0));
    let signals = Arc::new(SignalHandler::new());
    start_signal_handler(Arc::clone(&signals));

    logger::log_server_start(&listener.local_addr()?, &cfg);

    start_server_loop(listener, state, active_connections, signals).await;
    info!("server stopped");
    Ok(())
}
