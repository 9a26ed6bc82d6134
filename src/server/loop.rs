// Server loop module
// Accepts connections until shutdown is requested, then drains

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until `signals` requests shutdown.
///
/// Once shutdown is requested the listener is closed and in-flight
/// connections get up to the connection timeout to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    signals: Arc<SignalHandler>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                }
            }

            () = signals.shutdown.notified() => {
                info!(
                    requested = signals.is_shutdown_requested(),
                    "stopped accepting connections"
                );
                break;
            }
        }
    }

    drop(listener);
    drain(&active_connections, state.config.connection_timeout()).await;
}

/// Wait for active connections to finish, at most `limit`
async fn drain(active_connections: &AtomicUsize, limit: Duration) {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        let active = active_connections.load(Ordering::SeqCst);
        if active == 0 {
            info!("all connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            warn!(active, "drain timeout, abandoning open connections");
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
