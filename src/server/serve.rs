// Server loop module
// Accepts connections until shutdown, then drains open connections

use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Serve `listener` until `shutdown` resolves.
///
/// The listener is closed as soon as shutdown starts. Open connections are
/// asked to finish their current request and given
/// `performance.shutdown_timeout` seconds before they are abandoned.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_shutdown(state.active_connections.load(Ordering::SeqCst));

    let timeout = Duration::from_secs(state.config.performance.shutdown_timeout);
    tokio::select! {
        () = graceful.shutdown() => logger::log_info("[Shutdown] All connections closed"),
        () = tokio::time::sleep(timeout) => {
            logger::log_warning(&format!(
                "[Shutdown] Timed out after {}s, dropping {} open connection(s)",
                timeout.as_secs(),
                state.active_connections.load(Ordering::SeqCst)
            ));
        }
    }
}
