// Server module entry point
// Binds the listener, serves the frozen route table and shuts down on signal

pub mod connection;
pub mod listener;
pub mod serve;
pub mod signal;

use std::sync::Arc;

pub use listener::bind_listener;
pub use serve::serve;
pub use signal::shutdown_signal;

use crate::config::{AppState, Config};
use crate::handler::RouteTable;
use crate::logger;

/// Run the server until SIGINT or SIGTERM
///
/// `routes` is read-only from here on; every connection task shares it.
pub async fn run(config: Config, routes: RouteTable) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.get_socket_addr()?;
    let listener = bind_listener(addr)?;
    logger::log_server_start(&addr, &config);

    let state = Arc::new(AppState::new(config, routes));
    serve(listener, state, shutdown_signal()).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::build_route_table;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    const CONFIG: &str = r#"
        [logging]
        access_log = false

        [performance]
        shutdown_timeout = 2

        [[routes]]
        pattern = "/users/:id"
        type = "direct"
        body = "user {id}"

        [[routes]]
        pattern = "/"
        type = "direct"
        status = 404
        body = "nothing here"
    "#;

    async fn request(addr: std::net::SocketAddr, raw: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let config = Config::from_toml_str(CONFIG).unwrap();
        let routes = build_route_table(&config.routes, &config.http).unwrap();
        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(AppState::new(config, routes));
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, Arc::clone(&state), async move {
            let _ = stopped.await;
        }));

        let response = request(
            addr,
            "GET /users/42 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("user 42"));

        let response = request(
            addr,
            "GET /elsewhere HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found"));
        assert!(response.ends_with("nothing here"));

        let response = request(
            addr,
            "DELETE /users/42 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed"));

        stop.send(()).unwrap();
        server.await.unwrap();
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let mut config = Config::from_toml_str(CONFIG).unwrap();
        config.performance.max_connections = Some(0);
        let routes = build_route_table(&config.routes, &config.http).unwrap();
        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(AppState::new(config, routes));
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, Arc::clone(&state), async move {
            let _ = stopped.await;
        }));

        // accepted, then closed without a response
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
        assert_eq!(
            state
                .active_connections
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );

        stop.send(()).unwrap();
        server.await.unwrap();
    }
}
