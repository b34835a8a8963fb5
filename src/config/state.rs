// Application state module
// Everything a connection task needs, shared read-only behind an Arc

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::handler::RouteTable;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Dispatch tree, frozen before the first connection is accepted
    pub routes: RouteTable,
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config, routes: RouteTable) -> Self {
        Self {
            config,
            routes,
            active_connections: AtomicUsize::new(0),
        }
    }
}
