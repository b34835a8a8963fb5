//! Hierarchical path dispatch for an HTTP server.
//!
//! [`dispatch`] holds the tree itself and is usable on its own. The other
//! modules wire it into a hyper server driven by a TOML route table.

pub mod config;
pub mod dispatch;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
