//! Request handler module
//!
//! Defines the handler capability stored in the dispatch tree, the built-in
//! handlers selected by the route table, and the request entry point.

pub mod actions;
pub mod router;
pub mod static_files;
pub mod table;

use std::future::Future;
use std::pin::Pin;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::request::Parts;
use hyper::Response;

use crate::dispatch::Dispatcher;

pub use router::{dispatch, handle_request, params, route_info, RouteInfo};
pub use table::build_route_table;

/// Future returned by [`Handler::handle`]
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Response<Full<Bytes>>> + Send + 'a>>;

/// A request handler mounted on a dispatch tree node
///
/// Handlers receive the request head. The parameters captured for this
/// request and the resolved route are in its extensions, see
/// [`params`] and [`route_info`].
pub trait Handler: Send + Sync {
    fn handle<'a>(&'a self, req: &'a Parts) -> HandlerFuture<'a>;
}

pub type BoxedHandler = Box<dyn Handler>;

/// Dispatch tree used by the server
pub type RouteTable = Dispatcher<BoxedHandler>;
