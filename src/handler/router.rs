//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch
//! through the route table and access logging.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};

use super::RouteTable;
use crate::config::AppState;
use crate::dispatch::Params;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Which route answered a request, stored in request and response extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// Label of the answering node
    pub route: String,
    /// Canonical path below the answering node
    pub remaining: String,
}

static EMPTY_PARAMS: Params = Params::new();

/// Parameters captured for this request
pub fn params(req: &Parts) -> &Params {
    req.extensions.get::<Params>().unwrap_or(&EMPTY_PARAMS)
}

pub fn route_info(req: &Parts) -> Option<&RouteInfo> {
    req.extensions.get::<RouteInfo>()
}

/// Main entry point for HTTP request handling
///
/// The request body is never read; only GET, HEAD and OPTIONS are served.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let entry = state
        .config
        .logging
        .access_log
        .then(|| access_log_entry(&parts, peer_addr));

    let response = match check_http_method(&parts.method, state.config.http.enable_cors) {
        Some(resp) => resp,
        None => dispatch(&state.routes, parts).await,
    };

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.route = response
            .extensions()
            .get::<RouteInfo>()
            .map(|info| info.route.clone());
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve the request path and run the answering handler
///
/// Captured parameters and the [`RouteInfo`] are attached to the request
/// before the handler runs; the route info is copied to the response.
pub async fn dispatch(table: &RouteTable, mut parts: Parts) -> Response<Full<Bytes>> {
    let matched = table.resolve(parts.uri.path());
    logger::log_dispatch(
        parts.uri.path(),
        matched.route,
        matched.params.len(),
        &matched.remaining,
    );

    let info = RouteInfo {
        route: matched.route.to_owned(),
        remaining: matched.remaining,
    };
    parts.extensions.insert(matched.params);
    parts.extensions.insert(info.clone());

    let mut response = matched.handler.handle(&parts).await;
    response.extensions_mut().insert(info);
    response
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn access_log_entry(parts: &Parts, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_09 {
        "0.9"
    } else if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else if version == Version::HTTP_3 {
        "3"
    } else {
        "1.1"
    }
}
