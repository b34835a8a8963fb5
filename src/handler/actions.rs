//! Built-in handlers
//!
//! Small handlers that need no I/O: the not-found fallback, redirects,
//! fixed responses and the parameter echo used for debugging routes.

use hyper::http::request::Parts;
use hyper::{Method, StatusCode};
use serde_json::{json, Map, Value};

use super::router::{params, route_info};
use super::{Handler, HandlerFuture};
use crate::dispatch::Params;
use crate::http;

/// Default handler of every dispatch tree: 404 Not Found
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFound;

impl Handler for NotFound {
    fn handle<'a>(&'a self, _req: &'a Parts) -> HandlerFuture<'a> {
        Box::pin(async { http::build_404_response() })
    }
}

/// Redirect to a target that may reference captured parameters
#[derive(Debug, Clone)]
pub struct Redirect {
    target: String,
    code: u16,
}

impl Redirect {
    pub fn new(target: impl Into<String>, code: u16) -> Self {
        Self {
            target: target.into(),
            code,
        }
    }
}

impl Handler for Redirect {
    fn handle<'a>(&'a self, req: &'a Parts) -> HandlerFuture<'a> {
        let location = fill_params(&self.target, params(req));
        Box::pin(async move { http::build_redirect_response(&location, self.code) })
    }
}

/// Fixed response; the body may reference captured parameters
#[derive(Debug, Clone)]
pub struct Direct {
    status: u16,
    body: String,
    content_type: String,
}

impl Direct {
    pub fn new(status: u16, body: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: content_type.into(),
        }
    }
}

impl Handler for Direct {
    fn handle<'a>(&'a self, req: &'a Parts) -> HandlerFuture<'a> {
        let body = fill_params(&self.body, params(req));
        let is_head = req.method == Method::HEAD;
        Box::pin(async move {
            http::build_direct_response(self.status, body, &self.content_type, is_head)
        })
    }
}

/// Echoes how the request was dispatched as JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct ParamsEcho;

impl Handler for ParamsEcho {
    fn handle<'a>(&'a self, req: &'a Parts) -> HandlerFuture<'a> {
        let captured: Map<String, Value> = params(req)
            .iter()
            .map(|(name, value)| (name.to_owned(), Value::from(value)))
            .collect();
        let info = route_info(req);
        let body = json!({
            "path": req.uri.path(),
            "route": info.map(|i| i.route.as_str()),
            "remaining": info.map(|i| i.remaining.as_str()),
            "params": captured,
        });
        let is_head = req.method == Method::HEAD;
        Box::pin(async move { http::build_json_response(StatusCode::OK, &body, is_head) })
    }
}

/// Replaces `{name}` placeholders with captured parameter values
///
/// The template is scanned once, left to right; inserted values are never
/// scanned again. Placeholders without a captured value are kept as written.
pub fn fill_params(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];

        if name.contains('{') {
            // "{a{b}": only the innermost brace can open a placeholder
            out.push('{');
            rest = after;
            continue;
        }

        match params.get(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[open..=open + close + 1]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}
