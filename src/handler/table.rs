//! Route table construction
//!
//! Turns the `[[routes]]` entries of the configuration into a dispatch
//! tree, in configuration order.

use std::path::Path;

use super::actions::{Direct, NotFound, ParamsEcho, Redirect};
use super::static_files::{StaticDir, StaticFile};
use super::{BoxedHandler, RouteTable};
use crate::config::{HttpConfig, RouteAction, RouteConfig};
use crate::logger;

const DEFAULT_DIRECT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Build the dispatch tree for the configured routes
///
/// Fails on the first route the tree refuses, naming its pattern, and on
/// routes that sit below a `preserve_path` route and could never be reached.
pub fn build_route_table(routes: &[RouteConfig], http: &HttpConfig) -> Result<RouteTable, String> {
    let mut table = RouteTable::new(Box::new(NotFound));

    for route in routes {
        let node = table
            .register(&route.pattern, handler_for(&route.action, http))
            .map_err(|e| format!("Invalid route '{}': {e}", route.pattern))?;

        node.set_preserve_path(route.preserve_path);
        if let Some(ref name) = route.name {
            node.set_name(name.as_str());
        }
        logger::log_route_registered(&route.pattern, node.name(), node.preserve_path());
    }

    // checked once all flags are set, whatever the configuration order
    for route in routes {
        if let Some(ancestor) = table.root().preserving_ancestor(&route.pattern) {
            return Err(format!(
                "Unreachable route '{}': '{ancestor}' preserves the path below it",
                route.pattern
            ));
        }
    }

    Ok(table)
}

fn handler_for(action: &RouteAction, http: &HttpConfig) -> BoxedHandler {
    match action {
        RouteAction::Dir { path } => {
            Box::new(StaticDir::new(Path::new(path), http.index_files.clone()))
        }
        RouteAction::File { path } => Box::new(StaticFile::new(Path::new(path))),
        RouteAction::Redirect { target, code } => Box::new(Redirect::new(target.as_str(), *code)),
        RouteAction::Direct {
            status,
            body,
            content_type,
        } => Box::new(Direct::new(
            *status,
            body.clone().unwrap_or_default(),
            content_type
                .as_deref()
                .unwrap_or(DEFAULT_DIRECT_CONTENT_TYPE),
        )),
        RouteAction::Params => Box::new(ParamsEcho),
    }
}
