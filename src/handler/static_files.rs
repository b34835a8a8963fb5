//! Static file serving module
//!
//! Directory routes serve the file addressed by the remaining path of the
//! request, so they are usually registered with `preserve_path`.

use std::path::{Path, PathBuf};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::request::Parts;
use hyper::{Method, Response};
use tokio::fs;

use super::router::route_info;
use super::{Handler, HandlerFuture};
use crate::http::{self, cache, mime};
use crate::logger;

/// Serves files below a directory
#[derive(Debug, Clone)]
pub struct StaticDir {
    dir: PathBuf,
    index_files: Vec<String>,
}

impl StaticDir {
    pub fn new(dir: impl Into<PathBuf>, index_files: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            index_files,
        }
    }
}

impl Handler for StaticDir {
    fn handle<'a>(&'a self, req: &'a Parts) -> HandlerFuture<'a> {
        Box::pin(async move {
            let remaining = route_info(req).map_or("/", |info| info.remaining.as_str());
            match load_from_directory(&self.dir, remaining, &self.index_files).await {
                Some((content, file_path)) => {
                    build_static_file_response(req, content, mime::content_type_for(&file_path))
                }
                None => http::build_404_response(),
            }
        })
    }
}

/// Serves one file regardless of the remaining path
#[derive(Debug, Clone)]
pub struct StaticFile {
    path: PathBuf,
}

impl StaticFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Handler for StaticFile {
    fn handle<'a>(&'a self, req: &'a Parts) -> HandlerFuture<'a> {
        Box::pin(async move {
            match fs::read(&self.path).await {
                Ok(content) => {
                    build_static_file_response(req, content, mime::content_type_for(&self.path))
                }
                Err(e) => {
                    logger::log_warning(&format!(
                        "Failed to read file '{}': {e}",
                        self.path.display()
                    ));
                    http::build_404_response()
                }
            }
        })
    }
}

/// Load a file below `static_dir` addressed by the canonical `remaining` path
///
/// Directories are answered with the first existing index file. Paths that
/// resolve outside `static_dir` (through symlinks) are refused.
pub async fn load_from_directory(
    static_dir: &Path,
    remaining: &str,
    index_files: &[String],
) -> Option<(Vec<u8>, PathBuf)> {
    let static_dir_canonical = match fs::canonicalize(static_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                static_dir.display()
            ));
            return None;
        }
    };

    let relative = remaining.trim_start_matches('/');
    let mut file_path = static_dir.join(relative);

    if is_dir(&file_path).await {
        for index_file in index_files {
            let index_path = file_path.join(index_file);
            if is_file(&index_path).await {
                file_path = index_path;
                break;
            }
        }
    }

    // a missing file is an ordinary 404, not worth a log line
    let file_path_canonical = fs::canonicalize(&file_path).await.ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {remaining} -> {}",
            file_path_canonical.display()
        ));
        return None;
    }

    match fs::read(&file_path_canonical).await {
        Ok(content) => Some((content, file_path)),
        Err(e) => {
            // directories without an index file end up here too
            logger::log_warning(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            None
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

/// Build file response honoring `If-None-Match` and HEAD
fn build_static_file_response(
    req: &Parts,
    content: Vec<u8>,
    content_type: &str,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&content);
    let if_none_match = req
        .headers
        .get("if-none-match")
        .and_then(|v| v.to_str().ok());

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_file_response(
        Bytes::from(content),
        content_type,
        &etag,
        req.method == Method::HEAD,
    )
}
