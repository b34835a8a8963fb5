//! HTTP protocol layer module
//!
//! Response builders, content type detection and `ETag` helpers shared by
//! the built-in route handlers.

pub mod cache;
pub mod mime;
pub mod response;

pub use response::{
    build_304_response, build_404_response, build_405_response, build_direct_response,
    build_file_response, build_json_response, build_options_response, build_redirect_response,
};
