//! Path dispatch tree
//!
//! Maps canonical URL paths made of literal segments and `:name` parameter
//! segments to handlers:
//! - Registration builds the tree incrementally from patterns
//! - Resolution walks it for a request path, capturing parameters and
//!   falling back to the nearest registered ancestor
//!
//! The tree is built once before serving starts and is read-only afterwards.
//! Captured parameters are returned per call and never stored on nodes, so a
//! shared `&Dispatcher` can be resolved from any number of threads.

mod error;
mod node;
mod params;
pub mod path;

pub use error::RegisterError;
pub use node::{DispatcherNode, Match};
pub use params::{Params, ParamsIter};
pub use path::clean_path;

/// Root of a dispatch tree plus the handler used when nothing matches.
#[derive(Debug)]
pub struct Dispatcher<H> {
    root: DispatcherNode<H>,
    not_found: H,
}

impl<H> Dispatcher<H> {
    pub fn new(not_found: H) -> Self {
        Self {
            root: DispatcherNode::new("/"),
            not_found,
        }
    }

    /// Registers `handler` for `pattern`. See [`DispatcherNode::register`].
    pub fn register(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<&mut DispatcherNode<H>, RegisterError> {
        self.root.register(pattern, handler)
    }

    /// Resolves a request path. Never fails: paths with no registered
    /// handler on their way resolve to the not-found handler.
    pub fn resolve(&self, path: &str) -> Match<'_, H> {
        self.root.resolve_or(path, &self.not_found)
    }

    pub fn root(&self) -> &DispatcherNode<H> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut DispatcherNode<H> {
        &mut self.root
    }

    pub fn not_found(&self) -> &H {
        &self.not_found
    }

    /// Labels of every registered route, sorted.
    pub fn routes(&self) -> Vec<&str> {
        self.root.routes()
    }
}

impl<H: Default> Default for Dispatcher<H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}
