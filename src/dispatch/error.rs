use std::fmt;

/// Errors returned when a pattern cannot be added to the tree.
///
/// A failed registration leaves the tree exactly as it was.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterError {
    /// The pattern collides with a route that is already registered.
    Conflict {
        /// Label of the node the pattern collided with.
        with: String,
    },
    /// A parameter segment (`:`) was given without a name.
    UnnamedParam,
}

impl RegisterError {
    pub(crate) fn conflict(with: &str) -> Self {
        Self::Conflict {
            with: with.to_owned(),
        }
    }
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { with } => write!(
                f,
                "registration conflicts with previously registered route: {with}"
            ),
            Self::UnnamedParam => write!(f, "parameters must be registered with a name"),
        }
    }
}

impl std::error::Error for RegisterError {}
