//! Error types for split-query loading.
//!
//! Everything except `Backend` and `Cancelled` is a configuration or mapping
//! error discovered while analyzing a query, before any child-level query
//! executes. Backend failures pass through unwrapped; this crate never
//! reinterprets them.

use std::fmt;

/// Result alias used across the splitfetch crates.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type for split-query loading.
#[derive(Debug)]
pub enum Error {
    /// A nested fetch directive was declared with no active enclosing
    /// fetch chain.
    InvalidFetchChain {
        /// The navigation named by the offending directive.
        navigation: String,
    },

    /// A navigation's join key spans more than one column. Composite keys
    /// are unsupported and fail fast at resolution time.
    UnsupportedKey {
        /// Parent entity type name.
        entity: &'static str,
        /// Navigation property name.
        navigation: &'static str,
        /// Number of columns that back the key.
        columns: usize,
    },

    /// A navigation or foreign-key column could not be matched to a
    /// persistent property.
    MappingNotFound {
        /// Entity type name the lookup ran against.
        entity: &'static str,
        /// What was being looked up.
        detail: String,
    },

    /// A fetch directive body is not a simple property access.
    UnsupportedFetchShape {
        /// Description of the rejected body.
        detail: String,
    },

    /// An entity type declares no primary key, or an instance carries no
    /// value for it.
    MissingPrimaryKey {
        /// Entity type name.
        entity: &'static str,
    },

    /// A programming-contract violation between analysis and hydration
    /// (e.g. a child entity of the wrong runtime type). Not recoverable.
    Contract(String),

    /// An error raised by the query-execution collaborator, passed through
    /// unchanged.
    Backend(BackendError),

    /// Execution was cancelled before it began.
    Cancelled,
}

/// A failure surfaced by the query-execution collaborator.
#[derive(Debug)]
pub struct BackendError {
    /// Human-readable message.
    pub message: String,
    /// Underlying cause, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BackendError {
    /// Create a backend error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }
}

impl Error {
    /// Shorthand for a backend pass-through error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Error::Backend(BackendError::new(message))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidFetchChain { navigation } => write!(
                f,
                "Nested fetch of '{}' has no enclosing fetch directive",
                navigation
            ),
            Error::UnsupportedKey {
                entity,
                navigation,
                columns,
            } => write!(
                f,
                "Navigation '{}.{}' is backed by {} key columns; only single-column keys are supported",
                entity, navigation, columns
            ),
            Error::MappingNotFound { entity, detail } => {
                write!(f, "No mapping on '{}': {}", entity, detail)
            }
            Error::UnsupportedFetchShape { detail } => {
                write!(f, "Fetch directive is not a simple property access: {}", detail)
            }
            Error::MissingPrimaryKey { entity } => {
                write!(f, "Entity type '{}' has no usable primary key", entity)
            }
            Error::Contract(msg) => write!(f, "Contract violation: {}", msg),
            Error::Backend(e) => write!(f, "Backend error: {}", e.message),
            Error::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Backend(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}
