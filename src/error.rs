//! Error taxonomy for the binding runtime.
//!
//! Every operation here is synchronous and deterministic, so there are no
//! retryable failures. Errors fall into two groups:
//!
//! - **Contract violations** - invoking a ref before it is mounted, mounting
//!   twice, indexing a list out of range, `first`/`last` on an empty list.
//!   These indicate an authoring bug in the builder and surface immediately
//!   to the direct caller.
//! - **Template shape violations** - a builder's markup produced zero or
//!   multiple root elements, or could not be parsed at all.
//!
//! A ref whose marker is missing from the rendered markup is *not* an error:
//! it is reported as a warning and the ref stays unmounted (see
//! [`crate::refs`]).

use thiserror::Error;

/// Runtime error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A ref handle was invoked before its marker was resolved.
    #[error("ref `{0}` is not mounted")]
    NotMounted(String),

    /// A ref or block was mounted a second time.
    #[error("ref `{0}` is already mounted")]
    AlreadyMounted(String),

    /// `set` was called with an index past the end of the list.
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// `first`/`last` was called on an empty list.
    #[error("list is empty")]
    Empty,

    /// A builder's markup did not produce exactly one root element.
    #[error("template must have exactly one root element, found {roots}")]
    InvalidTemplate { roots: usize },

    /// The markup string could not be parsed.
    #[error("malformed markup: {0}")]
    Markup(String),

    /// A mount anchor had no parent to insert the cloned root into.
    #[error("mount anchor `{0}` is detached from the tree")]
    DetachedAnchor(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
