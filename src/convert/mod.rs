//! Conversion module for the SDK
//!
//! Walks an `openapiv3` object graph and produces the canonical API
//! document. The walk is synchronous and pure: all I/O (reading and parsing
//! the source document) happens at the boundary, via [`parse_openapi`].
//!
//! Recoverable degradations (unknown formats, missing content types,
//! unsupported constructs) are logged and substituted in place; only
//! genuinely malformed input surfaces as a [`ConversionError`].

pub mod document;
pub mod route;
pub mod schema;
pub mod stats;

pub use document::{ConversionOutput, DocumentConverter, parse_openapi};
pub use route::RouteConverter;
pub use schema::SchemaConverter;
pub use stats::ConversionStats;

use crate::models::TypeNameCollision;

/// Errors raised for malformed input or violated conversion invariants.
///
/// Anything not listed here degrades in place: the converter substitutes a
/// marker type, logs the degradation and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// A `$ref` that does not point into the supported component sections,
    /// or points at a component that does not exist.
    #[error("unable to resolve reference '{reference}'")]
    UnresolvedReference { reference: String },

    /// An `allOf`, `oneOf` or `anyOf` with zero branches.
    #[error("encountered an empty '{keyword}' at '{location}'")]
    EmptyComposition {
        keyword: &'static str,
        location: String,
    },

    /// An array schema without an item schema.
    #[error("array schema at '{location}' declares no item schema")]
    ArrayWithoutItems { location: String },

    /// Merging a multi-branch `allOf` requires every remaining branch to be
    /// an object.
    #[error("'allOf' at '{location}' contains a non-object branch")]
    NonObjectAllOfBranch { location: String },

    /// Two structurally different types claimed the same name in the type
    /// store.
    #[error(transparent)]
    NameCollision(#[from] TypeNameCollision),

    /// The raw document content could not be parsed as JSON or YAML.
    #[error("unable to parse OpenAPI document: {0}")]
    InvalidDocument(String),
}
