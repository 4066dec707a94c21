//! API Delta SDK - OpenAPI to canonical API document conversion
//!
//! Converts OpenAPI Specification documents into a canonical,
//! comparison-friendly API model:
//! - A closed canonical type system with structural equality
//! - Endpoints keyed by a stable delta identifier
//! - A deduplicated, name-keyed type store per document
//!
//! The conversion is deliberately lossy but strictly deterministic, so two
//! independently converted documents can be diffed without false positives.
//! Lossy degradations (discarded `oneOf`/`anyOf` branches, `not` schemas,
//! terminated reference cycles) are logged via `tracing` and counted in
//! [`ConversionStats`].

pub mod convert;
pub mod models;

// Re-export the conversion entry points
pub use convert::{
    ConversionError, ConversionOutput, ConversionStats, DocumentConverter, RouteConverter,
    SchemaConverter, parse_openapi,
};

// Re-export the canonical model
pub use models::{
    ApiDocument, CanonicalType, CommunicationPattern, Endpoint, HttpInformation, HttpOperation,
    HttpProtocol, Parameter, ParameterKind, ScalarKind, ServiceInformation, TypeNameCollision,
    TypeProperty, TypeStore, Version,
};
