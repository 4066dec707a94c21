//! Models module for the SDK
//!
//! Defines the canonical API model every OAS document is converted into:
//! the closed type model, endpoints, service metadata and the final
//! document with its deduplicated type store.

pub mod document;
pub mod endpoint;
pub mod service;
pub mod type_model;

pub use document::{ApiDocument, TypeNameCollision, TypeStore};
pub use endpoint::{CommunicationPattern, Endpoint, HttpOperation, Parameter, ParameterKind};
pub use service::{HttpInformation, HttpProtocol, InvalidVersion, ServiceInformation, Version};
pub use type_model::{CanonicalType, ScalarKind, TypeProperty};
