//! Endpoint model
//!
//! Represents a single HTTP operation of the converted API together with its
//! parameters and response type. Endpoints are matched across two converted
//! documents by their delta identifier.

use serde::{Deserialize, Serialize};

use super::type_model::CanonicalType;

/// The HTTP operations the canonical model can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HttpOperation {
    /// GET
    Read,
    /// POST
    Create,
    /// PUT
    Update,
    /// DELETE
    Delete,
}

impl HttpOperation {
    /// The HTTP method backing this operation.
    pub fn http_method(&self) -> &'static str {
        match self {
            HttpOperation::Read => "GET",
            HttpOperation::Create => "POST",
            HttpOperation::Update => "PUT",
            HttpOperation::Delete => "DELETE",
        }
    }
}

/// Communication pattern of an endpoint.
///
/// OAS has no notion of streaming endpoints, so converted endpoints are
/// always request-response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommunicationPattern {
    /// A single request followed by a single response
    RequestResponse,
}

/// Classification of an endpoint parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    /// Path template parameter, always required
    Path,
    /// Query-style parameter (also used for header and cookie parameters)
    Lightweight,
    /// The request body
    Content,
}

/// A single endpoint parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Converted parameter type
    #[serde(rename = "type")]
    pub ty: CanonicalType,
    /// Parameter classification
    pub kind: ParameterKind,
    /// Whether the parameter must be present
    pub required: bool,
}

impl Parameter {
    /// Sentinel name used for the request body parameter. OAS does not name
    /// request bodies and there is at most one per endpoint.
    pub const REQUEST_BODY_NAME: &'static str = "_requestBody";

    /// Create a new parameter.
    pub fn new(
        name: impl Into<String>,
        ty: CanonicalType,
        kind: ParameterKind,
        required: bool,
    ) -> Self {
        Parameter {
            name: name.into(),
            ty,
            kind,
            required,
        }
    }
}

/// A converted API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Human-facing handler name (the operation id where declared)
    pub handler_name: String,
    /// Stable identity key used to match this endpoint across two converted
    /// documents
    pub delta_identifier: String,
    /// HTTP operation
    pub operation: HttpOperation,
    /// Communication pattern (always request-response for OAS input)
    pub communication_pattern: CommunicationPattern,
    /// Absolute path template of the endpoint
    pub absolute_path: String,
    /// Parameters in declaration order (path-item parameters first)
    pub parameters: Vec<Parameter>,
    /// Converted response type of the representative success response
    pub response: CanonicalType,
    /// Documented errors. OAS error responses are not representable in the
    /// canonical model, so this is always empty.
    pub errors: Vec<String>,
}
