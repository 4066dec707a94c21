//! Canonical type model
//!
//! Defines the closed set of type variants every converted OAS schema is
//! reduced to. Values are immutable once produced and compared structurally,
//! which is what makes two independently converted documents diffable.

use serde::{Deserialize, Serialize};

/// Scalar kinds of the canonical type model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarKind {
    /// Boolean value
    Bool,
    /// Freeform string (also covers `password` and common string formats
    /// without a dedicated kind: email, ipv4, ipv6, hostname)
    String,
    /// Integer without a declared width
    Int,
    /// 32-bit signed integer (`format: int32`)
    Int32,
    /// 64-bit signed integer (`format: int64`)
    Int64,
    /// 32-bit unsigned integer (extended `format: uint32`)
    UInt32,
    /// 64-bit unsigned integer (extended `format: uint64`)
    UInt64,
    /// 32-bit floating point (`format: float`)
    Float,
    /// 64-bit floating point (`format: double` or undeclared)
    Double,
    /// Date or date-time value
    Date,
    /// Binary data (`format: byte` or `format: binary`)
    Data,
    /// UUID string (`format: uuid`)
    Uuid,
    /// URL string (`format: uri`, `uri-reference` or `uri-template`)
    Url,
}

/// A named property of a canonical object type.
///
/// Property order is the insertion order of the source schema and is
/// preserved for stable serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeProperty {
    /// Property name as declared in the source schema
    pub name: String,
    /// Converted property type
    #[serde(rename = "type")]
    pub ty: CanonicalType,
}

impl TypeProperty {
    /// Create a new property.
    pub fn new(name: impl Into<String>, ty: CanonicalType) -> Self {
        TypeProperty {
            name: name.into(),
            ty,
        }
    }
}

/// The canonical type model.
///
/// A closed set of variants: every OAS schema is reduced to one of these.
/// Object and enum variants carry a name which serves as their stable
/// identity key in the deduplicated type store of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalType {
    /// A scalar value
    Scalar(ScalarKind),
    /// A string-backed enumeration
    #[serde(rename_all = "camelCase")]
    Enum {
        /// Stable identity key
        name: String,
        /// Raw value kind of the enumeration (only strings are supported)
        raw_kind: ScalarKind,
        /// Enumeration cases in declaration order
        cases: Vec<String>,
    },
    /// A named object with ordered properties
    Object {
        /// Stable identity key
        name: String,
        /// Properties in source insertion order
        properties: Vec<TypeProperty>,
    },
    /// An array of a single element type
    Repeated {
        /// Element type
        element: Box<CanonicalType>,
    },
    /// An optional wrapper around another type
    Optional {
        /// Wrapped type
        wrapped: Box<CanonicalType>,
    },
}

/// Name of the canonical empty-object marker.
pub const EMPTY_OBJECT_NAME: &str = "Empty";
/// Name of the object substituted when a reference cycle is terminated.
pub const RECURSION_TERMINATOR_NAME: &str = "RecursionTerminator";
/// Name of the object substituted for schemas that cannot be converted
/// (`not` schemas).
pub const ERROR_MARKER_NAME: &str = "ConversionError";

impl CanonicalType {
    /// The single canonical value representing any schema without usable
    /// property information.
    pub fn empty_object() -> CanonicalType {
        CanonicalType::Object {
            name: EMPTY_OBJECT_NAME.to_string(),
            properties: Vec::new(),
        }
    }

    /// The value substituted for the repeated occurrence of a reference on
    /// the dereference path, guaranteeing termination on cyclic graphs.
    pub fn recursion_terminator() -> CanonicalType {
        CanonicalType::Object {
            name: RECURSION_TERMINATOR_NAME.to_string(),
            properties: Vec::new(),
        }
    }

    /// The value substituted for schemas with no canonical representation.
    pub fn error_marker() -> CanonicalType {
        CanonicalType::Object {
            name: ERROR_MARKER_NAME.to_string(),
            properties: Vec::new(),
        }
    }

    /// Create a named object type.
    pub fn object(name: impl Into<String>, properties: Vec<TypeProperty>) -> CanonicalType {
        CanonicalType::Object {
            name: name.into(),
            properties,
        }
    }

    /// Create a scalar type.
    pub fn scalar(kind: ScalarKind) -> CanonicalType {
        CanonicalType::Scalar(kind)
    }

    /// Wrap a type in `Optional`. Already-optional types are left unchanged.
    pub fn optional(self) -> CanonicalType {
        if self.is_optional() {
            return self;
        }
        CanonicalType::Optional {
            wrapped: Box::new(self),
        }
    }

    /// Wrap an element type in `Repeated`.
    pub fn repeated(element: CanonicalType) -> CanonicalType {
        CanonicalType::Repeated {
            element: Box::new(element),
        }
    }

    /// Whether this is the `Optional` variant.
    pub fn is_optional(&self) -> bool {
        matches!(self, CanonicalType::Optional { .. })
    }

    /// Whether this equals the canonical empty-object marker.
    pub fn is_empty_object(&self) -> bool {
        *self == CanonicalType::empty_object()
    }

    /// Remove a single `Optional` wrapper, if present.
    pub fn unwrapped(self) -> CanonicalType {
        match self {
            CanonicalType::Optional { wrapped } => *wrapped,
            other => other,
        }
    }

    /// The identity name of this type, for object and enum variants.
    pub fn name(&self) -> Option<&str> {
        match self {
            CanonicalType::Enum { name, .. } | CanonicalType::Object { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether the recursion terminator occurs anywhere within this type.
    ///
    /// Recursive schema graphs produce entry-point-dependent shapes for the
    /// same type name; the type store uses this to distinguish those from
    /// genuine naming collisions.
    pub fn contains_recursion_terminator(&self) -> bool {
        match self {
            CanonicalType::Scalar(_) | CanonicalType::Enum { .. } => false,
            CanonicalType::Object { name, properties } => {
                name == RECURSION_TERMINATOR_NAME
                    || properties
                        .iter()
                        .any(|p| p.ty.contains_recursion_terminator())
            }
            CanonicalType::Repeated { element } => element.contains_recursion_terminator(),
            CanonicalType::Optional { wrapped } => wrapped.contains_recursion_terminator(),
        }
    }
}
