//! Converted document model
//!
//! The final output of a conversion: service metadata, the ordered endpoint
//! list and the deduplicated, name-keyed type store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::endpoint::Endpoint;
use super::service::ServiceInformation;
use super::type_model::CanonicalType;

/// Error raised when two structurally different types claim the same name
/// in a type store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("conflicting definitions for type name '{name}'")]
pub struct TypeNameCollision {
    /// The contested type name
    pub name: String,
}

/// Name-keyed store of the named types reachable from a document's
/// endpoints.
///
/// Every named object and enum type appears exactly once, keyed by its
/// identity name. Inserting a structurally different value under an existing
/// name is a collision, with one exception: shapes that contain the
/// recursion terminator legitimately differ depending on where the
/// conversion entered a cyclic reference graph, so the first-inserted value
/// wins and the mismatch is only logged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeStore {
    types: IndexMap<String, CanonicalType>,
}

impl TypeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        TypeStore::default()
    }

    /// Insert a named type, enforcing the structural-equality invariant.
    pub fn insert(&mut self, name: &str, ty: CanonicalType) -> Result<(), TypeNameCollision> {
        match self.types.get(name) {
            None => {
                self.types.insert(name.to_string(), ty);
                Ok(())
            }
            Some(existing) if *existing == ty => Ok(()),
            Some(existing) => {
                if existing.contains_recursion_terminator() || ty.contains_recursion_terminator() {
                    warn!(
                        "Type '{}' was converted with differing shapes due to a terminated \
                         reference cycle; keeping the first encountered shape.",
                        name
                    );
                    return Ok(());
                }
                Err(TypeNameCollision {
                    name: name.to_string(),
                })
            }
        }
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<&CanonicalType> {
        self.types.get(name)
    }

    /// Whether a name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of stored types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over `(name, type)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CanonicalType)> {
        self.types.iter()
    }
}

/// The canonical, comparison-friendly representation of an API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    /// Service-level metadata
    pub service: ServiceInformation,
    /// Endpoints in conversion order
    pub endpoints: Vec<Endpoint>,
    /// Deduplicated named types reachable from the endpoints
    pub types: TypeStore,
}

impl ApiDocument {
    /// Create a document with no endpoints.
    pub fn new(service: ServiceInformation) -> Self {
        ApiDocument {
            service,
            endpoints: Vec::new(),
            types: TypeStore::new(),
        }
    }

    /// Add an endpoint, folding every named type reachable from its
    /// parameters and response into the type store.
    pub fn add_endpoint(&mut self, endpoint: Endpoint) -> Result<(), TypeNameCollision> {
        for parameter in &endpoint.parameters {
            register_named_types(&parameter.ty, &mut self.types)?;
        }
        register_named_types(&endpoint.response, &mut self.types)?;

        self.endpoints.push(endpoint);
        Ok(())
    }

    /// Number of stored types, excluding the marker types substituted for
    /// unconvertible schemas and terminated cycles.
    pub fn type_count_excluding_markers(&self) -> usize {
        use super::type_model::{ERROR_MARKER_NAME, RECURSION_TERMINATOR_NAME};

        self.types
            .iter()
            .filter(|(name, _)| {
                name.as_str() != ERROR_MARKER_NAME && name.as_str() != RECURSION_TERMINATOR_NAME
            })
            .count()
    }
}

fn register_named_types(
    ty: &CanonicalType,
    store: &mut TypeStore,
) -> Result<(), TypeNameCollision> {
    match ty {
        CanonicalType::Scalar(_) => Ok(()),
        CanonicalType::Enum { name, .. } => store.insert(name, ty.clone()),
        CanonicalType::Object { name, properties } => {
            store.insert(name, ty.clone())?;
            for property in properties {
                register_named_types(&property.ty, store)?;
            }
            Ok(())
        }
        CanonicalType::Repeated { element } => register_named_types(element, store),
        CanonicalType::Optional { wrapped } => register_named_types(wrapped, store),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::type_model::{ScalarKind, TypeProperty};

    fn person() -> CanonicalType {
        CanonicalType::object(
            "Person",
            vec![TypeProperty::new(
                "name",
                CanonicalType::scalar(ScalarKind::String),
            )],
        )
    }

    #[test]
    fn test_insert_same_value_twice() {
        let mut store = TypeStore::new();
        store.insert("Person", person()).unwrap();
        store.insert("Person", person()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_collision() {
        let mut store = TypeStore::new();
        store.insert("Person", person()).unwrap();
        let err = store
            .insert("Person", CanonicalType::object("Person", Vec::new()))
            .unwrap_err();
        assert_eq!(err.name, "Person");
    }

    #[test]
    fn test_insert_recursion_shape_keeps_first() {
        let mut store = TypeStore::new();
        store.insert("Person", person()).unwrap();

        let truncated = CanonicalType::object(
            "Person",
            vec![TypeProperty::new(
                "name",
                CanonicalType::recursion_terminator(),
            )],
        );
        store.insert("Person", truncated).unwrap();
        assert_eq!(store.get("Person"), Some(&person()));
    }

    #[test]
    fn test_register_nested_types() {
        let nested = CanonicalType::object(
            "Outer",
            vec![TypeProperty::new(
                "inner",
                CanonicalType::repeated(person()).optional(),
            )],
        );

        let mut document = ApiDocument::new(ServiceInformation::new(
            crate::models::Version::default(),
            crate::models::HttpInformation::default(),
        ));
        document
            .add_endpoint(Endpoint {
                handler_name: "test".to_string(),
                delta_identifier: "test".to_string(),
                operation: crate::models::HttpOperation::Read,
                communication_pattern: crate::models::CommunicationPattern::RequestResponse,
                absolute_path: "/test".to_string(),
                parameters: Vec::new(),
                response: nested,
                errors: Vec::new(),
            })
            .unwrap();

        assert!(document.types.contains("Outer"));
        assert!(document.types.contains("Person"));
        assert_eq!(document.types.len(), 2);
    }

    #[test]
    fn test_type_count_excluding_markers() {
        let mut store = TypeStore::new();
        store.insert("Person", person()).unwrap();
        store
            .insert(
                crate::models::type_model::RECURSION_TERMINATOR_NAME,
                CanonicalType::recursion_terminator(),
            )
            .unwrap();

        let document = ApiDocument {
            service: ServiceInformation::new(
                crate::models::Version::default(),
                crate::models::HttpInformation::default(),
            ),
            endpoints: Vec::new(),
            types: store,
        };
        assert_eq!(document.type_count_excluding_markers(), 1);
    }
}
