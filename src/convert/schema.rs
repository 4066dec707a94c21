//! Schema conversion engine
//!
//! Reduces `openapiv3` schemas to the canonical type model. The conversion
//! is deliberately lossy (validation keywords, documentation and most
//! annotations are dropped) but deterministic, so two converted documents
//! stay comparable.
//!
//! Constructs without a canonical representation degrade in place:
//! `oneOf`/`anyOf` keep only their first branch, `not` becomes the error
//! marker and cyclic reference chains are broken with the recursion
//! terminator. Every degradation is logged and counted in
//! [`ConversionStats`].

use openapiv3::{
    AnySchema, ArrayType, Components, IntegerFormat, IntegerType, NumberFormat, NumberType,
    ObjectType, ReferenceOr, Schema, SchemaKind, StringFormat, StringType, Type,
    VariantOrUnknownOrEmpty,
};
use tracing::{debug, error, warn};

use super::ConversionError;
use super::stats::ConversionStats;
use crate::models::{CanonicalType, ScalarKind, TypeProperty};

const SCHEMA_REFERENCE_PREFIX: &str = "#/components/schemas/";

/// Converts `openapiv3` schemas to [`CanonicalType`] values.
///
/// One converter instance serves one document conversion: it holds the
/// read-only components table for reference lookup, the in-flight
/// dereference path for cycle detection and the stats accumulated so far.
/// Independent instances share no mutable state and may run in parallel.
pub struct SchemaConverter<'a> {
    components: &'a Components,
    dereference_path: Vec<String>,
    stats: ConversionStats,
}

impl<'a> SchemaConverter<'a> {
    /// Create a converter resolving references against the given components.
    pub fn new(components: &'a Components) -> Self {
        SchemaConverter {
            components,
            dereference_path: Vec::new(),
            stats: ConversionStats::new(),
        }
    }

    /// Convert a potentially referenced schema.
    ///
    /// `fallback_name` names the result when no reference provides a real
    /// name, and prefixes the synthesized names of anonymous nested types.
    pub fn convert(
        &mut self,
        schema: &ReferenceOr<Schema>,
        fallback_name: &str,
    ) -> Result<CanonicalType, ConversionError> {
        self.convert_node(schema, fallback_name, true)
    }

    /// The stats collected so far.
    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// Consume the converter and return the collected stats.
    pub fn into_stats(self) -> ConversionStats {
        self.stats
    }

    fn convert_node(
        &mut self,
        schema: &ReferenceOr<Schema>,
        fallback_name: &str,
        required: bool,
    ) -> Result<CanonicalType, ConversionError> {
        match schema {
            ReferenceOr::Reference { reference } => self.convert_reference(reference, required),
            ReferenceOr::Item(schema) => self.convert_schema(schema, fallback_name, required),
        }
    }

    fn convert_boxed(
        &mut self,
        schema: &ReferenceOr<Box<Schema>>,
        fallback_name: &str,
        required: bool,
    ) -> Result<CanonicalType, ConversionError> {
        match schema {
            ReferenceOr::Reference { reference } => self.convert_reference(reference, required),
            ReferenceOr::Item(schema) => self.convert_schema(schema, fallback_name, required),
        }
    }

    /// Resolve a schema reference and convert its target, named after the
    /// referenced component.
    ///
    /// The in-flight reference names form the dereference path. Re-entering
    /// a name already on the path means the reference graph is cyclic; the
    /// chain is broken with the recursion terminator so the walk stays
    /// finite.
    fn convert_reference(
        &mut self,
        reference: &str,
        required: bool,
    ) -> Result<CanonicalType, ConversionError> {
        let unresolved = || ConversionError::UnresolvedReference {
            reference: reference.to_string(),
        };

        let name = reference
            .strip_prefix(SCHEMA_REFERENCE_PREFIX)
            .ok_or_else(unresolved)?;
        let components: &'a Components = self.components;
        let target = components.schemas.get(name).ok_or_else(unresolved)?;

        if self.dereference_path.iter().any(|entry| entry == name) {
            warn!(
                "Encountered recursive type definition for '{}' with dereference path {:?}. \
                 Breaking the chain with the recursion terminator.",
                name, self.dereference_path
            );
            self.stats.terminated_cyclic_references += 1;
            return Ok(CanonicalType::recursion_terminator());
        }

        self.dereference_path.push(name.to_string());
        let result = self.convert_node(target, name, required);
        let popped = self.dereference_path.pop();
        debug_assert_eq!(popped.as_deref(), Some(name));

        result
    }

    fn convert_schema(
        &mut self,
        schema: &Schema,
        object_name: &str,
        required: bool,
    ) -> Result<CanonicalType, ConversionError> {
        let converted = match &schema.schema_kind {
            SchemaKind::Type(ty) => self.convert_type(ty, object_name)?,
            SchemaKind::AllOf { all_of } => self.convert_all_of(all_of, object_name)?,
            SchemaKind::OneOf { one_of } => {
                self.stats.one_of_encounters.push(one_of.len());
                self.convert_first_branch(one_of, "oneOf", object_name)?
            }
            SchemaKind::AnyOf { any_of } => {
                self.stats.any_of_encounters.push(any_of.len());
                self.convert_first_branch(any_of, "anyOf", object_name)?
            }
            SchemaKind::Not { .. } => {
                self.stats.not_encounters += 1;
                error!(
                    "Encountered unsupported 'not' schema within '{}'; substituting the error \
                     marker type.",
                    object_name
                );
                CanonicalType::error_marker()
            }
            SchemaKind::Any(any) => self.convert_any(any, object_name)?,
        };

        let data = &schema.schema_data;
        if !required || data.nullable || data.default.is_some() {
            return Ok(converted.optional());
        }
        Ok(converted)
    }

    fn convert_type(
        &mut self,
        ty: &Type,
        object_name: &str,
    ) -> Result<CanonicalType, ConversionError> {
        let converted = match ty {
            Type::Boolean { .. } => CanonicalType::scalar(ScalarKind::Bool),
            Type::Number(number) => convert_number(number),
            Type::Integer(integer) => convert_integer(integer),
            Type::String(string) => convert_string(string, object_name),
            Type::Object(object) => self.convert_object(object, object_name)?,
            Type::Array(array) => self.convert_array(array, object_name)?,
        };
        Ok(converted)
    }

    fn convert_object(
        &mut self,
        object: &ObjectType,
        object_name: &str,
    ) -> Result<CanonicalType, ConversionError> {
        let properties =
            self.convert_properties(&object.properties, &object.required, object_name)?;

        if properties.is_empty() {
            return Ok(CanonicalType::empty_object());
        }
        Ok(CanonicalType::object(object_name, properties))
    }

    fn convert_properties(
        &mut self,
        properties: &indexmap::IndexMap<String, ReferenceOr<Box<Schema>>>,
        required: &[String],
        object_name: &str,
    ) -> Result<Vec<TypeProperty>, ConversionError> {
        let mut converted = Vec::new();
        for (name, schema) in properties {
            let property_required = required.iter().any(|entry| entry == name);
            let fallback = format!("{object_name}#{name}");
            let ty = self.convert_boxed(schema, &fallback, property_required)?;

            // Some documents list a property as required without giving it a
            // schema; it then shows up as an information-free fragment.
            // Dropping those keeps the model comparable.
            if ty.is_empty_object() {
                continue;
            }
            converted.push(TypeProperty::new(name, ty));
        }
        Ok(converted)
    }

    fn convert_array(
        &mut self,
        array: &ArrayType,
        object_name: &str,
    ) -> Result<CanonicalType, ConversionError> {
        let items = array
            .items
            .as_ref()
            .ok_or_else(|| ConversionError::ArrayWithoutItems {
                location: object_name.to_string(),
            })?;
        let element = self.convert_boxed(items, object_name, true)?;
        Ok(CanonicalType::repeated(element))
    }

    /// Convert an `allOf` by merging the properties of its branches.
    ///
    /// Branches equal to the empty-object marker are dropped. A single
    /// surviving branch is returned unchanged, which lets an `allOf` around
    /// one reference keep the referenced type's real name.
    fn convert_all_of(
        &mut self,
        branches: &[ReferenceOr<Schema>],
        object_name: &str,
    ) -> Result<CanonicalType, ConversionError> {
        if branches.is_empty() {
            return Err(ConversionError::EmptyComposition {
                keyword: "allOf",
                location: object_name.to_string(),
            });
        }

        let mut converted = Vec::new();
        for branch in branches {
            let ty = self.convert_node(branch, object_name, true)?;
            if !ty.is_empty_object() {
                converted.push(ty);
            }
        }

        if converted.is_empty() {
            return Ok(CanonicalType::empty_object());
        }
        if converted.len() == 1 {
            return Ok(converted.remove(0));
        }

        let mut combined = Vec::new();
        for ty in converted {
            match ty {
                CanonicalType::Object { properties, .. } => {
                    combined.extend(properties.into_iter().filter(|p| !p.ty.is_empty_object()));
                }
                _ => {
                    return Err(ConversionError::NonObjectAllOfBranch {
                        location: object_name.to_string(),
                    });
                }
            }
        }
        Ok(CanonicalType::object(object_name, combined))
    }

    /// Convert a `oneOf`/`anyOf` by taking its first branch.
    ///
    /// Neither keyword is representable in the canonical model; the caller
    /// records the branch count so the discarded remainder stays auditable.
    fn convert_first_branch(
        &mut self,
        branches: &[ReferenceOr<Schema>],
        keyword: &'static str,
        object_name: &str,
    ) -> Result<CanonicalType, ConversionError> {
        let first = branches
            .first()
            .ok_or_else(|| ConversionError::EmptyComposition {
                keyword,
                location: object_name.to_string(),
            })?;
        self.convert_node(first, object_name, true)
    }

    /// Untyped schemas with declared properties behave like objects; without
    /// properties they are information-free fragments.
    fn convert_any(
        &mut self,
        any: &AnySchema,
        object_name: &str,
    ) -> Result<CanonicalType, ConversionError> {
        if any.properties.is_empty() {
            return Ok(CanonicalType::empty_object());
        }

        let properties = self.convert_properties(&any.properties, &any.required, object_name)?;
        if properties.is_empty() {
            return Ok(CanonicalType::empty_object());
        }
        Ok(CanonicalType::object(object_name, properties))
    }
}

fn convert_number(number: &NumberType) -> CanonicalType {
    let kind = match &number.format {
        VariantOrUnknownOrEmpty::Item(NumberFormat::Float) => ScalarKind::Float,
        VariantOrUnknownOrEmpty::Item(NumberFormat::Double) | VariantOrUnknownOrEmpty::Empty => {
            ScalarKind::Double
        }
        VariantOrUnknownOrEmpty::Unknown(format) => {
            debug!("Encountered unknown number format '{}'", format);
            ScalarKind::Double
        }
    };
    CanonicalType::scalar(kind)
}

fn convert_integer(integer: &IntegerType) -> CanonicalType {
    let kind = match &integer.format {
        VariantOrUnknownOrEmpty::Item(IntegerFormat::Int32) => ScalarKind::Int32,
        VariantOrUnknownOrEmpty::Item(IntegerFormat::Int64) => ScalarKind::Int64,
        VariantOrUnknownOrEmpty::Empty => ScalarKind::Int,
        VariantOrUnknownOrEmpty::Unknown(format) => match format.as_str() {
            "uint32" => ScalarKind::UInt32,
            "uint64" => ScalarKind::UInt64,
            other => {
                debug!("Encountered unknown integer format '{}'", other);
                ScalarKind::Int
            }
        },
    };
    CanonicalType::scalar(kind)
}

fn convert_string(string: &StringType, object_name: &str) -> CanonicalType {
    if !string.enumeration.is_empty() {
        let cases: Vec<String> = string.enumeration.iter().flatten().cloned().collect();
        return CanonicalType::Enum {
            name: object_name.to_string(),
            raw_kind: ScalarKind::String,
            cases,
        };
    }

    let kind = match &string.format {
        // password is just a UI hint
        VariantOrUnknownOrEmpty::Item(StringFormat::Password) | VariantOrUnknownOrEmpty::Empty => {
            ScalarKind::String
        }
        // mapping to a distinct kind keeps format changes detectable, even
        // though the value may not actually parse as a date
        VariantOrUnknownOrEmpty::Item(StringFormat::Date | StringFormat::DateTime) => {
            ScalarKind::Date
        }
        VariantOrUnknownOrEmpty::Item(StringFormat::Byte | StringFormat::Binary) => {
            ScalarKind::Data
        }
        VariantOrUnknownOrEmpty::Unknown(format) => match format.as_str() {
            "uuid" => ScalarKind::Uuid,
            // "uri-template" is used by github
            "uri" | "uri-reference" | "uri-template" => ScalarKind::Url,
            // also github
            "timestamp" => ScalarKind::Date,
            // common formats without a dedicated kind, no need to log them
            "email" | "ipv4" | "ipv6" | "hostname" => ScalarKind::String,
            other => {
                debug!("Encountered unknown string format '{}'", other);
                ScalarKind::String
            }
        },
    };
    CanonicalType::scalar(kind)
}
