//! Route conversion
//!
//! Turns one OAS path item into canonical endpoints, one per supported HTTP
//! operation. GET, PUT, POST and DELETE map onto the read, update, create
//! and delete operations; OPTIONS, HEAD, PATCH and TRACE have no canonical
//! representation and are skipped with a log entry.

use indexmap::IndexMap;
use openapiv3::{
    Components, MediaType, Operation, Parameter as OasParameter, ParameterSchemaOrContent,
    PathItem, ReferenceOr, Response, Responses, Schema, StatusCode,
};
use tracing::{debug, warn};

use super::ConversionError;
use super::schema::SchemaConverter;
use crate::models::{
    ApiDocument, CanonicalType, CommunicationPattern, Endpoint, HttpOperation, Parameter,
    ParameterKind,
};

const PARAMETER_REFERENCE_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODY_REFERENCE_PREFIX: &str = "#/components/requestBodies/";
const RESPONSE_REFERENCE_PREFIX: &str = "#/components/responses/";

// see https://en.wikipedia.org/wiki/List_of_HTTP_status_codes#2xx_success
const SUCCESS_CODES: [u16; 8] = [200, 201, 202, 204, 205, 206, 207, 208];

/// Converts a single OAS path item into [`Endpoint`]s of an [`ApiDocument`].
pub struct RouteConverter<'a> {
    path: &'a str,
    item: &'a PathItem,
    components: &'a Components,
}

impl<'a> RouteConverter<'a> {
    /// Create a converter for one path item.
    pub fn new(path: &'a str, item: &'a PathItem, components: &'a Components) -> Self {
        RouteConverter {
            path,
            item,
            components,
        }
    }

    /// Convert every supported operation of the path item and add the
    /// resulting endpoints to the document.
    pub fn convert(
        &self,
        schemas: &mut SchemaConverter<'_>,
        document: &mut ApiDocument,
    ) -> Result<(), ConversionError> {
        self.convert_operation(self.item.get.as_ref(), HttpOperation::Read, schemas, document)?;
        self.convert_operation(
            self.item.put.as_ref(),
            HttpOperation::Update,
            schemas,
            document,
        )?;
        self.convert_operation(
            self.item.post.as_ref(),
            HttpOperation::Create,
            schemas,
            document,
        )?;
        self.convert_operation(
            self.item.delete.as_ref(),
            HttpOperation::Delete,
            schemas,
            document,
        )?;

        self.report_unsupported(self.item.options.as_ref(), "OPTIONS");
        self.report_unsupported(self.item.head.as_ref(), "HEAD");
        self.report_unsupported(self.item.patch.as_ref(), "PATCH");
        self.report_unsupported(self.item.trace.as_ref(), "TRACE");

        Ok(())
    }

    fn convert_operation(
        &self,
        operation: Option<&Operation>,
        kind: HttpOperation,
        schemas: &mut SchemaConverter<'_>,
        document: &mut ApiDocument,
    ) -> Result<(), ConversionError> {
        let Some(operation) = operation else {
            return Ok(());
        };

        // the endpoint name is derived from path and method if unspecified
        let operation_id = operation.operation_id.clone().unwrap_or_else(|| {
            format!(
                "{}_{}",
                path_identifier(self.path),
                kind.http_method().to_lowercase()
            )
        });

        let mut parameters = Vec::new();
        for parameter in self.item.parameters.iter().chain(&operation.parameters) {
            let parameter = resolve(
                &self.components.parameters,
                PARAMETER_REFERENCE_PREFIX,
                parameter,
            )?;
            parameters.push(self.convert_parameter(parameter, &operation_id, schemas)?);
        }

        if let Some(body) = &operation.request_body {
            parameters.push(self.convert_request_body(body, &operation_id, schemas)?);
        }

        let response = self.convert_response(operation, &operation_id, schemas)?;

        let endpoint = Endpoint {
            handler_name: operation_id.clone(),
            delta_identifier: operation_id.clone(),
            operation: kind,
            communication_pattern: CommunicationPattern::RequestResponse,
            absolute_path: self.path.to_string(),
            parameters,
            response,
            errors: Vec::new(),
        };

        debug!(
            "Operation {} {}#{} was converted to an endpoint.",
            kind.http_method(),
            self.path,
            operation_id
        );
        document.add_endpoint(endpoint)?;
        Ok(())
    }

    fn convert_parameter(
        &self,
        parameter: &OasParameter,
        operation_id: &str,
        schemas: &mut SchemaConverter<'_>,
    ) -> Result<Parameter, ConversionError> {
        // header and cookie parameters are kept as lightweight parameters so
        // their presence stays comparable
        let (data, kind, required) = match parameter {
            OasParameter::Query { parameter_data, .. }
            | OasParameter::Header { parameter_data, .. }
            | OasParameter::Cookie { parameter_data, .. } => (
                parameter_data,
                ParameterKind::Lightweight,
                parameter_data.required,
            ),
            OasParameter::Path { parameter_data, .. } => {
                (parameter_data, ParameterKind::Path, true)
            }
        };

        let fallback = format!("{operation_id}#{}", data.name);
        let ty = match &data.format {
            ParameterSchemaOrContent::Schema(schema) => schemas.convert(schema, &fallback)?,
            ParameterSchemaOrContent::Content(content) => {
                match json_or_first_content_schema(content) {
                    Some(schema) => schemas.convert(schema, &fallback)?,
                    None => {
                        warn!(
                            "Parameter '{}' of {} doesn't define a usable content type. \
                             Falling back to the empty type.",
                            data.name, operation_id
                        );
                        CanonicalType::empty_object()
                    }
                }
            }
        };

        Ok(Parameter::new(&data.name, ty, kind, required))
    }

    fn convert_request_body(
        &self,
        body: &ReferenceOr<openapiv3::RequestBody>,
        operation_id: &str,
        schemas: &mut SchemaConverter<'_>,
    ) -> Result<Parameter, ConversionError> {
        let body = resolve(
            &self.components.request_bodies,
            REQUEST_BODY_REFERENCE_PREFIX,
            body,
        )?;

        let name = Parameter::REQUEST_BODY_NAME;
        let fallback = format!("{operation_id}#{name}");

        let mut ty = match json_or_first_content_schema(&body.content) {
            Some(schema) => schemas.convert(schema, &fallback)?,
            None => {
                warn!(
                    "Request body '{}' of {} doesn't define a usable content type. \
                     Falling back to the empty type.",
                    name, operation_id
                );
                CanonicalType::empty_object()
            }
        };

        // body-level and schema-level optionality fold into one flag
        let optional = !body.required || ty.is_optional();
        if ty.is_optional() {
            ty = ty.unwrapped();
        }

        if ty.is_empty_object() {
            // Models are matched by name. Re-tagging the empty body with its
            // synthesized name lets properties added later still match.
            ty = CanonicalType::object(fallback, Vec::new());
        }

        Ok(Parameter::new(name, ty, ParameterKind::Content, !optional))
    }

    fn convert_response(
        &self,
        operation: &Operation,
        operation_id: &str,
        schemas: &mut SchemaConverter<'_>,
    ) -> Result<CanonicalType, ConversionError> {
        // only a single response can be documented, the first declared 2xx
        // success code wins
        let Some(entry) = first_success_response(&operation.responses) else {
            warn!(
                "{} doesn't declare a response for any 2xx success status code. \
                 Falling back to the empty type.",
                operation_id
            );
            return Ok(CanonicalType::empty_object());
        };

        let response = resolve(&self.components.responses, RESPONSE_REFERENCE_PREFIX, entry)?;

        let Some(schema) = json_or_first_content_schema(&response.content) else {
            warn!(
                "Response of {} doesn't define a usable content type. \
                 Falling back to the empty type.",
                operation_id
            );
            return Ok(CanonicalType::empty_object());
        };

        schemas.convert(schema, &format!("{operation_id}#_Response"))
    }

    fn report_unsupported(&self, operation: Option<&Operation>, method: &str) {
        if let Some(operation) = operation {
            let operation_id = operation.operation_id.as_deref().unwrap_or("UNKNOWN");
            debug!(
                "Ignoring operation {} {}#{} as it cannot be represented in the \
                 converted document.",
                method, self.path, operation_id
            );
        }
    }
}

/// Resolve a component reference, following chained references within the
/// same section. The hop count is bounded by the section size, so reference
/// cycles surface as unresolvable instead of looping.
fn resolve<'t, T>(
    section: &'t IndexMap<String, ReferenceOr<T>>,
    prefix: &str,
    entry: &'t ReferenceOr<T>,
) -> Result<&'t T, ConversionError> {
    let mut current = entry;
    let mut hops = 0;

    loop {
        match current {
            ReferenceOr::Item(value) => return Ok(value),
            ReferenceOr::Reference { reference } => {
                let unresolved = || ConversionError::UnresolvedReference {
                    reference: reference.clone(),
                };

                hops += 1;
                if hops > section.len() {
                    return Err(unresolved());
                }
                let name = reference.strip_prefix(prefix).ok_or_else(unresolved)?;
                current = section.get(name).ok_or_else(unresolved)?;
            }
        }
    }
}

/// The schema of the `application/json` entry of a content map, or of an
/// arbitrary first entry when no JSON content is declared.
fn json_or_first_content_schema(
    content: &IndexMap<String, MediaType>,
) -> Option<&ReferenceOr<Schema>> {
    content
        .get("application/json")
        .or_else(|| content.values().next())
        .and_then(|media| media.schema.as_ref())
}

fn first_success_response(responses: &Responses) -> Option<&ReferenceOr<Response>> {
    SUCCESS_CODES
        .iter()
        .find_map(|code| responses.responses.get(&StatusCode::Code(*code)))
}

/// Derive a deterministic identifier from a path template: the first
/// segment lower-cased, every further segment lower-cased with its first
/// character raised.
pub(crate) fn path_identifier(path: &str) -> String {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    let Some(first) = segments.next() else {
        return String::new();
    };

    let mut identifier = first.to_lowercase();
    for segment in segments {
        identifier.push_str(&upper_first(&segment.to_lowercase()));
    }
    identifier
}

fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_path_identifier() {
        assert_eq!(path_identifier("/test"), "test");
        assert_eq!(path_identifier("/Pets/{petId}/Toys"), "pets{petid}Toys");
        assert_eq!(path_identifier("/user/login"), "userLogin");
        assert_eq!(path_identifier("/"), "");
    }

    #[test]
    fn test_first_success_response_order() {
        let responses: Responses = serde_json::from_value(serde_json::json!({
            "204": { "description": "no content" },
            "201": { "description": "created" }
        }))
        .unwrap();

        let entry = first_success_response(&responses).unwrap();
        let ReferenceOr::Item(response) = entry else {
            panic!("expected an inline response")
        };
        assert_eq!(response.description, "created");
    }
}
