use api_delta_sdk::models::{
    ApiDocument, CanonicalType, CommunicationPattern, Endpoint, HttpInformation, HttpOperation,
    HttpProtocol, Parameter, ParameterKind, ScalarKind, ServiceInformation, Version,
};
use api_delta_sdk::{ConversionError, DocumentConverter, parse_openapi};
use pretty_assertions::assert_eq;

fn endpoint(
    id: &str,
    operation: HttpOperation,
    parameters: Vec<Parameter>,
    response: CanonicalType,
) -> Endpoint {
    Endpoint {
        handler_name: id.to_string(),
        delta_identifier: id.to_string(),
        operation,
        communication_pattern: CommunicationPattern::RequestResponse,
        absolute_path: "/test".to_string(),
        parameters,
        response,
        errors: Vec::new(),
    }
}

#[test]
fn test_simple_document_conversion() {
    let document = parse_openapi(
        r##"{
            "openapi": "3.0.1",
            "info": {"title": "TestService", "version": "1.0.0"},
            "servers": [{"url": "http://example.de"}],
            "paths": {
                "/test": {
                    "get": {
                        "operationId": "hello-world",
                        "parameters": [
                            {
                                "name": "name",
                                "in": "query",
                                "required": true,
                                "schema": {"type": "string"}
                            },
                            {"$ref": "#/components/parameters/age_param"}
                        ],
                        "responses": {}
                    },
                    "put": {
                        "parameters": [
                            {
                                "name": "param0",
                                "in": "header",
                                "content": {
                                    "application/json": {"schema": {"type": "boolean"}}
                                }
                            },
                            {
                                "name": "param1",
                                "in": "cookie",
                                "content": {
                                    "application/xml": {"schema": {}}
                                }
                            },
                            {
                                "name": "param2",
                                "in": "query",
                                "required": true,
                                "content": {}
                            }
                        ],
                        "responses": {}
                    },
                    "post": {
                        "requestBody": {"content": {}, "required": true},
                        "responses": {
                            "200": {"description": "Description"}
                        }
                    },
                    "delete": {
                        "operationId": "some-delete",
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {"type": "string", "nullable": true}
                                }
                            },
                            "required": true
                        },
                        "responses": {
                            "200": {
                                "description": "Description",
                                "content": {
                                    "application/json": {"schema": {"type": "string"}}
                                }
                            }
                        }
                    },
                    "patch": {"operationId": "ignored-test-vector", "responses": {}},
                    "trace": {"responses": {}}
                }
            },
            "components": {
                "parameters": {
                    "age_param": {
                        "name": "age",
                        "in": "path",
                        "required": true,
                        "schema": {"type": "integer"}
                    }
                }
            }
        }"##,
    )
    .unwrap();

    let output = DocumentConverter::new(&document).convert().unwrap();

    let service = ServiceInformation::new(
        Version::default(),
        HttpInformation::new(HttpProtocol::Http, "example.de", 80),
    );
    let mut expected = ApiDocument::new(service);

    expected
        .add_endpoint(endpoint(
            "hello-world",
            HttpOperation::Read,
            vec![
                Parameter::new(
                    "name",
                    CanonicalType::scalar(ScalarKind::String),
                    ParameterKind::Lightweight,
                    true,
                ),
                Parameter::new(
                    "age",
                    CanonicalType::scalar(ScalarKind::Int),
                    ParameterKind::Path,
                    true,
                ),
            ],
            CanonicalType::empty_object(),
        ))
        .unwrap();

    expected
        .add_endpoint(endpoint(
            "test_put",
            HttpOperation::Update,
            vec![
                Parameter::new(
                    "param0",
                    CanonicalType::scalar(ScalarKind::Bool),
                    ParameterKind::Lightweight,
                    false,
                ),
                Parameter::new(
                    "param1",
                    CanonicalType::empty_object(),
                    ParameterKind::Lightweight,
                    false,
                ),
                Parameter::new(
                    "param2",
                    CanonicalType::empty_object(),
                    ParameterKind::Lightweight,
                    true,
                ),
            ],
            CanonicalType::empty_object(),
        ))
        .unwrap();

    expected
        .add_endpoint(endpoint(
            "test_post",
            HttpOperation::Create,
            vec![Parameter::new(
                Parameter::REQUEST_BODY_NAME,
                CanonicalType::object("test_post#_requestBody", Vec::new()),
                ParameterKind::Content,
                true,
            )],
            CanonicalType::empty_object(),
        ))
        .unwrap();

    expected
        .add_endpoint(endpoint(
            "some-delete",
            HttpOperation::Delete,
            vec![Parameter::new(
                Parameter::REQUEST_BODY_NAME,
                CanonicalType::scalar(ScalarKind::String),
                ParameterKind::Content,
                false,
            )],
            CanonicalType::scalar(ScalarKind::String),
        ))
        .unwrap();

    assert_eq!(output.document, expected);
    assert!(output.document.types.contains("Empty"));
    assert!(output.document.types.contains("test_post#_requestBody"));
    assert_eq!(output.document.type_count_excluding_markers(), 2);
}

#[test]
fn test_defaulted_service_information() {
    let document = parse_openapi(
        r##"{
            "openapi": "3.0.1",
            "info": {"title": "TestService", "version": "SomeVersion"},
            "paths": {"/test": {}}
        }"##,
    )
    .unwrap();

    let output = DocumentConverter::new(&document).convert().unwrap();

    let expected = ApiDocument::new(ServiceInformation::new(
        Version::default(),
        HttpInformation::default(),
    ));
    assert_eq!(output.document, expected);
    assert!(output.document.endpoints.is_empty());
}

#[test]
fn test_https_server_with_default_port() {
    let document = parse_openapi(
        r##"{
            "openapi": "3.0.1",
            "info": {"title": "TestService", "version": "2.3.4"},
            "servers": [{"url": "https://api.example.org/v2"}],
            "paths": {}
        }"##,
    )
    .unwrap();

    let output = DocumentConverter::new(&document).convert().unwrap();

    assert_eq!(output.document.service.version, Version::new(2, 3, 4));
    assert_eq!(
        output.document.service.http,
        HttpInformation::new(HttpProtocol::Https, "api.example.org", 443)
    );
}

#[test]
fn test_path_item_references_are_skipped() {
    let document = parse_openapi(
        r##"{
            "openapi": "3.0.1",
            "info": {"title": "TestService", "version": "1.0.0"},
            "paths": {"/test": {"$ref": "#/components/pathItems/test"}}
        }"##,
    )
    .unwrap();

    let output = DocumentConverter::new(&document).convert().unwrap();
    assert!(output.document.endpoints.is_empty());
}

#[test]
fn test_stats_are_collected_per_conversion() {
    let content = r##"{
        "openapi": "3.0.1",
        "info": {"title": "TestService", "version": "1.0.0"},
        "paths": {
            "/test": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "oneOf": [
                                            {"type": "string"},
                                            {"type": "integer"},
                                            {"type": "boolean"}
                                        ]
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "requestBody": {
                        "content": {
                            "application/json": {
                                "schema": {"not": {"type": "string"}}
                            }
                        },
                        "required": true
                    },
                    "responses": {}
                }
            }
        }
    }"##;

    let document = parse_openapi(content).unwrap();
    let output = DocumentConverter::new(&document).convert().unwrap();

    assert_eq!(output.stats.one_of_encounters, vec![3]);
    assert_eq!(output.stats.missed_one_of_sub_schemas(), 2);
    assert_eq!(output.stats.not_encounters, 1);
    assert_eq!(output.stats.terminated_cyclic_references, 0);

    // conversions share no state, a second run is identical
    let second = DocumentConverter::new(&document).convert().unwrap();
    assert_eq!(second.document, output.document);
    assert_eq!(second.stats, output.stats);
}

#[test]
fn test_colliding_type_names_are_rejected() {
    let document = parse_openapi(
        r##"{
            "openapi": "3.0.1",
            "info": {"title": "TestService", "version": "1.0.0"},
            "paths": {
                "/test": {
                    "get": {
                        "operationId": "op",
                        "parameters": [
                            {
                                "name": "a",
                                "in": "query",
                                "required": true,
                                "schema": {
                                    "type": "object",
                                    "properties": {"x": {"type": "string"}},
                                    "required": ["x"]
                                }
                            }
                        ],
                        "responses": {}
                    },
                    "put": {
                        "operationId": "op",
                        "parameters": [
                            {
                                "name": "a",
                                "in": "query",
                                "required": true,
                                "schema": {
                                    "type": "object",
                                    "properties": {"y": {"type": "integer"}},
                                    "required": ["y"]
                                }
                            }
                        ],
                        "responses": {}
                    }
                }
            }
        }"##,
    )
    .unwrap();

    let err = DocumentConverter::new(&document).convert().unwrap_err();
    let ConversionError::NameCollision(collision) = err else {
        panic!("expected a name collision, got {err:?}")
    };
    assert_eq!(collision.name, "op#a");
}
