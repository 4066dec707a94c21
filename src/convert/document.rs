//! Document conversion
//!
//! Converts a whole OAS document: service metadata from the `info` and
//! `servers` sections, one endpoint per supported operation of every path
//! item. Conversion is best effort, aimed at change comparison; the result
//! is not a faithful enough rendition to generate client stubs from.

use openapiv3::{Components, OpenAPI, ReferenceOr};
use tracing::warn;
use url::Url;

use super::ConversionError;
use super::route::RouteConverter;
use super::schema::SchemaConverter;
use super::stats::ConversionStats;
use crate::models::{ApiDocument, HttpInformation, HttpProtocol, ServiceInformation, Version};

/// The converted document together with the stats collected while
/// converting it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    /// The canonical document
    pub document: ApiDocument,
    /// Lossy-construct counters for this conversion run
    pub stats: ConversionStats,
}

/// Converts an `openapiv3::OpenAPI` document to an [`ApiDocument`].
pub struct DocumentConverter<'a> {
    document: &'a OpenAPI,
}

impl<'a> DocumentConverter<'a> {
    /// Create a converter for the given document.
    pub fn new(document: &'a OpenAPI) -> Self {
        DocumentConverter { document }
    }

    /// Convert the document.
    ///
    /// Fails only on genuinely malformed input (unresolvable references,
    /// empty compositions, arrays without items, type name collisions);
    /// everything else degrades in place with a logged warning.
    pub fn convert(&self) -> Result<ConversionOutput, ConversionError> {
        let empty_components = Components::default();
        let components = self
            .document
            .components
            .as_ref()
            .unwrap_or(&empty_components);

        let mut schemas = SchemaConverter::new(components);
        let mut document = ApiDocument::new(self.service_information());

        for (path, item) in &self.document.paths.paths {
            let item = match item {
                ReferenceOr::Item(item) => item,
                ReferenceOr::Reference { reference } => {
                    warn!(
                        "Skipping path item '{}': path item references ('{}') are not supported.",
                        path, reference
                    );
                    continue;
                }
            };

            RouteConverter::new(path, item, components).convert(&mut schemas, &mut document)?;
        }

        Ok(ConversionOutput {
            document,
            stats: schemas.into_stats(),
        })
    }

    fn service_information(&self) -> ServiceInformation {
        ServiceInformation::new(self.version(), self.http_information())
    }

    /// Best-effort version parse, `1.0.0` when the `info.version` field is
    /// not a plain semantic version.
    fn version(&self) -> Version {
        self.document.info.version.parse().unwrap_or_default()
    }

    fn http_information(&self) -> HttpInformation {
        match self.document.servers.first() {
            Some(server) => http_information_from_url(&server.url),
            None => HttpInformation::default(),
        }
    }
}

/// Derive transport information from a server URL.
///
/// Server URLs may be templated (`{scheme}://{host}/v2`) and thus fail
/// strict URL parsing; those fall back to a manual authority split that
/// keeps the template variables as literal hostname text.
fn http_information_from_url(url: &str) -> HttpInformation {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            let protocol = match parsed.scheme() {
                "https" => HttpProtocol::Https,
                _ => HttpProtocol::Http,
            };
            let port = parsed.port_or_known_default().unwrap_or(80);
            return HttpInformation::new(protocol, host, port);
        }
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return HttpInformation::default();
    };
    let protocol = match scheme.starts_with("https") {
        true => HttpProtocol::Https,
        false => HttpProtocol::Http,
    };

    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return HttpInformation::default();
    }

    match authority.rsplit_once(':') {
        Some((hostname, port)) => {
            HttpInformation::new(protocol, hostname, port.parse().unwrap_or(80))
        }
        None => {
            let port = match protocol {
                HttpProtocol::Https => 443,
                HttpProtocol::Http => 80,
            };
            HttpInformation::new(protocol, authority, port)
        }
    }
}

/// Parse raw OpenAPI document content into the `openapiv3` object graph,
/// accepting both JSON and YAML.
pub fn parse_openapi(content: &str) -> Result<OpenAPI, ConversionError> {
    if content.trim_start().starts_with('{') {
        // a leading brace is usually JSON, but YAML flow style also starts
        // with one; retry as YAML before giving up
        match serde_json::from_str(content) {
            Ok(document) => return Ok(document),
            Err(json_err) => {
                return serde_yaml::from_str(content)
                    .map_err(|_| ConversionError::InvalidDocument(json_err.to_string()));
            }
        }
    }
    serde_yaml::from_str(content).map_err(|err| ConversionError::InvalidDocument(err.to_string()))
}
