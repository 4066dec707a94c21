//! Service metadata model
//!
//! Version and transport information extracted from the OAS `info` and
//! `servers` sections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a version string is not a plain `major.minor.patch`
/// triple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a semantic version")]
pub struct InvalidVersion(pub String);

/// A semantic version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }
}

impl Default for Version {
    /// The version assumed when the OAS `info.version` field cannot be
    /// parsed.
    fn default() -> Self {
        Version::new(1, 0, 0)
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVersion(s.to_string());

        let mut parts = s.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let patch = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Version::new(major, minor, patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Transport protocol of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpProtocol {
    Http,
    Https,
}

/// Transport information of the service, derived from the first declared
/// server URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpInformation {
    /// Transport protocol
    pub protocol: HttpProtocol,
    /// Hostname (may be a server URL template variable for templated URLs)
    pub hostname: String,
    /// Port, either explicit or the scheme default
    pub port: u16,
}

impl HttpInformation {
    /// Create new transport information.
    pub fn new(protocol: HttpProtocol, hostname: impl Into<String>, port: u16) -> Self {
        HttpInformation {
            protocol,
            hostname: hostname.into(),
            port,
        }
    }
}

impl Default for HttpInformation {
    /// The transport assumed when the OAS document declares no servers.
    fn default() -> Self {
        HttpInformation::new(HttpProtocol::Http, "example.com", 80)
    }
}

/// Service-level metadata of a converted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInformation {
    /// Service version
    pub version: Version,
    /// Transport information
    pub http: HttpInformation,
    /// Exporter configurations. OAS documents carry no exporter metadata,
    /// so this is always empty.
    pub exporters: Vec<String>,
}

impl ServiceInformation {
    /// Create new service information with an empty exporter list.
    pub fn new(version: Version, http: HttpInformation) -> Self {
        ServiceInformation {
            version,
            http,
            exporters: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!("1.2.3".parse::<Version>(), Ok(Version::new(1, 2, 3)));
        assert_eq!("0.0.0".parse::<Version>(), Ok(Version::new(0, 0, 0)));
        assert!("SomeVersion".parse::<Version>().is_err());
        assert!("1.2".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
        assert!("1.2.x".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_default() {
        assert_eq!(Version::default(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(2, 1, 7).to_string(), "2.1.7");
    }
}
