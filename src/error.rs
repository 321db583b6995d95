//! Error types for geoipset.

use thiserror::Error;

/// Error type for geoipset operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Download error
    #[error("download error: {0}")]
    Download(#[from] reqwest::Error),

    /// Invalid CIDR pattern
    #[error("invalid CIDR pattern: {0}")]
    InvalidCidr(String),

    /// Prefixes of both address families passed to one aggregation
    #[error("cannot aggregate IPv4 and IPv6 prefixes together")]
    MixedFamily,

    /// Unknown continent slug
    #[error("unknown continent: {0}")]
    UnknownContinent(String),

    /// IP version other than 4 or 6
    #[error("invalid IP version: {0} (expected 4 or 6)")]
    InvalidIpVersion(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for geoipset operations.
pub type Result<T> = std::result::Result<T, Error>;
