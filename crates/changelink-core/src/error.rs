//! Error types for changelink-core

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Malformed or unprocessable version input.
///
/// Every variant is recovered from locally by
/// [`VersionLinkFormatter::format`](crate::link::VersionLinkFormatter::format),
/// which falls back to the bare changelog URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// No version was supplied.
    #[error("version is missing")]
    Missing,

    /// The version value is not text (e.g. a number or an object).
    #[error("version must be text, got {kind}")]
    NotText {
        /// Kind of value that was supplied instead.
        kind: &'static str,
    },

    /// The version, or its release part before `+`, is empty.
    #[error("version is empty")]
    Empty,

    /// The release part has no `.` separators.
    #[error("version `{release}` has no `.` separators")]
    MissingSeparator {
        /// The release part that was inspected.
        release: String,
    },

    /// A dot-separated segment of the release part is empty.
    #[error("version `{release}` has an empty segment at position {position}")]
    EmptySegment {
        /// The release part that was inspected.
        release: String,
        /// Zero-based index of the empty segment.
        position: usize,
    },

    /// Numeric comparison was requested but the release is not semver.
    #[error("version `{release}` is not a semantic version: {reason}")]
    NotSemver {
        /// The release part that failed to parse.
        release: String,
        /// Parser message.
        reason: String,
    },
}

/// Result type alias using [`LinkError`].
pub type LinkResult<T> = Result<T, LinkError>;
