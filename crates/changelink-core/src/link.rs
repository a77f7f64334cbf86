//! Version-to-changelog link formatting.
//!
//! Changelog headers for releases from 1.4.3 onward are written as
//! `## v1.5.0`, which GitHub renders with the anchor `#v150`. Older releases
//! have no predictable anchor, so they link to the top of the document.
//!
//! The transformation is:
//! 1. Drop the edition suffix after `+` (`1.5.0+ent` becomes `1.5.0`).
//! 2. Remove the dots (`1.5.0` becomes `150`).
//! 3. Anchor the URL with `v150` when the compact form reaches the floor.
//!
//! Any malformed input yields the bare base URL.
//!
//! # Example
//!
//! ```
//! use changelink_core::link::VersionLinkFormatter;
//!
//! let formatter = VersionLinkFormatter::new();
//! assert_eq!(
//!     formatter.format(Some("1.5.0+ent")).as_str(),
//!     "https://www.github.com/hashicorp/vault/blob/main/CHANGELOG.md#v150"
//! );
//! ```

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize, Serializer};

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{LinkError, LinkResult};

/// Changelog document every link points into.
pub const DEFAULT_BASE_URL: &str = "https://www.github.com/hashicorp/vault/blob/main/CHANGELOG.md#";

/// First release whose changelog header has a predictable anchor.
pub const DEFAULT_ANCHOR_FLOOR: &str = "1.4.3";

const EDITION_SEPARATOR: char = '+';
const SEGMENT_SEPARATOR: char = '.';
const ANCHOR_PREFIX: &str = "v";

/// How a version is compared against the anchor floor.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Byte-wise string ordering of the compact forms (`"1000" < "143"`).
    #[default]
    Lexical,
    /// Semantic-version ordering of the release parts (`9.9.0 > 1.4.3`).
    Numeric,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Numeric => write!(f, "numeric"),
        }
    }
}

/// A version string split into its release part, edition and compact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactVersion {
    release: String,
    edition: Option<String>,
    compact: String,
}

impl CompactVersion {
    /// Parse a version such as `1.5.0` or `1.5.0+ent`.
    ///
    /// Segment contents are not checked, so `1.5.0-beta` compacts to
    /// `150-beta`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Empty`] for an empty input or release part,
    /// [`LinkError::MissingSeparator`] when the release part has no dots, and
    /// [`LinkError::EmptySegment`] for inputs like `1..3`.
    pub fn parse(input: &str) -> LinkResult<Self> {
        let (release, edition) = match input.split_once(EDITION_SEPARATOR) {
            Some((release, edition)) => (release, Some(edition.to_string())),
            None => (input, None),
        };

        if release.is_empty() {
            return Err(LinkError::Empty);
        }
        if !release.contains(SEGMENT_SEPARATOR) {
            return Err(LinkError::MissingSeparator {
                release: release.to_string(),
            });
        }
        if let Some(position) = release
            .split(SEGMENT_SEPARATOR)
            .position(str::is_empty)
        {
            return Err(LinkError::EmptySegment {
                release: release.to_string(),
                position,
            });
        }

        Ok(Self {
            release: release.to_string(),
            edition,
            compact: release.split(SEGMENT_SEPARATOR).collect(),
        })
    }

    /// The part before the edition separator (`1.5.0`).
    pub fn release(&self) -> &str {
        &self.release
    }

    /// The edition suffix after `+`, if any (`ent`).
    pub fn edition(&self) -> Option<&str> {
        self.edition.as_deref()
    }

    /// The release with its dots removed (`150`).
    pub fn compact(&self) -> &str {
        &self.compact
    }
}

/// A changelog URL, with or without a version anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangelogUrl {
    url: String,
    base_len: usize,
}

impl ChangelogUrl {
    fn bare(base_url: &str) -> Self {
        Self {
            url: base_url.to_string(),
            base_len: base_url.len(),
        }
    }

    fn anchored(base_url: &str, compact: &str) -> Self {
        Self {
            url: format!("{base_url}{ANCHOR_PREFIX}{compact}"),
            base_len: base_url.len(),
        }
    }

    /// The full URL.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The anchor appended to the base URL (`v150`), if any.
    pub fn anchor(&self) -> Option<&str> {
        let anchor = &self.url[self.base_len..];
        (!anchor.is_empty()).then_some(anchor)
    }

    /// Whether the URL targets a specific changelog section.
    pub fn is_anchored(&self) -> bool {
        self.url.len() > self.base_len
    }

    /// Consume the URL, returning the underlying string.
    pub fn into_string(self) -> String {
        self.url
    }
}

impl fmt::Display for ChangelogUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl AsRef<str> for ChangelogUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl From<ChangelogUrl> for String {
    fn from(url: ChangelogUrl) -> Self {
        url.url
    }
}

impl Serialize for ChangelogUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Threshold {
    Lexical(String),
    Numeric(Version),
}

impl Threshold {
    fn new(floor: &str, comparison: Comparison) -> LinkResult<Self> {
        let floor = CompactVersion::parse(floor)?;
        match comparison {
            Comparison::Lexical => Ok(Self::Lexical(floor.compact)),
            Comparison::Numeric => parse_semver(floor.release()).map(Self::Numeric),
        }
    }

    fn is_reached_by(&self, version: &CompactVersion) -> LinkResult<bool> {
        match self {
            Self::Lexical(floor) => Ok(version.compact() >= floor.as_str()),
            Self::Numeric(floor) => Ok(&parse_semver(version.release())? >= floor),
        }
    }

    const fn comparison(&self) -> Comparison {
        match self {
            Self::Lexical(_) => Comparison::Lexical,
            Self::Numeric(_) => Comparison::Numeric,
        }
    }
}

fn parse_semver(release: &str) -> LinkResult<Version> {
    Version::parse(release).map_err(|e| LinkError::NotSemver {
        release: release.to_string(),
        reason: e.to_string(),
    })
}

/// Maps version strings to changelog URLs.
///
/// Stateless apart from its settings; safe to share across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLinkFormatter {
    base_url: String,
    threshold: Threshold,
}

impl Default for VersionLinkFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionLinkFormatter {
    /// Formatter with the stock base URL, a `1.4.3` floor and lexical
    /// comparison.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            threshold: Threshold::Lexical(
                DEFAULT_ANCHOR_FLOOR.replace(SEGMENT_SEPARATOR, ""),
            ),
        }
    }

    /// Use a different changelog URL. The anchor is appended verbatim, so the
    /// URL should end with `#`.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the anchor floor and comparison mode.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] if `floor` is not a dotted version, or not a
    /// semantic version when `comparison` is [`Comparison::Numeric`].
    pub fn with_threshold(mut self, floor: &str, comparison: Comparison) -> LinkResult<Self> {
        self.threshold = Threshold::new(floor, comparison)?;
        Ok(self)
    }

    /// The base URL returned for unanchored links.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The active comparison mode.
    pub const fn comparison(&self) -> Comparison {
        self.threshold.comparison()
    }

    /// Format a version, reporting failures to `tracing`.
    ///
    /// Never fails: malformed or absent input yields the bare base URL.
    pub fn format(&self, version: Option<&str>) -> ChangelogUrl {
        self.format_with(version, &TracingSink)
    }

    /// Format a version, reporting failures to the given sink.
    pub fn format_with(&self, version: Option<&str>, sink: &dyn DiagnosticSink) -> ChangelogUrl {
        match self.try_format(version) {
            Ok(url) => url,
            Err(failure) => {
                sink.report(&failure, version);
                ChangelogUrl::bare(&self.base_url)
            }
        }
    }

    /// Format a version, returning the failure instead of falling back.
    ///
    /// A well-formed version below the floor is not a failure; it yields the
    /// bare base URL.
    ///
    /// # Errors
    ///
    /// Returns a [`LinkError`] for absent or malformed input.
    pub fn try_format(&self, version: Option<&str>) -> LinkResult<ChangelogUrl> {
        let input = version.ok_or(LinkError::Missing)?;
        let version = CompactVersion::parse(input)?;

        if self.threshold.is_reached_by(&version)? {
            tracing::trace!(compact = version.compact(), "anchored changelog link");
            Ok(ChangelogUrl::anchored(&self.base_url, version.compact()))
        } else {
            tracing::trace!(compact = version.compact(), "version below anchor floor");
            Ok(ChangelogUrl::bare(&self.base_url))
        }
    }
}
