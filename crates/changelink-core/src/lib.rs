//! Core library for changelink.
//!
//! This crate turns version strings into links to the matching section of a
//! changelog document. It is used by the `changelink` CLI and by template
//! hosts through the [`helper`] module.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and management
//! - [`diagnostics`] - Reporting for inputs that fall back to the bare URL
//! - [`error`] - Error types and result aliases
//! - [`helper`] - Template helper entry point
//! - [`link`] - Version-to-URL formatting
//!
//! # Quick Start
//!
//! ```
//! use changelink_core::VersionLinkFormatter;
//!
//! let url = VersionLinkFormatter::new().format(Some("1.4.2"));
//! assert!(!url.is_anchored());
//! ```
#![deny(unsafe_code)]

pub mod config;

pub mod diagnostics;

pub mod error;

pub mod helper;

pub mod link;

pub use config::{Config, ConfigLoader, LinkConfig, LogLevel};

pub use diagnostics::{DiagnosticSink, SilentSink, TracingSink};

pub use error::{ConfigError, ConfigResult, LinkError, LinkResult};

pub use link::{ChangelogUrl, Comparison, VersionLinkFormatter};
