//! Diagnostic reporting for version inputs that cannot be linked.
//!
//! The formatter never raises errors to its caller. Instead, each failure is
//! handed to a [`DiagnosticSink`], which the hosting application supplies.

use crate::error::LinkError;

/// Receives diagnostics for version inputs that fell back to the bare URL.
///
/// Implementations must be cheap and must not panic; reporting is
/// fire-and-forget.
pub trait DiagnosticSink: Send + Sync {
    /// Report a failure for the given input (`None` when the input was absent
    /// or not text).
    fn report(&self, failure: &LinkError, input: Option<&str>);
}

/// Emits diagnostics as `tracing` warnings.
///
/// Each failure produces two events: the failure detail, followed by a
/// message naming the offending input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, failure: &LinkError, input: Option<&str>) {
        tracing::warn!(error = %failure, "changelog link fallback");
        tracing::warn!(
            version = input,
            "{}",
            fallback_message(input)
        );
    }
}

/// Discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn report(&self, _failure: &LinkError, _input: Option<&str>) {}
}

/// Human-readable message naming the input that could not be linked.
pub fn fallback_message(input: Option<&str>) -> String {
    match input {
        Some(version) => format!("Cannot generate URL for version: {version}"),
        None => "Cannot generate URL for version: <none>".to_string(),
    }
}
