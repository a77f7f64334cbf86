//! Template helper entry point.
//!
//! Template engines pass helper arguments as a list of positional values. The
//! helper reads the first one as the version; anything that is not a JSON
//! string takes the fallback path.
//!
//! ```
//! use changelink_core::helper::changelog_url_for;
//! use serde_json::json;
//!
//! assert_eq!(
//!     changelog_url_for(&[json!("1.4.3+ent")]),
//!     "https://www.github.com/hashicorp/vault/blob/main/CHANGELOG.md#v143"
//! );
//! assert_eq!(
//!     changelog_url_for(&[json!(null)]),
//!     "https://www.github.com/hashicorp/vault/blob/main/CHANGELOG.md#"
//! );
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::LinkError;
use crate::link::VersionLinkFormatter;

/// Helper name as registered with a template engine.
pub const HELPER_NAME: &str = "changelog-url-for";

/// Compute the changelog URL for the first positional parameter using the
/// default formatter.
pub fn changelog_url_for(params: &[Value]) -> String {
    ChangelogUrlHelper::default().compute(params)
}

/// A configured helper instance.
#[derive(Clone)]
pub struct ChangelogUrlHelper {
    formatter: VersionLinkFormatter,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for ChangelogUrlHelper {
    fn default() -> Self {
        Self::new(VersionLinkFormatter::new())
    }
}

impl std::fmt::Debug for ChangelogUrlHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangelogUrlHelper")
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

impl ChangelogUrlHelper {
    /// Helper that reports diagnostics through `tracing`.
    pub fn new(formatter: VersionLinkFormatter) -> Self {
        Self {
            formatter,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The formatter this helper delegates to.
    pub const fn formatter(&self) -> &VersionLinkFormatter {
        &self.formatter
    }

    /// Compute the URL for `params[0]`. Extra parameters are ignored.
    pub fn compute(&self, params: &[Value]) -> String {
        match params.first() {
            Some(Value::String(version)) => self
                .formatter
                .format_with(Some(version.as_str()), self.sink.as_ref())
                .into_string(),
            None | Some(Value::Null) => {
                self.sink.report(&LinkError::Missing, None);
                self.formatter.base_url().to_string()
            }
            Some(value) => {
                let failure = LinkError::NotText {
                    kind: value_kind(value),
                };
                self.sink.report(&failure, Some(&value.to_string()));
                self.formatter.base_url().to_string()
            }
        }
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::testing::RecordingSink;
    use crate::link::{Comparison, DEFAULT_BASE_URL};
    use serde_json::json;

    fn recording_helper() -> (ChangelogUrlHelper, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let helper = ChangelogUrlHelper::default().with_sink(sink.clone());
        (helper, sink)
    }

    #[test]
    fn formats_string_param() {
        assert_eq!(
            changelog_url_for(&[json!("1.5.0")]),
            "https://www.github.com/hashicorp/vault/blob/main/CHANGELOG.md#v150"
        );
    }

    #[test]
    fn ignores_extra_params() {
        assert_eq!(
            changelog_url_for(&[json!("2.0.0"), json!("ignored")]),
            "https://www.github.com/hashicorp/vault/blob/main/CHANGELOG.md#v200"
        );
    }

    #[test]
    fn missing_param_falls_back() {
        let (helper, sink) = recording_helper();
        assert_eq!(helper.compute(&[]), DEFAULT_BASE_URL);
        assert_eq!(sink.lines()[0], "version is missing");
    }

    #[test]
    fn null_param_falls_back() {
        let (helper, sink) = recording_helper();
        assert_eq!(helper.compute(&[Value::Null]), DEFAULT_BASE_URL);
        assert_eq!(
            sink.lines(),
            vec![
                "version is missing".to_string(),
                "Cannot generate URL for version: <none>".to_string(),
            ]
        );
    }

    #[test]
    fn non_text_params_fall_back() {
        for (param, kind) in [
            (json!(143), "number"),
            (json!(true), "boolean"),
            (json!(["1.5.0"]), "array"),
            (json!({"version": "1.5.0"}), "object"),
        ] {
            let (helper, sink) = recording_helper();
            assert_eq!(helper.compute(&[param]), DEFAULT_BASE_URL);
            assert_eq!(sink.lines()[0], format!("version must be text, got {kind}"));
        }
    }

    #[test]
    fn non_text_param_is_named_in_diagnostic() {
        let (helper, sink) = recording_helper();
        helper.compute(&[json!(1.5)]);
        assert_eq!(sink.lines()[1], "Cannot generate URL for version: 1.5");
    }

    #[test]
    fn malformed_string_reports_input() {
        let (helper, sink) = recording_helper();
        assert_eq!(helper.compute(&[json!("1..5")]), DEFAULT_BASE_URL);
        assert_eq!(sink.lines()[1], "Cannot generate URL for version: 1..5");
    }

    #[test]
    fn uses_configured_formatter() {
        let formatter = VersionLinkFormatter::new()
            .with_threshold("1.4.3", Comparison::Numeric)
            .unwrap();
        let helper = ChangelogUrlHelper::new(formatter);
        assert_eq!(helper.formatter().comparison(), Comparison::Numeric);
        assert!(helper.compute(&[json!("10.1.0")]).ends_with("#v1010"));
    }
}
