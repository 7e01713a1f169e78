//! Configuration of the tree builder.

use crate::warning::WarningConfig;

/// Options controlling the repair pass.
///
/// # Defaults
/// * single-child merging disabled: sections with one child are kept and
///   reported with an [OnlyChild](crate::warning::WarningKind::OnlyChild) warning
/// * [WarningConfig::default()]
/// * no source name
///
/// # Example
/// ```
/// use neuromorph::model::BuildOptions;
/// use neuromorph::warning::WarningConfig;
///
/// let options = BuildOptions::default()
///     .with_single_child_merge()
///     .with_warnings(WarningConfig::silent());
/// assert!(options.merge_single_children());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    merge_single_children: bool,
    warnings: WarningConfig,
    uri: Option<String>,
}

impl BuildOptions {
    /// Enables merging of single-child sections into their parent.
    pub fn with_single_child_merge(mut self) -> Self {
        self.merge_single_children = true;
        self
    }

    /// Replaces the warning configuration.
    pub fn with_warnings(mut self, warnings: WarningConfig) -> Self {
        self.warnings = warnings;
        self
    }

    /// Names the source (typically a file path) for diagnostics.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn merge_single_children(&self) -> bool {
        self.merge_single_children
    }

    pub fn warnings(&self) -> &WarningConfig {
        &self.warnings
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}
