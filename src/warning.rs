//! Non-fatal advisories raised while building a morphology.
//!
//! Every silent correction of the repair pass is reported as a [Warning]
//! through a [Diagnostics] channel. The channel is configured with an
//! explicit [WarningConfig] (maximum count, ignored kinds) that callers
//! pass into the builder; nothing here is process-global.
//!
//! Accepted warnings are logged via `tracing::warn!` and kept, so they can be
//! inspected afterwards via [Morphology::warnings](crate::Morphology::warnings).

use std::collections::HashSet;
use std::fmt;

/// Default cap on the number of reported warnings per build.
pub const DEFAULT_MAX_WARNINGS: usize = 100;

// =#========================================================================#=
// WARNING KIND
// =#========================================================================$=
/// Kinds of advisories; each maps to a documented silent correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// Neurite root without parent and without a co-located soma point;
    /// kept as its own root.
    DisconnectedNeurite,
    /// Child starts at the parent's last position but with another
    /// diameter; the child's sample is kept, no duplicate is inserted.
    WrongDuplicate,
    /// Child appended to a section without points; no duplicate inserted.
    AppendingEmptySection,
    /// Section with exactly one child.
    OnlyChild,
    /// Three-point soma not following the NeuroMorpho layout.
    NeuromorphoSomaNonConform,
    /// Neurite attached to a soma point other than the soma center.
    WrongRootPoint,
    /// Input without any soma sample.
    NoSomaFound,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WarningKind::DisconnectedNeurite => "disconnected neurite",
            WarningKind::WrongDuplicate => "wrong duplicate",
            WarningKind::AppendingEmptySection => "appending empty section",
            WarningKind::OnlyChild => "only child",
            WarningKind::NeuromorphoSomaNonConform => "non-conforming NeuroMorpho soma",
            WarningKind::WrongRootPoint => "wrong root point",
            WarningKind::NoSomaFound => "no soma found",
        };
        f.write_str(name)
    }
}

// =#========================================================================#=
// WARNING
// =#========================================================================$=
/// A single advisory with optional line context.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    kind: WarningKind,
    line: Option<usize>,
    message: String,
}

impl Warning {
    /// Creates a warning of the given kind.
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            message: message.into(),
        }
    }

    /// Attaches a 1-based input line.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn kind(&self) -> WarningKind {
        self.kind
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {line}: ")?;
        }
        write!(f, "warning ({}): {}", self.kind, self.message)
    }
}

// =#========================================================================#=
// WARNING CONFIG
// =#========================================================================$=
/// Configuration of the advisory channel.
///
/// # Example
/// ```
/// use neuromorph::warning::{WarningConfig, WarningKind};
///
/// let config = WarningConfig::default()
///     .with_max_warnings(10)
///     .ignore(WarningKind::OnlyChild);
/// assert!(config.is_ignored(WarningKind::OnlyChild));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningConfig {
    max_warnings: usize,
    ignored: HashSet<WarningKind>,
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self {
            max_warnings: DEFAULT_MAX_WARNINGS,
            ignored: HashSet::new(),
        }
    }
}

impl WarningConfig {
    /// Configuration that drops every warning.
    pub fn silent() -> Self {
        Self::default().with_max_warnings(0)
    }

    /// Sets how many warnings are reported before further ones are only counted.
    pub fn with_max_warnings(mut self, max_warnings: usize) -> Self {
        self.max_warnings = max_warnings;
        self
    }

    /// Suppresses a kind of warning.
    pub fn ignore(mut self, kind: WarningKind) -> Self {
        self.ignored.insert(kind);
        self
    }

    pub fn max_warnings(&self) -> usize {
        self.max_warnings
    }

    pub fn is_ignored(&self, kind: WarningKind) -> bool {
        self.ignored.contains(&kind)
    }
}

// =#========================================================================#=
// DIAGNOSTICS
// =#========================================================================$=
/// Capped, filterable sink for [Warning]s of one build.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    config: WarningConfig,
    uri: Option<String>,
    reported: Vec<Warning>,
    suppressed: usize,
}

impl Diagnostics {
    /// Creates an empty channel with the given configuration.
    pub fn new(config: WarningConfig) -> Self {
        Self {
            config,
            uri: None,
            reported: Vec::new(),
            suppressed: 0,
        }
    }

    /// Sets the source name used in log records.
    pub fn set_uri(&mut self, uri: impl Into<String>) {
        self.uri = Some(uri.into());
    }

    /// Offers a warning to the channel.
    ///
    /// Ignored kinds are dropped silently. Once the cap is reached, further
    /// warnings only increase the [suppressed](Self::suppressed) count.
    pub fn warn(&mut self, warning: Warning) {
        if self.config.is_ignored(warning.kind()) {
            return;
        }
        if self.reported.len() >= self.config.max_warnings() {
            self.suppressed += 1;
            return;
        }

        tracing::warn!(
            uri = self.uri.as_deref().unwrap_or("<memory>"),
            line = warning.line(),
            kind = %warning.kind(),
            "{}",
            warning.message()
        );
        self.reported.push(warning);
    }

    /// Warnings accepted so far, in emission order.
    pub fn warnings(&self) -> &[Warning] {
        &self.reported
    }

    /// Number of non-ignored warnings dropped because of the cap.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.reported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_kind_is_dropped() {
        let mut diagnostics = Diagnostics::new(WarningConfig::default().ignore(WarningKind::OnlyChild));
        diagnostics.warn(Warning::new(WarningKind::OnlyChild, "section 0"));
        diagnostics.warn(Warning::new(WarningKind::NoSomaFound, "no soma"));
        assert_eq!(diagnostics.warnings().len(), 1);
        assert_eq!(diagnostics.warnings()[0].kind(), WarningKind::NoSomaFound);
        assert_eq!(diagnostics.suppressed(), 0);
    }

    #[test]
    fn test_cap_counts_overflow() {
        let mut diagnostics = Diagnostics::new(WarningConfig::default().with_max_warnings(2));
        for i in 0..5 {
            diagnostics.warn(Warning::new(WarningKind::WrongDuplicate, format!("{i}")));
        }
        assert_eq!(diagnostics.warnings().len(), 2);
        assert_eq!(diagnostics.suppressed(), 3);
    }

    #[test]
    fn test_silent_reports_nothing() {
        let mut diagnostics = Diagnostics::new(WarningConfig::silent());
        diagnostics.warn(Warning::new(WarningKind::DisconnectedNeurite, "x").at_line(3));
        assert!(diagnostics.warnings().is_empty());
        assert_eq!(diagnostics.suppressed(), 1);
    }
}
