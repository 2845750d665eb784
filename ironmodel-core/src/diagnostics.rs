//! Non-fatal diagnostics collected during a compilation.
//!
//! Resolution failures and policy warnings don't stop the batch. They are
//! collected here, and logged through `tracing` as they are reported.

use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Policy warning, the output is still complete.
    Warning,
    /// Part of the model couldn't be resolved or rendered.
    Error,
}

/// Category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A referenced type was never declared.
    UnresolvedType,
    /// A referenced service was never declared.
    UnresolvedService,
    /// A type name was declared more than once.
    DuplicateType,
    /// A service name was declared more than once.
    DuplicateService,
    /// The root service was replaced by a later declaration.
    RootReplaced,
    /// A constraint body couldn't be parsed.
    ConstraintParse,
    /// A struct member couldn't be rendered in the schema.
    UnrenderableMember,
    /// A struct base couldn't be rendered in the schema.
    UnresolvedBase,
}

impl DiagnosticKind {
    /// Returns the severity used for this kind of diagnostic.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::UnresolvedType
            | Self::UnresolvedService
            | Self::ConstraintParse
            | Self::UnrenderableMember
            | Self::UnresolvedBase => Severity::Error,
            Self::DuplicateType | Self::DuplicateService | Self::RootReplaced => {
                Severity::Warning
            }
        }
    }

    /// Returns a short, kebab-case label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::UnresolvedType => "unresolved-type",
            Self::UnresolvedService => "unresolved-service",
            Self::DuplicateType => "duplicate-type",
            Self::DuplicateService => "duplicate-service",
            Self::RootReplaced => "root-replaced",
            Self::ConstraintParse => "constraint-parse",
            Self::UnrenderableMember => "unrenderable-member",
            Self::UnresolvedBase => "unresolved-base",
        }
    }
}

/// Single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Category.
    pub kind: DiagnosticKind,
    /// Human readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic using the default severity of its kind.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}[{}]: {}", severity, self.kind.label(), self.message)
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic and logs it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!("{}", diagnostic),
            Severity::Error => tracing::error!("{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    /// Creates and adds a diagnostic of the given kind.
    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Diagnostic::new(kind, message));
    }

    /// Moves all diagnostics of `other` into this collection, without logging them again.
    pub fn append(&mut self, other: &mut Diagnostics) {
        self.entries.append(&mut other.entries);
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if any diagnostic has error severity.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Counts the diagnostics of the given kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Iterates the diagnostics in reporting order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_uses_kind_severity() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(DiagnosticKind::RootReplaced, "root replaced");
        assert!(!diagnostics.has_errors());
        diagnostics.report(DiagnosticKind::UnresolvedType, "can't find type 'foo'");
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.count(DiagnosticKind::UnresolvedType), 1);
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(DiagnosticKind::UnresolvedService, "can't find 'vms'");
        assert_eq!(
            diagnostic.to_string(),
            "error[unresolved-service]: can't find 'vms'"
        );
    }

    #[test]
    fn test_append() {
        let mut a = Diagnostics::new();
        let mut b = Diagnostics::new();
        b.report(DiagnosticKind::DuplicateType, "duplicate");
        a.append(&mut b);
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }
}
