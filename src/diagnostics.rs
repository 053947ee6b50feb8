// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Structured resolution diagnostics.
//!
//! Every rule violation found during metadata resolution is recorded as a
//! [`Diagnostic`] naming its scope (a record field, or the codec registry),
//! the violated rule, and the expected versus actual values where known.
//! Resolution never stops at the first problem: failures are field scoped,
//! and a [`Diagnostics`] accumulator collects everything found in a run.
//!
//! # Violation Kinds
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `Shape` | a declared type cannot be classified into the closed shape set |
//! | `AnnotationCombination` | mutually exclusive annotations are combined, or an annotation lands on an unsupported shape |
//! | `TypeMismatch` | declared and required types disagree (codec FROM, computed class, counter source) |
//! | `Registry` | duplicate codec registration for one source type |
//! | `Cardinality` | a count or order constraint is violated (codec arity, key order, annotation paths) |
//! | `DependencyUnresolved` | a field depends on a composite whose own resolution failed |

use std::fmt;

use proc_macro2::Span;

/// Category of a resolution rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The declared type has no recognized shape.
    Shape,

    /// Mutually exclusive annotations were combined, or an annotation was
    /// applied to a shape that does not support it.
    AnnotationCombination,

    /// Declared and required types disagree.
    TypeMismatch,

    /// Codec registry misuse, such as a duplicate registration.
    Registry,

    /// A count or ordering constraint was violated.
    Cardinality,

    /// The field depends on a composite type whose resolution failed.
    DependencyUnresolved
}

impl ViolationKind {
    /// Label used when rendering diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shape => "shape",
            Self::AnnotationCombination => "annotation combination",
            Self::TypeMismatch => "type mismatch",
            Self::Registry => "registry",
            Self::Cardinality => "cardinality",
            Self::DependencyUnresolved => "dependency unresolved"
        }
    }
}

/// Where a diagnostic points.
#[derive(Debug, Clone)]
enum Scope {
    /// A field of a record under resolution.
    Field { record: String, field: String },

    /// The codec registry itself (registration-time failures).
    Registry { source: String }
}

/// A single resolution failure.
///
/// Identifies the record and field (or the registry source key), the
/// violated rule in plain words, and where available the expected and
/// actual values. The span points at the originating annotation or type so
/// macro front ends can attach the error to user code.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    scope:    Scope,
    kind:     ViolationKind,
    rule:     String,
    expected: Option<String>,
    actual:   Option<String>,
    span:     Span
}

impl Diagnostic {
    /// Create a field-scoped diagnostic.
    #[must_use]
    pub fn field(
        record: impl Into<String>,
        field: impl Into<String>,
        kind: ViolationKind,
        rule: impl Into<String>
    ) -> Self {
        Self {
            scope: Scope::Field {
                record: record.into(),
                field:  field.into()
            },
            kind,
            rule: rule.into(),
            expected: None,
            actual: None,
            span: Span::call_site()
        }
    }

    /// Create a registry-scoped diagnostic for a source type key.
    #[must_use]
    pub fn registry(source: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            scope: Scope::Registry {
                source: source.into()
            },
            kind: ViolationKind::Registry,
            rule: rule.into(),
            expected: None,
            actual: None,
            span: Span::call_site()
        }
    }

    /// Attach the expected value.
    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Attach the actual value.
    #[must_use]
    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    /// Attach the source span the diagnostic should point at.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Violation category.
    #[must_use]
    pub fn kind(&self) -> ViolationKind {
        self.kind
    }

    /// The violated rule in plain words.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Record name for field-scoped diagnostics.
    #[must_use]
    pub fn record(&self) -> Option<&str> {
        match &self.scope {
            Scope::Field { record, .. } => Some(record),
            Scope::Registry { .. } => None
        }
    }

    /// Field name for field-scoped diagnostics.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        match &self.scope {
            Scope::Field { field, .. } => Some(field),
            Scope::Registry { .. } => None
        }
    }

    /// Source type key for registry-scoped diagnostics.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        match &self.scope {
            Scope::Field { .. } => None,
            Scope::Registry { source } => Some(source)
        }
    }

    /// Expected value, when the rule has one.
    #[must_use]
    pub fn expected(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    /// Actual value, when the rule has one.
    #[must_use]
    pub fn actual(&self) -> Option<&str> {
        self.actual.as_deref()
    }

    /// Span the diagnostic points at.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Scope::Field { record, field } => {
                write!(f, "{record}.{field}: {} ({})", self.rule, self.kind.as_str())?;
            }
            Scope::Registry { source } => {
                write!(f, "codec registry for {source}: {} ({})", self.rule, self.kind.as_str())?;
            }
        }
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => {
                write!(f, "; expected {expected}, found {actual}")
            }
            (Some(expected), None) => write!(f, "; expected {expected}"),
            (None, Some(actual)) => write!(f, "; found {actual}"),
            (None, None) => Ok(())
        }
    }
}

impl std::error::Error for Diagnostic {}

impl From<Diagnostic> for darling::Error {
    fn from(diagnostic: Diagnostic) -> Self {
        let message = diagnostic.to_string();
        Self::from(syn::Error::new(diagnostic.span, message))
    }
}

/// Borrowed record/field pair used to stamp diagnostics during resolution.
#[derive(Debug, Clone, Copy)]
pub struct FieldScope<'a> {
    /// Record (struct) name.
    pub record: &'a str,

    /// Field name.
    pub field: &'a str
}

impl FieldScope<'_> {
    /// Start a diagnostic for this field.
    #[must_use]
    pub fn violation(&self, kind: ViolationKind, rule: impl Into<String>) -> Diagnostic {
        Diagnostic::field(self.record, self.field, kind, rule)
    }
}

/// Accumulator for all diagnostics produced by a resolution run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>
}

impl Diagnostics {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Whether the run produced no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate recorded diagnostics in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Combine everything into a single error for a macro boundary.
    ///
    /// Returns `None` when the run was clean. Each diagnostic keeps its own
    /// span, so the combined error still points at every offending site.
    #[must_use]
    pub fn into_boundary_error(self) -> Option<darling::Error> {
        if self.items.is_empty() {
            return None;
        }
        Some(darling::Error::multiple(
            self.items.into_iter().map(darling::Error::from).collect()
        ))
    }
}

impl IntoIterator for Diagnostics {
    type IntoIter = std::vec::IntoIter<Diagnostic>;
    type Item = Diagnostic;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Error returned when a frame chain is advanced past its final frame.
///
/// Reports a consumer bug rather than a user configuration problem, so the
/// chain returns it directly instead of recording a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainExhausted;

impl fmt::Display for ChainExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("decomposition frame chain advanced past its final frame")
    }
}

impl std::error::Error for ChainExhausted {}
