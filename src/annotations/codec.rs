// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Codec and computed-column annotation payloads.

use proc_macro2::Span;

/// How an enum value is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumEncoding {
    /// Variant name as `text` (default).
    #[default]
    Name,

    /// Declaration position as `int`.
    Ordinal
}

impl EnumEncoding {
    /// Parse an encoding mode name.
    ///
    /// Returns `None` for unrecognized values.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "ordinal" => Some(Self::Ordinal),
            _ => None
        }
    }
}

/// Payload of `codec = Path<FROM, TO>`.
///
/// The path is kept exactly as written, generic arguments included; the
/// codec resolver validates the `(FROM, TO)` arity and types.
#[derive(Debug, Clone)]
pub struct ExplicitCodec {
    /// Codec path as written.
    pub path: syn::Path,

    /// Annotation span for diagnostics.
    pub span: Span
}

/// Payload of `runtime_codec(target = ..., name = "...")`.
#[derive(Debug, Clone)]
pub struct RuntimeCodec {
    /// Declared wire-side target type.
    pub target: syn::Type,

    /// Optional binding name narrowing the runtime lookup.
    pub name: Option<String>,

    /// Annotation span for diagnostics.
    pub span: Span
}

/// Payload of `computed(...)`.
///
/// Describes a read-only projection computed by a CQL function over other
/// columns, such as `writetime(value)`.
#[derive(Debug, Clone)]
pub struct ComputedColumn {
    /// CQL function applied to the target columns.
    pub function: String,

    /// Projection alias the computed value is read back under.
    pub alias: String,

    /// Declared result type; must equal the field's source type.
    pub cql_class: syn::Type,

    /// Column arguments passed to the function.
    pub targets: Vec<String>,

    /// Annotation span for diagnostics.
    pub span: Span
}
