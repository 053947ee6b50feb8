// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Column role resolution.
//!
//! A field carries at most one role marker. The single sanctioned pair is
//! `static_column` with `counter`, which resolves to a static counter
//! column; every other combination is a diagnostic. Key orders are
//! one-based, and counter columns only accept an `i64` source because the
//! wire increments a signed 64-bit value.

use syn::Type;

use crate::{
    annotations::{AnnotationKind, AnnotationSet},
    diagnostics::{Diagnostic, FieldScope, ViolationKind},
    shape::{display_type, type_key}
};

/// Resolved role of a column inside its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRole {
    /// Partition key component.
    Partition {
        /// 1-based position inside the partition key.
        order: u32
    },

    /// Clustering column.
    Clustering {
        /// 1-based position among the clustering columns.
        order: u32,

        /// Sort direction of this component.
        ascending: bool
    },

    /// Column shared by every row of a partition.
    Static,

    /// Counter shared by every row of a partition.
    StaticCounter,

    /// Counter column.
    Counter,

    /// Value produced by a CQL function over other columns.
    Computed {
        /// Function applied at read time, such as `writetime`.
        function: String,

        /// Alias the projection is selected under.
        alias: String,

        /// Declared result type of the projection.
        cql_class: Type,

        /// Columns the function applies to.
        targets: Vec<String>
    },

    /// Plain data column.
    Normal
}

impl ColumnRole {
    /// Resolve the role from a field's root annotations.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic for conflicting role markers, a zero key
    /// order, or a counter declared over a non-`i64` type.
    pub fn resolve(
        scope: &FieldScope<'_>,
        set: &AnnotationSet,
        ty: &Type
    ) -> Result<Self, Diagnostic> {
        let markers = set.role_markers();
        if markers.len() > 1 {
            let static_counter = markers.len() == 2
                && markers.contains(&AnnotationKind::StaticColumn)
                && markers.contains(&AnnotationKind::Counter);
            if !static_counter {
                let names: Vec<&str> = markers.iter().map(|marker| marker.as_str()).collect();
                return Err(scope
                    .violation(
                        ViolationKind::AnnotationCombination,
                        "column role annotations are mutually exclusive"
                    )
                    .with_actual(names.join(" + ")));
            }
        }

        if let Some(key) = &set.partition_key {
            if key.order == 0 {
                return Err(scope
                    .violation(ViolationKind::Cardinality, "partition key order starts at 1")
                    .with_actual("0")
                    .with_span(key.span));
            }
            return Ok(Self::Partition { order: key.order });
        }

        if let Some(clustering) = &set.clustering {
            if clustering.order == 0 {
                return Err(scope
                    .violation(ViolationKind::Cardinality, "clustering order starts at 1")
                    .with_actual("0")
                    .with_span(clustering.span));
            }
            return Ok(Self::Clustering {
                order:     clustering.order,
                ascending: clustering.ascending
            });
        }

        if set.counter {
            if type_key(ty) != "i64" {
                return Err(scope
                    .violation(ViolationKind::TypeMismatch, "counter columns require an i64 source")
                    .with_expected("i64")
                    .with_actual(display_type(ty)));
            }
            if set.static_column {
                return Ok(Self::StaticCounter);
            }
            return Ok(Self::Counter);
        }

        if set.static_column {
            return Ok(Self::Static);
        }

        if let Some(computed) = &set.computed {
            return Ok(Self::Computed {
                function:  computed.function.clone(),
                alias:     computed.alias.clone(),
                cql_class: computed.cql_class.clone(),
                targets:   computed.targets.clone()
            });
        }

        Ok(Self::Normal)
    }

    /// Whether this column is part of the primary key.
    #[must_use]
    pub fn is_key(&self) -> bool {
        matches!(self, Self::Partition { .. } | Self::Clustering { .. })
    }

    /// Whether this column increments on the wire instead of being set.
    #[must_use]
    pub fn is_counter(&self) -> bool {
        matches!(self, Self::Counter | Self::StaticCounter)
    }

    /// Whether the partition stores this column once for all its rows.
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static | Self::StaticCounter)
    }
}
