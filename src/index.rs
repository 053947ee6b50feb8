// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Secondary index classification.
//!
//! A column resolves to at most one index. SASI and search declarations
//! outrank a native `index` and all three are pairwise exclusive. Native
//! indexes split further by the indexed position of the column type:
//!
//! | Category | Indexed position |
//! |----------|------------------|
//! | `Normal` | scalar column value |
//! | `Full` | whole frozen collection |
//! | `Collection` | elements of a non-frozen list or set |
//! | `MapKey` / `MapValue` | one side of a map |
//! | `MapEntry` | whole entries of a non-frozen map |
//! | `Custom` | user-supplied indexer class |
//!
//! `Option` wrappers are transparent here: the wrapped type decides which
//! positions can be indexed, and container-level annotations may sit on
//! either the column root or the unwrapped frame, but not both.

use crate::{
    annotations::{AnnotationSet, IndexConfig, SasiConfig, SasiMode, SearchConfig},
    cursor::{FrameChain, FramePath},
    diagnostics::{Diagnostic, FieldScope, ViolationKind},
    shape::TypeShape
};

/// Indexed position category of a native secondary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeCategory {
    /// Scalar column value.
    Normal,

    /// Whole frozen collection.
    Full,

    /// Elements of a non-frozen list or set.
    Collection,

    /// Keys of a map.
    MapKey,

    /// Values of a map.
    MapValue,

    /// Whole entries of a map.
    MapEntry,

    /// Delegated to a custom indexer class.
    Custom
}

/// Resolved index of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexClassification {
    /// No index requested.
    None,

    /// Native secondary index.
    Native {
        /// Indexed position category.
        category: NativeCategory,

        /// Index name, `{field}_index` unless configured.
        name: String,

        /// Custom indexer class, when declared.
        custom_class: Option<String>,

        /// Raw option string passed through to the index DDL.
        options: Option<String>
    },

    /// SASI index.
    Advanced {
        /// Index name, `{field}_index`.
        name: String,

        /// Full SASI configuration.
        config: SasiConfig
    },

    /// Search index.
    Search {
        /// Whether full-text analysis is enabled.
        full_text: bool
    }
}

/// Classify the index of the column rooted at `path`.
///
/// # Errors
///
/// Returns a diagnostic when index annotations conflict, when a SASI or
/// search index is declared over a non-scalar column, or when a position
/// that cannot be indexed carries an index annotation.
pub fn classify_index(
    scope: &FieldScope<'_>,
    chain: &FrameChain,
    path: &FramePath,
    field_name: &str
) -> Result<IndexClassification, Diagnostic> {
    let Some(root) = chain.frame_at(path) else {
        return Ok(IndexClassification::None);
    };

    // Unwrap Optional frames; the wrapped type decides the index shape.
    let mut container_path = path.clone();
    let mut container = root;
    while container.shape() == TypeShape::Optional {
        let inner = container_path.child(0);
        let Some(frame) = chain.frame_at(&inner) else {
            break;
        };
        container_path = inner;
        container = frame;
    }

    let view = column_view(
        scope,
        root.annotations(),
        container.annotations(),
        path != &container_path
    )?;

    let declared = usize::from(view.index.is_some())
        + usize::from(view.sasi.is_some())
        + usize::from(view.search.is_some());
    if declared > 1 {
        return Err(scope.violation(
            ViolationKind::AnnotationCombination,
            "a column declares at most one of index, sasi, and search"
        ));
    }

    if let Some(sasi) = view.sasi {
        if !container.shape().is_scalar_family() {
            return Err(scope
                .violation(
                    ViolationKind::AnnotationCombination,
                    "sasi indexes apply to scalar columns only"
                )
                .with_actual(container.shape().label()));
        }
        if sasi.mode == SasiMode::Contains && !sasi.analyzed {
            return Err(scope.violation(
                ViolationKind::AnnotationCombination,
                "sasi contains mode requires an analyzed column"
            ));
        }
        return Ok(IndexClassification::Advanced {
            name:   format!("{field_name}_index"),
            config: sasi
        });
    }

    if let Some(search) = view.search {
        if !container.shape().is_scalar_family() {
            return Err(scope
                .violation(
                    ViolationKind::AnnotationCombination,
                    "search indexes apply to scalar columns only"
                )
                .with_actual(container.shape().label()));
        }
        return Ok(IndexClassification::Search {
            full_text: search.full_text
        });
    }

    match container.shape() {
        TypeShape::Scalar(_) | TypeShape::ByteBuffer(_) | TypeShape::Enum => {
            let Some(config) = view.index else {
                return Ok(IndexClassification::None);
            };
            let category = if config.custom_class.is_some() {
                NativeCategory::Custom
            } else {
                NativeCategory::Normal
            };
            Ok(native(&config, category, field_name))
        }
        TypeShape::List | TypeShape::Set => {
            let element = chain.child_annotations(&container_path, 0);
            ensure_position_is_plain(scope, &element)?;
            match (view.index, element.index) {
                (Some(_), Some(_)) => Err(scope.violation(
                    ViolationKind::AnnotationCombination,
                    "container and element indexes are mutually exclusive"
                )),
                (Some(config), None) => {
                    let category = if config.custom_class.is_some() {
                        NativeCategory::Custom
                    } else if view.frozen {
                        NativeCategory::Full
                    } else {
                        NativeCategory::Collection
                    };
                    Ok(native(&config, category, field_name))
                }
                (None, Some(config)) => {
                    let category = if config.custom_class.is_some() {
                        NativeCategory::Custom
                    } else {
                        NativeCategory::Collection
                    };
                    Ok(native(&config, category, field_name))
                }
                (None, None) => Ok(IndexClassification::None)
            }
        }
        TypeShape::Map => {
            let key = chain.child_annotations(&container_path, 0);
            let value = chain.child_annotations(&container_path, 1);
            ensure_position_is_plain(scope, &key)?;
            ensure_position_is_plain(scope, &value)?;

            let positions = usize::from(view.index.is_some())
                + usize::from(key.index.is_some())
                + usize::from(value.index.is_some());
            if positions > 1 {
                return Err(scope.violation(
                    ViolationKind::AnnotationCombination,
                    "map container, key, and value indexes are mutually exclusive"
                ));
            }

            if let Some(config) = view.index {
                let category = if config.custom_class.is_some() {
                    NativeCategory::Custom
                } else if view.frozen {
                    NativeCategory::Full
                } else {
                    NativeCategory::MapEntry
                };
                return Ok(native(&config, category, field_name));
            }
            if let Some(config) = key.index {
                let category = if config.custom_class.is_some() {
                    NativeCategory::Custom
                } else {
                    NativeCategory::MapKey
                };
                return Ok(native(&config, category, field_name));
            }
            if let Some(config) = value.index {
                let category = if config.custom_class.is_some() {
                    NativeCategory::Custom
                } else {
                    NativeCategory::MapValue
                };
                return Ok(native(&config, category, field_name));
            }
            Ok(IndexClassification::None)
        }
        TypeShape::Tuple(_) | TypeShape::Composite => {
            let nested = chain.frames().iter().any(|frame| {
                frame.path().branches().starts_with(container_path.branches())
                    && frame.path() != &container_path
                    && frame.annotations().requests_index()
            });
            if view.index.is_some() || nested {
                return Err(scope.violation(
                    ViolationKind::AnnotationCombination,
                    "tuple and udt columns cannot carry a native index"
                ));
            }
            Ok(IndexClassification::None)
        }
        TypeShape::Optional => Ok(IndexClassification::None)
    }
}

struct ColumnIndexes {
    index:  Option<IndexConfig>,
    sasi:   Option<SasiConfig>,
    search: Option<SearchConfig>,
    frozen: bool
}

fn column_view(
    scope: &FieldScope<'_>,
    root: &AnnotationSet,
    container: &AnnotationSet,
    distinct: bool
) -> Result<ColumnIndexes, Diagnostic> {
    if !distinct {
        return Ok(ColumnIndexes {
            index:  root.index.clone(),
            sasi:   root.sasi.clone(),
            search: root.search,
            frozen: root.frozen
        });
    }
    if (root.index.is_some() && container.index.is_some())
        || (root.sasi.is_some() && container.sasi.is_some())
        || (root.search.is_some() && container.search.is_some())
    {
        return Err(scope.violation(
            ViolationKind::AnnotationCombination,
            "an index is declared on both the column and its unwrapped position"
        ));
    }
    Ok(ColumnIndexes {
        index:  root.index.clone().or_else(|| container.index.clone()),
        sasi:   root.sasi.clone().or_else(|| container.sasi.clone()),
        search: root.search.or(container.search),
        frozen: root.frozen || container.frozen
    })
}

fn ensure_position_is_plain(
    scope: &FieldScope<'_>,
    set: &AnnotationSet
) -> Result<(), Diagnostic> {
    if set.sasi.is_some() || set.search.is_some() {
        return Err(scope.violation(
            ViolationKind::AnnotationCombination,
            "sasi and search indexes apply to the column, not to nested positions"
        ));
    }
    Ok(())
}

fn native(config: &IndexConfig, category: NativeCategory, field_name: &str) -> IndexClassification {
    IndexClassification::Native {
        category,
        name: config
            .name
            .clone()
            .unwrap_or_else(|| format!("{field_name}_index")),
        custom_class: config.custom_class.clone(),
        options: config.options.clone()
    }
}
