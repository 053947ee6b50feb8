// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! The resolution pipeline.
//!
//! One record resolves field by field; one field resolves by walking its
//! frame chain in declaration order. Failures never abort the record:
//! each failed field contributes a diagnostic and the remaining fields
//! still resolve, so a single pass reports everything that is wrong.
//!
//! ```text
//! RecordSource
//!   └─ per field
//!        ├─ FrameChain::build      shape tree + annotations
//!        ├─ ColumnRole::resolve    role markers
//!        ├─ classify_index         index annotations
//!        └─ resolve_mapping        codecs, wire types, nesting
//! ```
//!
//! Composite fields recurse through the same pipeline with the composite
//! record as scope, memoized in the [`CompositeCache`].

use std::sync::Arc;

use convert_case::{Case, Casing};

use super::{
    cache::{CacheState, CompositeCache, CompositeEntry},
    signature::{AccessorBindings, FieldMapping, FieldMetadataSignature},
    source::{FieldSource, RecordSource}
};
use crate::{
    catalog::TypeCatalog,
    codec::{self, CodecDescriptor, CodecRef, CodecRegistry},
    column::ColumnRole,
    cursor::{FrameChain, FramePath},
    diagnostics::{Diagnostic, Diagnostics, FieldScope, ViolationKind},
    index::{IndexClassification, classify_index},
    shape::{TypeShape, type_key},
    wire::{NativeType, WireType}
};

/// Resolved metadata of one record.
#[derive(Debug, Clone)]
pub struct RecordMetadata {
    /// Record type name.
    pub record: String,

    /// One signature per resolved field, in declaration order. Fields
    /// that failed to resolve are absent here; their diagnostics live on
    /// the resolution context.
    pub fields: Vec<FieldMetadataSignature>
}

impl RecordMetadata {
    /// Signature of the named field, if it resolved.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldMetadataSignature> {
        self.fields.iter().find(|field| field.field == name)
    }
}

/// Frozen and empty-if-null flags flowing from outer positions into
/// nested ones.
#[derive(Debug, Clone, Copy, Default)]
struct Inherited {
    frozen:        bool,
    empty_if_null: bool
}

/// Walks records and fields against a fixed catalog and registry,
/// accumulating into a shared cache and diagnostics sink.
pub(crate) struct FieldResolver<'a> {
    pub(crate) catalog:     &'a TypeCatalog,
    pub(crate) registry:    &'a CodecRegistry,
    pub(crate) cache:       &'a mut CompositeCache,
    pub(crate) diagnostics: &'a mut Diagnostics
}

impl FieldResolver<'_> {
    pub(crate) fn resolve_record(&mut self, source: &RecordSource) -> RecordMetadata {
        let record = source.name();
        let mut fields = Vec::with_capacity(source.fields().len());
        for field in source.fields() {
            match self.resolve_field(&record, field) {
                Ok(signature) => fields.push(signature),
                Err(diagnostic) => self.diagnostics.push(diagnostic)
            }
        }
        RecordMetadata { record, fields }
    }

    fn resolve_field(
        &mut self,
        record: &str,
        field: &FieldSource
    ) -> Result<FieldMetadataSignature, Diagnostic> {
        let name = field.name();
        let scope = FieldScope {
            record,
            field: &name
        };

        let mut chain =
            FrameChain::build(record, &name, field.ty(), field.annotations(), self.catalog)?;
        let own = chain.current().annotations().clone();

        // Both flags look through optional wrappers at the stored shape.
        let effective = effective_shape(&chain);
        if own.frozen && effective.is_scalar_family() {
            return Err(scope
                .violation(
                    ViolationKind::AnnotationCombination,
                    "frozen applies to collection, tuple, and udt columns"
                )
                .with_actual(effective.label()));
        }
        if own.empty_if_null && !effective.is_collection() {
            return Err(scope
                .violation(
                    ViolationKind::AnnotationCombination,
                    "empty_if_null applies to collection columns"
                )
                .with_actual(effective.label()));
        }

        let role = ColumnRole::resolve(&scope, &own, field.ty())?;
        let index = classify_index(&scope, &chain, &FramePath::root(), &name)?;

        let mut signature =
            self.resolve_mapping(&scope, &mut chain, name.clone(), Inherited::default())?;

        signature.column = match &role {
            ColumnRole::Computed { alias, .. } => alias.clone(),
            _ => name.to_case(Case::Snake)
        };
        if role.is_counter() {
            // Counters are declared as i64 but live in counter cells.
            let wire = WireType::Native(NativeType::Counter);
            signature.mapping = FieldMapping::Scalar(CodecDescriptor::new(
                type_key(field.ty()),
                wire.clone(),
                CodecRef::Identity
            ));
            signature.wire = wire;
        }
        signature.field = name;
        signature.role = role;
        signature.index = index;
        signature.accessors =
            AccessorBindings::entity(field.ident(), field.no_getter(), field.no_setter());

        Ok(signature)
    }

    fn resolve_mapping(
        &mut self,
        scope: &FieldScope<'_>,
        chain: &mut FrameChain,
        label: String,
        inherited: Inherited
    ) -> Result<FieldMetadataSignature, Diagnostic> {
        let frame = chain.current().clone();
        let set = frame.annotations();
        let frozen_here = set.frozen || inherited.frozen;
        let empty_here = set.empty_if_null || inherited.empty_if_null;
        let downward = Inherited {
            frozen:        frozen_here,
            empty_if_null: empty_here
        };

        match frame.shape() {
            TypeShape::Scalar(_) | TypeShape::ByteBuffer(_) | TypeShape::Enum => {
                let descriptor = codec::resolve(scope, &frame, self.registry, self.catalog)?;
                Ok(FieldMetadataSignature {
                    field: label.clone(),
                    column: label.to_case(Case::Snake),
                    role: ColumnRole::Normal,
                    frozen: false,
                    empty_if_null: false,
                    index: IndexClassification::None,
                    wire: descriptor.wire().clone(),
                    mapping: FieldMapping::Scalar(descriptor),
                    accessors: AccessorBindings::Structural
                })
            }
            TypeShape::Optional => {
                step(scope, chain)?;
                let inner = self.resolve_mapping(scope, chain, label.clone(), downward)?;
                Ok(FieldMetadataSignature {
                    field: label.clone(),
                    column: label.to_case(Case::Snake),
                    role: ColumnRole::Normal,
                    frozen: inner.frozen,
                    empty_if_null: inner.empty_if_null,
                    index: IndexClassification::None,
                    wire: inner.wire.clone(),
                    mapping: FieldMapping::Optional {
                        inner: Box::new(inner)
                    },
                    accessors: AccessorBindings::Structural
                })
            }
            TypeShape::List | TypeShape::Set => {
                step(scope, chain)?;
                let element = self.resolve_mapping(scope, chain, "element".to_string(), downward)?;
                let inner = Box::new(element.wire.clone());
                let mut wire = if frame.shape() == TypeShape::List {
                    WireType::List(inner)
                } else {
                    WireType::Set(inner)
                };
                if frozen_here {
                    wire = WireType::frozen(wire);
                }
                let element = Box::new(element);
                let mapping = if frame.shape() == TypeShape::List {
                    FieldMapping::List { element }
                } else {
                    FieldMapping::Set { element }
                };
                Ok(FieldMetadataSignature {
                    field: label.clone(),
                    column: label.to_case(Case::Snake),
                    role: ColumnRole::Normal,
                    frozen: frozen_here,
                    empty_if_null: empty_here,
                    index: IndexClassification::None,
                    wire,
                    mapping,
                    accessors: AccessorBindings::Structural
                })
            }
            TypeShape::Map => {
                step(scope, chain)?;
                let key = self.resolve_mapping(scope, chain, "key".to_string(), downward)?;
                step(scope, chain)?;
                let value = self.resolve_mapping(scope, chain, "value".to_string(), downward)?;
                let mut wire =
                    WireType::Map(Box::new(key.wire.clone()), Box::new(value.wire.clone()));
                if frozen_here {
                    wire = WireType::frozen(wire);
                }
                Ok(FieldMetadataSignature {
                    field: label.clone(),
                    column: label.to_case(Case::Snake),
                    role: ColumnRole::Normal,
                    frozen: frozen_here,
                    empty_if_null: empty_here,
                    index: IndexClassification::None,
                    wire,
                    mapping: FieldMapping::Map {
                        key:   Box::new(key),
                        value: Box::new(value)
                    },
                    accessors: AccessorBindings::Structural
                })
            }
            TypeShape::Tuple(arity) => {
                let mut elements = Vec::with_capacity(arity);
                for position in 0..arity {
                    step(scope, chain)?;
                    let element =
                        self.resolve_mapping(scope, chain, position.to_string(), downward)?;
                    elements.push(element);
                }
                // Tuples are always frozen on the wire.
                let wire = WireType::frozen(WireType::Tuple(
                    elements.iter().map(|element| element.wire.clone()).collect()
                ));
                Ok(FieldMetadataSignature {
                    field: label.clone(),
                    column: label.to_case(Case::Snake),
                    role: ColumnRole::Normal,
                    frozen: true,
                    empty_if_null: false,
                    index: IndexClassification::None,
                    wire,
                    mapping: FieldMapping::Tuple { elements },
                    accessors: AccessorBindings::Structural
                })
            }
            TypeShape::Composite => {
                let entry = self.composite_entry(scope, frame.ty())?;
                let mut wire = entry.wire.clone();
                if frozen_here {
                    wire = WireType::frozen(wire);
                }
                Ok(FieldMetadataSignature {
                    field: label.clone(),
                    column: label.to_case(Case::Snake),
                    role: ColumnRole::Normal,
                    frozen: frozen_here,
                    empty_if_null: false,
                    index: IndexClassification::None,
                    wire,
                    mapping: FieldMapping::Composite {
                        udt:    entry.udt,
                        fields: entry.fields
                    },
                    accessors: AccessorBindings::Structural
                })
            }
        }
    }

    fn composite_entry(
        &mut self,
        scope: &FieldScope<'_>,
        ty: &syn::Type
    ) -> Result<CompositeEntry, Diagnostic> {
        let Some(source) = self.catalog.composite(ty) else {
            return Err(scope.violation(
                ViolationKind::DependencyUnresolved,
                "composite type is not registered in the catalog"
            ));
        };
        let source = source.clone();
        let key = source.name();

        match self.cache.state(&key) {
            CacheState::Resolved(entry) => return Ok(entry),
            CacheState::Failed => {
                return Err(scope
                    .violation(
                        ViolationKind::DependencyUnresolved,
                        "composite type previously failed to resolve"
                    )
                    .with_actual(key));
            }
            CacheState::InProgress => {
                return Err(scope
                    .violation(
                        ViolationKind::DependencyUnresolved,
                        "composite type participates in a reference cycle"
                    )
                    .with_actual(key));
            }
            CacheState::Absent => {}
        }

        self.cache.begin(key.clone());
        let mut members = Vec::with_capacity(source.fields().len());
        let mut failed = false;
        for member in source.fields() {
            match self.resolve_field(&key, member) {
                Ok(signature) => members.push(signature),
                Err(diagnostic) => {
                    self.diagnostics.push(diagnostic);
                    failed = true;
                }
            }
        }
        if failed {
            self.cache.fail(key.clone());
            return Err(scope
                .violation(
                    ViolationKind::DependencyUnresolved,
                    "composite type failed to resolve"
                )
                .with_actual(key));
        }

        let udt = key.to_case(Case::Snake);
        let entry = CompositeEntry {
            udt:    udt.clone(),
            fields: Arc::new(members),
            wire:   WireType::Udt(udt)
        };
        Ok(self.cache.resolve(key, entry))
    }
}

fn step(scope: &FieldScope<'_>, chain: &mut FrameChain) -> Result<(), Diagnostic> {
    if chain.advance().is_err() {
        return Err(scope.violation(
            ViolationKind::Cardinality,
            "decomposition ended before every declared position was resolved"
        ));
    }
    Ok(())
}

fn effective_shape(chain: &FrameChain) -> TypeShape {
    let mut path = FramePath::root();
    loop {
        let Some(frame) = chain.frame_at(&path) else {
            return TypeShape::Optional;
        };
        if frame.shape() != TypeShape::Optional {
            return frame.shape();
        }
        path = path.child(0);
    }
}
