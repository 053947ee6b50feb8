// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Codec resolution for scalar frames.
//!
//! [`resolve`] pairs a frame's declared type with a wire type and a
//! conversion strategy, trying rules in a fixed order:
//!
//! | # | Rule | Wire type |
//! |---|------|-----------|
//! | 1 | `json` annotation | `text` |
//! | 2 | `codec = Path<FROM, TO>` | native type of `TO` |
//! | 3 | `runtime_codec(target = ...)` | native type of the target |
//! | 4 | `enumerated` NAME / ORDINAL | `text` / `int` |
//! | 5 | byte buffer | registry entry, else `blob` |
//! | 6 | registry, else native identity | registered wire, else native |
//!
//! The first matching rule wins and later rules are never consulted, so
//! an enum with both `enumerated` and a registry entry encodes by
//! variant, not by the registered codec. Every branch starts by checking
//! a declared `computed` class against the field type.
//!
//! The registry holds explicit registrations keyed by canonical source
//! type. The first registration for a key wins; registering the same key
//! again is a registry diagnostic and leaves the existing entry intact.

use std::collections::HashMap;

use crate::{
    annotations::{EnumEncoding, ExplicitCodec},
    catalog::TypeCatalog,
    cursor::DecompositionFrame,
    diagnostics::{Diagnostic, FieldScope, ViolationKind},
    shape::{ByteBufferKind, TypeShape, display_type, native_of, type_key},
    wire::{NativeType, WireType}
};

/// How a resolved column converts between its declared type and the wire.
#[derive(Debug, Clone)]
pub enum CodecRef {
    /// JSON serialization into a text column.
    Json,

    /// The codec type named by `codec = Path<FROM, TO>`.
    Explicit {
        /// Codec type path, generic arguments included.
        path: syn::Path
    },

    /// A codec looked up from the session registry at run time.
    Runtime {
        /// Wire-side type the runtime codec converts to.
        target: syn::Type,

        /// Registered codec name, when one was declared.
        name: Option<String>
    },

    /// Enum stored by variant name as `text`.
    EnumName {
        /// Variant names in declaration order.
        variants: Vec<String>
    },

    /// Enum stored by declaration position as `int`.
    EnumOrdinal {
        /// Variant names in declaration order.
        variants: Vec<String>
    },

    /// Byte buffer stored as `blob`.
    ByteBuffer {
        /// Whether the buffer is `Box<[u8]>` rather than `Vec<u8>`.
        boxed: bool
    },

    /// The declared type maps to its native wire form unchanged.
    Identity
}

/// A resolved pairing of source type, wire type, and conversion.
#[derive(Debug, Clone)]
pub struct CodecDescriptor {
    source: String,
    wire:   WireType,
    codec:  CodecRef
}

impl CodecDescriptor {
    /// Describe a conversion for `source`, keyed by canonical token form.
    #[must_use]
    pub fn new(source: impl Into<String>, wire: WireType, codec: CodecRef) -> Self {
        Self {
            source: source.into(),
            wire,
            codec
        }
    }

    /// Canonical key of the source type.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Wire type this codec reads and writes.
    #[must_use]
    pub fn wire(&self) -> &WireType {
        &self.wire
    }

    /// Conversion strategy.
    #[must_use]
    pub fn codec(&self) -> &CodecRef {
        &self.codec
    }
}

/// Explicit codec registrations, keyed by canonical source type.
#[derive(Debug, Default)]
pub struct CodecRegistry {
    entries: HashMap<String, CodecDescriptor>
}

impl CodecRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a codec for its source type.
    ///
    /// # Errors
    ///
    /// Returns a registry diagnostic when the source type already has a
    /// codec. The existing entry is kept.
    pub fn register(&mut self, descriptor: CodecDescriptor) -> Result<(), Diagnostic> {
        let key = descriptor.source.clone();
        if self.entries.contains_key(&key) {
            return Err(Diagnostic::registry(
                key,
                "duplicate codec registration; the first registration is kept"
            ));
        }
        self.entries.insert(key, descriptor);
        Ok(())
    }

    /// Codec registered for a canonical source key.
    #[must_use]
    pub fn lookup(&self, source: &str) -> Option<&CodecDescriptor> {
        self.entries.get(source)
    }

    /// Number of registered codecs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no codec has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the conversion for a scalar-family frame.
///
/// # Errors
///
/// Returns a diagnostic when an annotation payload does not fit the
/// declared type, or when no rule maps the type to a wire form.
pub fn resolve(
    scope: &FieldScope<'_>,
    frame: &DecompositionFrame,
    registry: &CodecRegistry,
    catalog: &TypeCatalog
) -> Result<CodecDescriptor, Diagnostic> {
    let ty = frame.ty();
    let set = frame.annotations();
    let key = type_key(ty);

    if let Some(computed) = &set.computed {
        let declared = type_key(&computed.cql_class);
        if declared != key {
            return Err(scope
                .violation(
                    ViolationKind::TypeMismatch,
                    "computed column class must equal the field type"
                )
                .with_expected(key.clone())
                .with_actual(declared)
                .with_span(computed.span));
        }
    }

    if set.json {
        return Ok(CodecDescriptor::new(
            key,
            WireType::Native(NativeType::Text),
            CodecRef::Json
        ));
    }

    if let Some(explicit) = &set.codec {
        return resolve_explicit(scope, explicit, &key);
    }

    if let Some(runtime) = &set.runtime_codec {
        let Some(native) = native_of(&runtime.target) else {
            return Err(scope
                .violation(
                    ViolationKind::TypeMismatch,
                    "runtime codec target must be a supported native type"
                )
                .with_actual(display_type(&runtime.target))
                .with_span(runtime.span));
        };
        return Ok(CodecDescriptor::new(
            key,
            WireType::Native(native),
            CodecRef::Runtime {
                target: runtime.target.clone(),
                name:   runtime.name.clone()
            }
        ));
    }

    if let Some(encoding) = set.enumerated {
        let Some(variants) = catalog.enum_variants(ty) else {
            return Err(scope
                .violation(
                    ViolationKind::TypeMismatch,
                    "enum encoding requires a catalog-registered enum type"
                )
                .with_actual(display_type(ty)));
        };
        let variants = variants.to_vec();
        return Ok(match encoding {
            EnumEncoding::Name => CodecDescriptor::new(
                key,
                WireType::Native(NativeType::Text),
                CodecRef::EnumName { variants }
            ),
            EnumEncoding::Ordinal => CodecDescriptor::new(
                key,
                WireType::Native(NativeType::Int),
                CodecRef::EnumOrdinal { variants }
            )
        });
    }

    if let TypeShape::ByteBuffer(kind) = frame.shape() {
        if let Some(registered) = registry.lookup(&key) {
            return Ok(registered.clone());
        }
        return Ok(CodecDescriptor::new(
            key,
            WireType::Native(NativeType::Blob),
            CodecRef::ByteBuffer {
                boxed: kind == ByteBufferKind::Boxed
            }
        ));
    }

    if let Some(registered) = registry.lookup(&key) {
        return Ok(registered.clone());
    }

    let Some(native) = native_of(ty) else {
        return Err(scope
            .violation(ViolationKind::TypeMismatch, "no codec resolves the declared type")
            .with_expected("a supported native type or a registered codec")
            .with_actual(display_type(ty)));
    };

    let wire = if set.time_uuid {
        if native != NativeType::Uuid {
            return Err(scope
                .violation(
                    ViolationKind::TypeMismatch,
                    "time-ordered uuid encoding requires a Uuid source"
                )
                .with_expected("Uuid")
                .with_actual(display_type(ty)));
        }
        NativeType::Timeuuid
    } else if set.ascii {
        if native != NativeType::Text {
            return Err(scope
                .violation(ViolationKind::TypeMismatch, "ascii encoding requires a String source")
                .with_expected("String")
                .with_actual(display_type(ty)));
        }
        NativeType::Ascii
    } else {
        native
    };

    Ok(CodecDescriptor::new(key, WireType::Native(wire), CodecRef::Identity))
}

fn resolve_explicit(
    scope: &FieldScope<'_>,
    explicit: &ExplicitCodec,
    key: &str
) -> Result<CodecDescriptor, Diagnostic> {
    let Some(segment) = explicit.path.segments.last() else {
        return Err(scope
            .violation(ViolationKind::Cardinality, "explicit codec path has no segments")
            .with_span(explicit.span));
    };
    let arguments: Vec<&syn::Type> = match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None
            })
            .collect(),
        _ => Vec::new()
    };
    if arguments.len() != 2 {
        return Err(scope
            .violation(
                ViolationKind::Cardinality,
                "explicit codec must declare exactly two type arguments"
            )
            .with_expected("(FROM, TO)")
            .with_actual(format!("{} type arguments", arguments.len()))
            .with_span(explicit.span));
    }

    let from = arguments[0];
    let to = arguments[1];
    if type_key(from) != key {
        return Err(scope
            .violation(
                ViolationKind::TypeMismatch,
                "explicit codec FROM argument must equal the field type"
            )
            .with_expected(key.to_string())
            .with_actual(display_type(from))
            .with_span(explicit.span));
    }
    let Some(native) = native_of(to) else {
        return Err(scope
            .violation(
                ViolationKind::TypeMismatch,
                "explicit codec TO argument must be a supported native type"
            )
            .with_actual(display_type(to))
            .with_span(explicit.span));
    };

    Ok(CodecDescriptor::new(
        key,
        WireType::Native(native),
        CodecRef::Explicit {
            path: explicit.path.clone()
        }
    ))
}
