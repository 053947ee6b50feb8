// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! # Module map
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`shape`] | classify declared types into wire shapes |
//! | [`cursor`] | decompose a field into an ordered frame chain |
//! | [`annotations`] | extract and model `#[cql(...)]` attributes |
//! | [`catalog`] | registered enum and composite types |
//! | [`codec`] | codec resolution and the codec registry |
//! | [`column`] | column role resolution |
//! | [`index`] | secondary index classification |
//! | [`metadata`] | the resolution pipeline and its outputs |
//! | [`context`] | per-run registry, cache, and diagnostics |
//! | [`diagnostics`] | structured violation reporting |
//! | [`wire`] | CQL wire type model and rendering |
//!
//! Most hosts only touch [`ResolutionContext`], [`TypeCatalog`], and the
//! [`metadata`] outputs; the rest is exposed for tools that need the
//! intermediate layers.

pub mod annotations;
pub mod catalog;
pub mod codec;
pub mod column;
pub mod context;
pub mod cursor;
pub mod diagnostics;
pub mod index;
pub mod metadata;
pub mod shape;
pub mod wire;

pub use catalog::TypeCatalog;
pub use codec::{CodecDescriptor, CodecRef, CodecRegistry};
pub use column::ColumnRole;
pub use context::ResolutionContext;
pub use diagnostics::{Diagnostic, Diagnostics, ViolationKind};
pub use index::{IndexClassification, NativeCategory};
pub use metadata::{FieldMetadataSignature, RecordMetadata, RecordSource};
pub use wire::{NativeType, WireType};
