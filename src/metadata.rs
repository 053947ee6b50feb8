// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field metadata resolution.
//!
//! ## Architecture
//!
//! ```text
//! metadata
//! ├── source     parsed records and fields, annotations attached
//! ├── signature  resolved per-column metadata
//! ├── cache      composite memoization
//! └── builder    the resolution pipeline over frame chains
//! ```
//!
//! [`RecordSource`] is what goes in, [`RecordMetadata`] is what comes
//! out, and everything between runs through the builder.

mod builder;
mod cache;
mod signature;
mod source;

pub(crate) use builder::FieldResolver;
pub use builder::RecordMetadata;
pub use cache::{CompositeCache, CompositeEntry};
pub use signature::{AccessorBindings, FieldMapping, FieldMetadataSignature};
pub use source::{FieldSource, RecordSource};
