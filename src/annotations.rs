// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Mapping annotation model.
//!
//! A closed vocabulary of `#[cql(...)]` annotations controls how a field is
//! carried on the wire. This module holds the typed annotation set and
//! delegates payload definitions and attribute extraction to submodules:
//!
//! ```text
//! annotations.rs (coordinator)
//! ├── codec.rs   - codec, runtime codec, computed, enum encoding payloads
//! ├── index.rs   - native index, SASI, and search payloads
//! └── extract.rs - #[cql(...)] attribute grammar
//! ```
//!
//! # Annotation Vocabulary
//!
//! | Annotation | Slot |
//! |------------|------|
//! | `json` | whole-value JSON transform |
//! | `enumerated(name \| ordinal)` | enum wire encoding |
//! | `codec = Path<FROM, TO>` | explicit codec |
//! | `runtime_codec(target = T, name = "...")` | runtime-bound codec |
//! | `computed(function, alias, cql_class, targets)` | computed projection |
//! | `counter`, `static_column`, `partition_key`, `clustering_column` | column roles |
//! | `time_uuid`, `ascii` | native wire adjustments |
//! | `index(...)`, `sasi(...)`, `search(...)` | secondary indexes |
//! | `frozen`, `empty_if_null` | collection handling |

mod codec;
mod extract;
mod index;

pub use codec::{ComputedColumn, EnumEncoding, ExplicitCodec, RuntimeCodec};
pub use extract::{PathAnnotations, field_annotations};
pub use index::{IndexConfig, Normalization, SasiConfig, SasiMode, SearchConfig};
use proc_macro2::Span;

/// Names of the annotation vocabulary, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    /// `json`.
    Json,

    /// `enumerated`.
    Enumerated,

    /// `codec`.
    Codec,

    /// `runtime_codec`.
    RuntimeCodec,

    /// `computed`.
    Computed,

    /// `counter`.
    Counter,

    /// `time_uuid`.
    TimeUuid,

    /// `ascii`.
    Ascii,

    /// `index`.
    Index,

    /// `sasi`.
    Sasi,

    /// `search`.
    Search,

    /// `partition_key`.
    PartitionKey,

    /// `clustering_column`.
    ClusteringColumn,

    /// `static_column`.
    StaticColumn,

    /// `frozen`.
    Frozen,

    /// `empty_if_null`.
    EmptyIfNull
}

impl AnnotationKind {
    /// The annotation token as written by users.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Enumerated => "enumerated",
            Self::Codec => "codec",
            Self::RuntimeCodec => "runtime_codec",
            Self::Computed => "computed",
            Self::Counter => "counter",
            Self::TimeUuid => "time_uuid",
            Self::Ascii => "ascii",
            Self::Index => "index",
            Self::Sasi => "sasi",
            Self::Search => "search",
            Self::PartitionKey => "partition_key",
            Self::ClusteringColumn => "clustering_column",
            Self::StaticColumn => "static_column",
            Self::Frozen => "frozen",
            Self::EmptyIfNull => "empty_if_null"
        }
    }
}

/// Payload of `partition_key(...)`.
#[derive(Debug, Clone)]
pub struct KeyOrder {
    /// 1-based position among the record's partition key components.
    pub order: u32,

    /// Annotation span for diagnostics.
    pub span: Span
}

/// Payload of `clustering_column(...)`.
#[derive(Debug, Clone)]
pub struct ClusteringOrder {
    /// 1-based position among the record's clustering columns.
    pub order: u32,

    /// Ascending (`asc`, default) or descending (`desc`) sort.
    pub ascending: bool,

    /// Annotation span for diagnostics.
    pub span: Span
}

/// The full annotation set attached to one frame of a field.
///
/// One slot per annotation kind, so slot uniqueness is structural.
/// Extraction rejects duplicate declarations before a set is built.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    /// `json` — serialize the whole value as JSON text.
    pub json: bool,

    /// `enumerated(...)` — enum wire encoding.
    pub enumerated: Option<EnumEncoding>,

    /// `codec = Path<FROM, TO>` — explicit codec.
    pub codec: Option<ExplicitCodec>,

    /// `runtime_codec(...)` — codec bound at runtime.
    pub runtime_codec: Option<RuntimeCodec>,

    /// `computed(...)` — computed projection column.
    pub computed: Option<ComputedColumn>,

    /// `counter` — counter column.
    pub counter: bool,

    /// `time_uuid` — store a `Uuid` source as `timeuuid`.
    pub time_uuid: bool,

    /// `ascii` — store a `String` source as `ascii`.
    pub ascii: bool,

    /// `index(...)` — native secondary index.
    pub index: Option<IndexConfig>,

    /// `sasi(...)` — SASI index.
    pub sasi: Option<SasiConfig>,

    /// `search(...)` — search index.
    pub search: Option<SearchConfig>,

    /// `partition_key(...)` — partition key component.
    pub partition_key: Option<KeyOrder>,

    /// `clustering_column(...)` — clustering component.
    pub clustering: Option<ClusteringOrder>,

    /// `static_column` — shared across a partition.
    pub static_column: bool,

    /// `frozen` — frozen collection or UDT on the wire.
    pub frozen: bool,

    /// `empty_if_null` — empty collection instead of null.
    pub empty_if_null: bool
}

impl AnnotationSet {
    /// Whether any index annotation (native, SASI, or search) is present.
    #[must_use]
    pub fn requests_index(&self) -> bool {
        self.index.is_some() || self.sasi.is_some() || self.search.is_some()
    }

    /// The role-marking annotations present, in precedence order, for
    /// mutual-exclusivity diagnostics.
    #[must_use]
    pub fn role_markers(&self) -> Vec<AnnotationKind> {
        let mut markers = Vec::new();
        if self.partition_key.is_some() {
            markers.push(AnnotationKind::PartitionKey);
        }
        if self.clustering.is_some() {
            markers.push(AnnotationKind::ClusteringColumn);
        }
        if self.static_column {
            markers.push(AnnotationKind::StaticColumn);
        }
        if self.computed.is_some() {
            markers.push(AnnotationKind::Computed);
        }
        if self.counter {
            markers.push(AnnotationKind::Counter);
        }
        markers
    }
}
