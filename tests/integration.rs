// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! End-to-end resolution through the public API.

use std::sync::Arc;

use cql_mapper_meta::{
    CodecDescriptor, CodecRef, ColumnRole, IndexClassification, NativeCategory, NativeType,
    RecordSource, ResolutionContext, TypeCatalog, ViolationKind, WireType,
    annotations::SasiMode,
    metadata::{AccessorBindings, FieldMapping, FieldMetadataSignature, RecordMetadata}
};
use syn::parse_quote;

fn record(input: syn::DeriveInput) -> RecordSource {
    match RecordSource::from_derive_input(&input) {
        Ok(source) => source,
        Err(err) => panic!("record should parse: {err}")
    }
}

fn field<'a>(metadata: &'a RecordMetadata, name: &str) -> &'a FieldMetadataSignature {
    match metadata.field(name) {
        Some(signature) => signature,
        None => panic!("field {name} should have resolved")
    }
}

#[test]
fn sensor_record_resolves_every_field() {
    let source = record(parse_quote! {
        struct Sensor {
            #[cql(partition_key)]
            id: i64,
            #[cql(clustering_column(order = 1, desc))]
            recordedAt: chrono::NaiveDateTime,
            #[cql(frozen, index(name = "tags_idx"))]
            tags: HashSet<String>,
            #[cql(sasi(mode = "contains", analyzed))]
            location: String,
            #[cql(computed(function = "writetime", alias = "wt", cql_class = f64))]
            reading: f64,
            calibration: Option<(i32, String)>
        }
    });

    let mut context = ResolutionContext::new();
    let metadata = context.resolve_record(&source, &TypeCatalog::new());
    assert!(!context.has_failures());
    assert_eq!(metadata.record, "Sensor");
    assert_eq!(metadata.fields.len(), 6);

    let id = field(&metadata, "id");
    assert_eq!(id.role, ColumnRole::Partition { order: 1 });
    assert_eq!(id.column, "id");
    assert_eq!(id.wire.rendered(), "bigint");

    let recorded = field(&metadata, "recordedAt");
    assert_eq!(recorded.column, "recorded_at");
    assert_eq!(
        recorded.role,
        ColumnRole::Clustering {
            order:     1,
            ascending: false
        }
    );
    assert_eq!(recorded.wire.rendered(), "timestamp");

    let tags = field(&metadata, "tags");
    assert!(tags.frozen);
    assert_eq!(tags.wire.rendered(), "frozen<set<text>>");
    let IndexClassification::Native { category, name, .. } = &tags.index else {
        panic!("tags should carry a native index");
    };
    assert_eq!(*category, NativeCategory::Full);
    assert_eq!(name, "tags_idx");

    let location = field(&metadata, "location");
    let IndexClassification::Advanced { name, config } = &location.index else {
        panic!("location should carry a sasi index");
    };
    assert_eq!(name, "location_index");
    assert_eq!(config.mode, SasiMode::Contains);
    assert!(config.analyzed);

    let reading = field(&metadata, "reading");
    assert_eq!(reading.column, "wt");
    let ColumnRole::Computed { function, cql_class, .. } = &reading.role else {
        panic!("reading should resolve as a computed column");
    };
    assert_eq!(function, "writetime");
    let declared: syn::Type = parse_quote!(f64);
    assert_eq!(cql_class, &declared);

    let calibration = field(&metadata, "calibration");
    assert_eq!(calibration.wire.rendered(), "frozen<tuple<int, text>>");
    let FieldMapping::Optional { inner } = &calibration.mapping else {
        panic!("calibration should map through its optional wrapper");
    };
    assert!(matches!(inner.mapping, FieldMapping::Tuple { .. }));
}

#[test]
fn json_column_short_circuits_nested_resolution() {
    let mut catalog = TypeCatalog::new();
    catalog.register_composite(record(parse_quote! {
        struct Profile {
            bio: String
        }
    }));

    let source = record(parse_quote! {
        struct Account {
            #[cql(json)]
            profile: Profile
        }
    });

    let mut context = ResolutionContext::new();
    let metadata = context.resolve_record(&source, &catalog);
    assert!(!context.has_failures());

    let profile = field(&metadata, "profile");
    assert_eq!(profile.wire.rendered(), "text");
    let FieldMapping::Scalar(descriptor) = &profile.mapping else {
        panic!("json columns resolve as scalars");
    };
    assert!(matches!(descriptor.codec(), CodecRef::Json));
}

#[test]
fn enum_encoding_outranks_a_registered_codec() {
    let mut catalog = TypeCatalog::new();
    catalog.register_enum_variants(
        "Status",
        vec!["Active".to_string(), "Suspended".to_string(), "Closed".to_string()]
    );

    let mut context = ResolutionContext::new();
    let seeded = CodecDescriptor::new(
        "Status",
        WireType::Native(NativeType::Bigint),
        CodecRef::Identity
    );
    assert!(context.register_codec(seeded).is_ok());

    let source = record(parse_quote! {
        struct Order {
            #[cql(enumerated(ordinal))]
            status: Status
        }
    });
    let metadata = context.resolve_record(&source, &catalog);
    assert!(!context.has_failures());

    let status = field(&metadata, "status");
    assert_eq!(status.wire.rendered(), "int");
    let FieldMapping::Scalar(descriptor) = &status.mapping else {
        panic!("enums resolve as scalars");
    };
    let CodecRef::EnumOrdinal { variants } = descriptor.codec() else {
        panic!("ordinal encoding should win over the registry");
    };
    assert_eq!(variants.len(), 3);
}

#[test]
fn duplicate_codec_registration_keeps_the_first() {
    let mut context = ResolutionContext::new();
    let first = CodecDescriptor::new(
        "money::Price",
        WireType::Native(NativeType::Bigint),
        CodecRef::Identity
    );
    let second = CodecDescriptor::new(
        "money::Price",
        WireType::Native(NativeType::Text),
        CodecRef::Identity
    );
    assert!(context.register_codec(first).is_ok());
    assert!(context.register_codec(second).is_err());

    let source = record(parse_quote! {
        struct Invoice {
            total: money::Price
        }
    });
    let metadata = context.resolve_record(&source, &TypeCatalog::new());
    assert_eq!(field(&metadata, "total").wire.rendered(), "bigint");

    let diagnostics = context.into_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    let registry = match diagnostics.iter().next() {
        Some(diagnostic) => diagnostic,
        None => panic!("the duplicate should be recorded")
    };
    assert_eq!(registry.kind(), ViolationKind::Registry);
}

#[test]
fn every_broken_field_is_diagnosed_in_one_pass() {
    let source = record(parse_quote! {
        struct Broken {
            #[cql(partition_key, counter)]
            id: i64,
            #[cql(counter)]
            label: String,
            #[cql(index, element(index))]
            tags: Vec<String>,
            fine: i32
        }
    });

    let mut context = ResolutionContext::new();
    let metadata = context.resolve_record(&source, &TypeCatalog::new());

    assert_eq!(metadata.fields.len(), 1);
    assert_eq!(metadata.fields[0].field, "fine");

    let diagnostics = context.into_diagnostics();
    assert_eq!(diagnostics.len(), 3);
    let kinds: Vec<ViolationKind> = diagnostics.iter().map(|d| d.kind()).collect();
    assert!(kinds.contains(&ViolationKind::AnnotationCombination));
    assert!(kinds.contains(&ViolationKind::TypeMismatch));
}

#[test]
fn udt_fields_share_one_cached_resolution() {
    let mut catalog = TypeCatalog::new();
    catalog.register_composite(record(parse_quote! {
        struct Address {
            #[cql(ascii)]
            country: String,
            zip: String
        }
    }));

    let source = record(parse_quote! {
        struct Customer {
            #[cql(partition_key)]
            id:       i64,
            billing:  Address,
            shipping: Address
        }
    });

    let mut context = ResolutionContext::new();
    let metadata = context.resolve_record(&source, &catalog);
    assert!(!context.has_failures());

    let billing = field(&metadata, "billing");
    assert_eq!(billing.wire.rendered(), "address");
    let FieldMapping::Composite { udt, fields: first } = &billing.mapping else {
        panic!("billing should map as a composite");
    };
    assert_eq!(udt, "address");
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].wire.rendered(), "ascii");
    assert!(matches!(first[0].accessors, AccessorBindings::Entity { .. }));

    let FieldMapping::Composite { fields: second, .. } = &field(&metadata, "shipping").mapping
    else {
        panic!("shipping should map as a composite");
    };
    assert!(Arc::ptr_eq(first, second));
}

#[test]
fn frozen_udt_wraps_the_wire_type() {
    let mut catalog = TypeCatalog::new();
    catalog.register_composite(record(parse_quote! {
        struct Address {
            street: String
        }
    }));

    let source = record(parse_quote! {
        struct Customer {
            #[cql(frozen)]
            home: Address
        }
    });

    let mut context = ResolutionContext::new();
    let metadata = context.resolve_record(&source, &catalog);
    assert!(!context.has_failures());
    assert_eq!(field(&metadata, "home").wire.rendered(), "frozen<address>");
}

#[test]
fn map_positions_resolve_with_annotations_applied() {
    let source = record(parse_quote! {
        struct Page {
            #[cql(key(ascii), value(element(time_uuid)), empty_if_null)]
            revisions: HashMap<String, Vec<Uuid>>
        }
    });

    let mut context = ResolutionContext::new();
    let metadata = context.resolve_record(&source, &TypeCatalog::new());
    assert!(!context.has_failures());

    let revisions = field(&metadata, "revisions");
    assert!(revisions.empty_if_null);
    assert_eq!(revisions.wire.rendered(), "map<ascii, list<timeuuid>>");

    let FieldMapping::Map { key, value } = &revisions.mapping else {
        panic!("expected a map mapping");
    };
    assert_eq!(key.wire.rendered(), "ascii");
    let FieldMapping::List { element } = &value.mapping else {
        panic!("expected a list mapping on the value side");
    };
    assert_eq!(element.wire.rendered(), "timeuuid");
}

#[test]
fn static_counter_resolves_counter_cells() {
    let source = record(parse_quote! {
        struct Tally {
            #[cql(partition_key)]
            board: i64,
            #[cql(static_column, counter)]
            total: i64
        }
    });

    let mut context = ResolutionContext::new();
    let metadata = context.resolve_record(&source, &TypeCatalog::new());
    assert!(!context.has_failures());

    let total = field(&metadata, "total");
    assert_eq!(total.role, ColumnRole::StaticCounter);
    assert_eq!(total.wire.rendered(), "counter");
}

#[test]
fn composite_cycle_surfaces_a_dependency_diagnostic() {
    let mut catalog = TypeCatalog::new();
    catalog.register_composite(record(parse_quote! {
        struct Node {
            label: String,
            next:  Node
        }
    }));

    let source = record(parse_quote! {
        struct Graph {
            root: Node
        }
    });

    let mut context = ResolutionContext::new();
    let metadata = context.resolve_record(&source, &catalog);
    assert!(metadata.fields.is_empty());
    assert!(context
        .diagnostics()
        .iter()
        .any(|diagnostic| diagnostic.kind() == ViolationKind::DependencyUnresolved));
    assert!(context.finish().is_err());
}

#[test]
fn records_resolve_in_order_and_share_state() {
    let mut catalog = TypeCatalog::new();
    catalog.register_composite(record(parse_quote! {
        struct Coords {
            lat: f64,
            lon: f64
        }
    }));

    let sources = vec![
        record(parse_quote! {
            struct City {
                center: Coords
            }
        }),
        record(parse_quote! {
            struct Depot {
                gate: Coords
            }
        })
    ];

    let mut context = ResolutionContext::new();
    let resolved = context.resolve_records(&sources, &catalog);
    assert_eq!(resolved.len(), 2);
    assert!(!context.has_failures());

    let FieldMapping::Composite { fields: first, .. } = &field(&resolved[0], "center").mapping
    else {
        panic!("center should map as a composite");
    };
    let FieldMapping::Composite { fields: second, .. } = &field(&resolved[1], "gate").mapping
    else {
        panic!("gate should map as a composite");
    };
    assert!(Arc::ptr_eq(first, second));
    assert!(context.finish().is_ok());
}
