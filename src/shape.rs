// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Type-shape classification.
//!
//! Maps a declared Rust type to exactly one [`TypeShape`], the closed set
//! of wire-mappable structures. Classification is total and deterministic:
//! every declared type either lands in one shape or produces a
//! [`ShapeViolation`] naming the offending type.
//!
//! # Shape Table
//!
//! | Declared type | Shape |
//! |---------------|-------|
//! | any type under `#[cql(json)]` | `Scalar` (opaque JSON text) |
//! | `Vec<u8>` | `ByteBuffer` (owned) |
//! | `Box<[u8]>` | `ByteBuffer` (boxed) |
//! | `Vec<T>` | `List` |
//! | `HashSet<T>`, `BTreeSet<T>` | `Set` |
//! | `HashMap<K, V>`, `BTreeMap<K, V>` | `Map` |
//! | `Option<T>` | `Optional` |
//! | `(T1, ..., Tn)`, `1 <= n <= 10` | `Tuple` |
//! | catalog-registered struct | `Composite` |
//! | catalog-registered enum | `Enum` |
//! | native table entry | `Scalar` (native) |
//! | other path type | `Scalar` (foreign, needs a codec) |
//!
//! References, slices, arrays, trait objects, function pointers, unit
//! tuples, and tuples above ten elements have no wire representation and
//! fail classification.

use proc_macro2::Span;
use syn::{Type, spanned::Spanned};

use crate::{
    annotations::AnnotationSet,
    catalog::TypeCatalog,
    diagnostics::{Diagnostic, FieldScope, ViolationKind},
    wire::NativeType
};

/// Ownership form of a byte-buffer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteBufferKind {
    /// `Vec<u8>`.
    Owned,

    /// `Box<[u8]>`.
    Boxed
}

/// What a scalar frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// A type from the supported native table.
    Native(NativeType),

    /// A JSON-transformed value, stored as opaque text.
    Json,

    /// A path type outside the native table; legal only with an explicit
    /// or registered codec.
    Foreign
}

/// The single-level shape of a declared type.
///
/// Shapes are one level deep: a `HashMap<String, Vec<i32>>` classifies as
/// `Map`, and the nested list appears as child frames in the decomposition
/// chain rather than inside the shape itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    /// A single wire value.
    Scalar(ScalarKind),

    /// A raw byte column (`blob` unless a codec overrides it).
    ByteBuffer(ByteBufferKind),

    /// A catalog-registered enum.
    Enum,

    /// `list<...>` on the wire.
    List,

    /// `set<...>` on the wire.
    Set,

    /// `map<..., ...>` on the wire.
    Map,

    /// A nullable wrapper; transparent on the wire.
    Optional,

    /// `tuple<...>` of one to ten elements.
    Tuple(usize),

    /// A catalog-registered user-defined type.
    Composite
}

impl TypeShape {
    /// Number of child frames this shape contributes to the chain.
    #[must_use]
    pub fn child_count(&self) -> usize {
        match self {
            Self::List | Self::Set | Self::Optional => 1,
            Self::Map => 2,
            Self::Tuple(arity) => *arity,
            Self::Scalar(_) | Self::ByteBuffer(_) | Self::Enum | Self::Composite => 0
        }
    }

    /// Whether the shape is a single column value (scalar, byte buffer, or
    /// enum). Secondary indexes apply directly only to this family.
    #[must_use]
    pub fn is_scalar_family(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::ByteBuffer(_) | Self::Enum)
    }

    /// Whether the shape is a collection (`List`, `Set`, or `Map`).
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List | Self::Set | Self::Map)
    }

    /// Label used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::ByteBuffer(_) => "byte buffer",
            Self::Enum => "enum",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Optional => "optional",
            Self::Tuple(_) => "tuple",
            Self::Composite => "composite"
        }
    }
}

/// Why a declared type failed shape classification.
#[derive(Debug, Clone)]
pub struct ShapeViolation {
    rule:   String,
    actual: String,
    span:   Span
}

impl ShapeViolation {
    fn new(rule: impl Into<String>, ty: &Type) -> Self {
        Self {
            rule:   rule.into(),
            actual: display_type(ty),
            span:   ty.span()
        }
    }

    /// The violated classification rule.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// The offending type as written.
    #[must_use]
    pub fn actual(&self) -> &str {
        &self.actual
    }

    /// Convert into a field-scoped diagnostic.
    #[must_use]
    pub fn into_diagnostic(self, scope: &FieldScope<'_>) -> Diagnostic {
        scope
            .violation(ViolationKind::Shape, self.rule)
            .with_actual(self.actual)
            .with_span(self.span)
    }
}

/// Classify a declared type into its wire shape.
///
/// The JSON transform short-circuits everything: an annotated type
/// classifies as an opaque text scalar no matter how it would otherwise
/// decompose.
///
/// # Errors
///
/// Returns a [`ShapeViolation`] for types with no wire representation.
pub fn classify(
    ty: &Type,
    annotations: &AnnotationSet,
    catalog: &TypeCatalog
) -> Result<TypeShape, ShapeViolation> {
    if annotations.json {
        return Ok(TypeShape::Scalar(ScalarKind::Json));
    }

    match ty {
        Type::Tuple(tuple) => match tuple.elems.len() {
            0 => Err(ShapeViolation::new("unit tuples cannot be persisted", ty)),
            arity @ 1..=10 => Ok(TypeShape::Tuple(arity)),
            _ => Err(ShapeViolation::new(
                "tuple columns support at most ten elements",
                ty
            ))
        },
        Type::Path(_) => classify_path(ty, catalog),
        _ => Err(ShapeViolation::new(
            "the declared type cannot be mapped to a wire column",
            ty
        ))
    }
}

fn classify_path(ty: &Type, catalog: &TypeCatalog) -> Result<TypeShape, ShapeViolation> {
    // Vec<u8> is a byte buffer, never a list of tinyints.
    if is_owned_byte_buffer(ty) {
        return Ok(TypeShape::ByteBuffer(ByteBufferKind::Owned));
    }
    if is_boxed_byte_buffer(ty) {
        return Ok(TypeShape::ByteBuffer(ByteBufferKind::Boxed));
    }

    let Some(segment) = last_segment(ty) else {
        return Err(ShapeViolation::new(
            "type paths must end in a named segment",
            ty
        ));
    };

    match segment.ident.to_string().as_str() {
        "Vec" => require_element(ty, TypeShape::List, "list"),
        "HashSet" | "BTreeSet" => require_element(ty, TypeShape::Set, "set"),
        "HashMap" | "BTreeMap" => {
            if map_key_value(ty).is_some() {
                Ok(TypeShape::Map)
            } else {
                Err(ShapeViolation::new(
                    "map types must declare key and value types",
                    ty
                ))
            }
        }
        "Option" => require_element(ty, TypeShape::Optional, "optional"),
        _ => {
            if catalog.is_composite(ty) {
                Ok(TypeShape::Composite)
            } else if catalog.is_enum(ty) {
                Ok(TypeShape::Enum)
            } else if let Some(native) = native_of(ty) {
                Ok(TypeShape::Scalar(ScalarKind::Native(native)))
            } else {
                Ok(TypeShape::Scalar(ScalarKind::Foreign))
            }
        }
    }
}

fn require_element(ty: &Type, shape: TypeShape, label: &str) -> Result<TypeShape, ShapeViolation> {
    if element_type(ty).is_some() {
        Ok(shape)
    } else {
        Err(ShapeViolation::new(
            format!("{label} types must declare an element type"),
            ty
        ))
    }
}

/// Map a declared type to its native wire type, if it has one.
///
/// Unsigned integers widen to the next signed size that holds them; `u64`
/// lands in `varint` because no fixed-width CQL integer can.
#[must_use]
pub fn native_of(ty: &Type) -> Option<NativeType> {
    let native = match path_ident_string(ty).as_str() {
        // Booleans
        "bool" => NativeType::Boolean,

        // Signed integers
        "i8" => NativeType::Tinyint,
        "i16" => NativeType::Smallint,
        "i32" => NativeType::Int,
        "i64" => NativeType::Bigint,

        // Unsigned integers widen
        "u8" => NativeType::Smallint,
        "u16" => NativeType::Int,
        "u32" => NativeType::Bigint,
        "u64" => NativeType::Varint,

        // Floats
        "f32" => NativeType::Float,
        "f64" => NativeType::Double,

        // Strings
        "String" | "str" => NativeType::Text,

        // UUIDs
        "Uuid" | "uuid::Uuid" => NativeType::Uuid,

        // Date/time (chrono)
        "DateTime" | "chrono::DateTime" => NativeType::Timestamp,
        "NaiveDateTime" | "chrono::NaiveDateTime" => NativeType::Timestamp,
        "NaiveDate" | "chrono::NaiveDate" => NativeType::Date,
        "NaiveTime" | "chrono::NaiveTime" => NativeType::Time,

        // Network
        "IpAddr" | "std::net::IpAddr" => NativeType::Inet,
        "Ipv4Addr" | "std::net::Ipv4Addr" => NativeType::Inet,
        "Ipv6Addr" | "std::net::Ipv6Addr" => NativeType::Inet,

        // Arbitrary-precision numerics
        "Decimal" | "rust_decimal::Decimal" | "BigDecimal" | "bigdecimal::BigDecimal" => {
            NativeType::Decimal
        }
        "BigInt" | "num_bigint::BigInt" => NativeType::Varint,

        _ => return None
    };
    Some(native)
}

/// Canonical token-form key for a declared type.
///
/// All whitespace is stripped, so formatting differences never split a
/// registry or cache key: `Vec<u8>` and `Vec< u8 >` are one entry.
#[must_use]
pub fn type_key(ty: &Type) -> String {
    quote::quote!(#ty).to_string().replace(' ', "")
}

/// Render a type for diagnostics, with token spacing tidied.
#[must_use]
pub fn display_type(ty: &Type) -> String {
    quote::quote!(#ty)
        .to_string()
        .replace(" <", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("& ", "&")
}

/// Extract the type path as `::`-joined idents, ignoring generics.
#[must_use]
pub fn path_ident_string(ty: &Type) -> String {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect::<Vec<_>>()
            .join("::")
    } else {
        String::new()
    }
}

/// First generic type argument of the last path segment.
#[must_use]
pub fn element_type(ty: &Type) -> Option<&Type> {
    if let Some(segment) = last_segment(ty)
        && let syn::PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(syn::GenericArgument::Type(inner)) = args.args.first()
    {
        return Some(inner);
    }
    None
}

/// Key and value type arguments of a map path.
#[must_use]
pub fn map_key_value(ty: &Type) -> Option<(&Type, &Type)> {
    if let Some(segment) = last_segment(ty)
        && let syn::PathArguments::AngleBracketed(args) = &segment.arguments
    {
        let mut types = args.args.iter().filter_map(|arg| match arg {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None
        });
        if let (Some(key), Some(value)) = (types.next(), types.next()) {
            return Some((key, value));
        }
    }
    None
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    if let Type::Path(type_path) = ty {
        type_path.path.segments.last()
    } else {
        None
    }
}

fn is_owned_byte_buffer(ty: &Type) -> bool {
    if let Some(segment) = last_segment(ty)
        && segment.ident == "Vec"
        && let Some(inner) = element_type(ty)
    {
        return path_ident_string(inner) == "u8";
    }
    false
}

fn is_boxed_byte_buffer(ty: &Type) -> bool {
    if let Some(segment) = last_segment(ty)
        && segment.ident == "Box"
        && let Some(inner) = element_type(ty)
        && let Type::Slice(slice) = inner
    {
        return path_ident_string(&slice.elem) == "u8";
    }
    false
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::parse_quote;

    use super::*;

    fn classify_plain(tokens: proc_macro2::TokenStream) -> Result<TypeShape, ShapeViolation> {
        let ty: Type = parse_quote!(#tokens);
        classify(&ty, &AnnotationSet::default(), &TypeCatalog::new())
    }

    fn shape_of(tokens: proc_macro2::TokenStream) -> TypeShape {
        match classify_plain(tokens) {
            Ok(shape) => shape,
            Err(violation) => panic!("expected a shape, got: {}", violation.rule())
        }
    }

    #[test]
    fn native_scalars() {
        assert_eq!(
            shape_of(quote! { i64 }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Bigint))
        );
        assert_eq!(
            shape_of(quote! { String }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Text))
        );
        assert_eq!(
            shape_of(quote! { bool }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Boolean))
        );
        assert_eq!(
            shape_of(quote! { Uuid }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Uuid))
        );
        assert_eq!(
            shape_of(quote! { DateTime<Utc> }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Timestamp))
        );
    }

    #[test]
    fn unsigned_integers_widen() {
        assert_eq!(
            shape_of(quote! { u8 }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Smallint))
        );
        assert_eq!(
            shape_of(quote! { u16 }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Int))
        );
        assert_eq!(
            shape_of(quote! { u32 }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Bigint))
        );
        assert_eq!(
            shape_of(quote! { u64 }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Varint))
        );
    }

    #[test]
    fn network_types_match_bare_and_qualified() {
        assert_eq!(
            shape_of(quote! { Ipv4Addr }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Inet))
        );
        assert_eq!(
            shape_of(quote! { std::net::Ipv4Addr }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Inet))
        );
        assert_eq!(
            shape_of(quote! { std::net::Ipv6Addr }),
            TypeShape::Scalar(ScalarKind::Native(NativeType::Inet))
        );
    }

    #[test]
    fn byte_buffers_before_lists() {
        assert_eq!(
            shape_of(quote! { Vec<u8> }),
            TypeShape::ByteBuffer(ByteBufferKind::Owned)
        );
        assert_eq!(
            shape_of(quote! { Box<[u8]> }),
            TypeShape::ByteBuffer(ByteBufferKind::Boxed)
        );
        assert_eq!(shape_of(quote! { Vec<i8> }), TypeShape::List);
    }

    #[test]
    fn containers() {
        assert_eq!(shape_of(quote! { Vec<String> }), TypeShape::List);
        assert_eq!(shape_of(quote! { HashSet<String> }), TypeShape::Set);
        assert_eq!(shape_of(quote! { BTreeSet<i32> }), TypeShape::Set);
        assert_eq!(shape_of(quote! { HashMap<String, i32> }), TypeShape::Map);
        assert_eq!(shape_of(quote! { BTreeMap<i64, String> }), TypeShape::Map);
        assert_eq!(shape_of(quote! { Option<String> }), TypeShape::Optional);
    }

    #[test]
    fn tuples_within_arity_window() {
        assert_eq!(shape_of(quote! { (i32,) }), TypeShape::Tuple(1));
        assert_eq!(shape_of(quote! { (i32, String) }), TypeShape::Tuple(2));
        assert_eq!(
            shape_of(quote! { (i32, i32, i32, i32, i32, i32, i32, i32, i32, i32) }),
            TypeShape::Tuple(10)
        );
    }

    #[test]
    fn unit_tuple_is_rejected() {
        let violation = classify_plain(quote! { () }).unwrap_err();
        assert_eq!(violation.rule(), "unit tuples cannot be persisted");
    }

    #[test]
    fn oversized_tuple_is_rejected() {
        let violation =
            classify_plain(quote! { (i32, i32, i32, i32, i32, i32, i32, i32, i32, i32, i32) })
                .unwrap_err();
        assert_eq!(violation.rule(), "tuple columns support at most ten elements");
    }

    #[test]
    fn references_and_slices_are_rejected() {
        let violation = classify_plain(quote! { &'a str }).unwrap_err();
        assert_eq!(
            violation.rule(),
            "the declared type cannot be mapped to a wire column"
        );
        assert!(classify_plain(quote! { [u8; 16] }).is_err());
        assert!(classify_plain(quote! { dyn Display }).is_err());
        assert!(classify_plain(quote! { fn(i32) -> i32 }).is_err());
    }

    #[test]
    fn unknown_path_is_foreign_scalar() {
        assert_eq!(
            shape_of(quote! { money::Price }),
            TypeShape::Scalar(ScalarKind::Foreign)
        );
    }

    #[test]
    fn json_short_circuits_decomposition() {
        let ty: Type = parse_quote!(HashMap<String, Vec<i32>>);
        let annotations = AnnotationSet {
            json: true,
            ..AnnotationSet::default()
        };
        let shape = classify(&ty, &annotations, &TypeCatalog::new());
        assert_eq!(shape.ok(), Some(TypeShape::Scalar(ScalarKind::Json)));
    }

    #[test]
    fn catalog_types_classify_as_enum_and_composite() {
        let mut catalog = TypeCatalog::new();
        catalog.register_enum_variants("Status", vec!["Active".to_string(), "Closed".to_string()]);

        let ty: Type = parse_quote!(Status);
        let shape = classify(&ty, &AnnotationSet::default(), &catalog);
        assert_eq!(shape.ok(), Some(TypeShape::Enum));
    }

    #[test]
    fn containers_without_arguments_are_rejected() {
        assert!(classify_plain(quote! { Vec }).is_err());
        assert!(classify_plain(quote! { HashMap }).is_err());
    }

    #[test]
    fn type_keys_ignore_whitespace() {
        let spaced: Type = parse_quote!(HashMap<String, i32>);
        assert_eq!(type_key(&spaced), "HashMap<String,i32>");
        let plain: Type = parse_quote!(Vec<u8>);
        assert_eq!(type_key(&plain), "Vec<u8>");
    }

    #[test]
    fn display_type_is_readable() {
        let ty: Type = parse_quote!(HashMap<String, Vec<i32>>);
        assert_eq!(display_type(&ty), "HashMap<String, Vec<i32>>");
    }

    #[test]
    fn child_counts_follow_shape() {
        assert_eq!(TypeShape::Map.child_count(), 2);
        assert_eq!(TypeShape::Tuple(4).child_count(), 4);
        assert_eq!(TypeShape::List.child_count(), 1);
        assert_eq!(TypeShape::Composite.child_count(), 0);
        assert_eq!(TypeShape::Scalar(ScalarKind::Json).child_count(), 0);
    }

    #[test]
    fn scalar_family_membership() {
        assert!(TypeShape::Scalar(ScalarKind::Foreign).is_scalar_family());
        assert!(TypeShape::ByteBuffer(ByteBufferKind::Owned).is_scalar_family());
        assert!(TypeShape::Enum.is_scalar_family());
        assert!(!TypeShape::List.is_scalar_family());
        assert!(!TypeShape::Optional.is_scalar_family());
    }

    #[test]
    fn map_key_value_extraction() {
        let ty: Type = parse_quote!(HashMap<String, Vec<i32>>);
        let (key, value) = map_key_value(&ty).unwrap();
        assert_eq!(type_key(key), "String");
        assert_eq!(type_key(value), "Vec<i32>");
    }
}
