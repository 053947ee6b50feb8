// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[cql(...)]` attribute extraction.
//!
//! Walks a field's attributes and produces flat `(path, AnnotationSet)`
//! pairs: the root set plus one set per annotated nested position.
//! Position wrappers address branches of the declared type:
//!
//! | Wrapper | Branch |
//! |---------|--------|
//! | `element(...)` | 0 (list/set/optional element) |
//! | `key(...)` | 0 (map key) |
//! | `value(...)` | 1 (map value) |
//! | `position(N, ...)` | N (tuple position) |
//!
//! Wrappers nest, so `#[cql(value(element(frozen)))]` reaches the element
//! frame of a map's list values. Declaring one annotation twice at the
//! same position is an error.

use std::collections::BTreeMap;

use proc_macro2::TokenStream;
use syn::{
    Attribute, Token, parenthesized,
    parse::{ParseStream, Parser},
    punctuated::Punctuated,
    spanned::Spanned
};

use super::{
    AnnotationSet, ClusteringOrder, ComputedColumn, EnumEncoding, ExplicitCodec, IndexConfig,
    KeyOrder, Normalization, RuntimeCodec, SasiConfig, SasiMode, SearchConfig
};
use crate::cursor::FramePath;

/// Annotations addressed to one position of a field's declared type.
#[derive(Debug, Clone)]
pub struct PathAnnotations {
    /// Branch path from the field root; the empty path is the root frame.
    pub path: FramePath,

    /// The annotations declared at that position.
    pub set: AnnotationSet
}

/// Extract all `#[cql(...)]` annotations from a field's attributes.
///
/// Returns one entry per annotated path, in path order. A field without
/// any `cql` attribute produces an empty collection, which resolution
/// treats as an unannotated normal column.
///
/// # Errors
///
/// Returns accumulated errors for unrecognized annotation names, malformed
/// payloads, and duplicate declarations.
pub fn field_annotations(attrs: &[Attribute]) -> darling::Result<Vec<PathAnnotations>> {
    let mut sets: BTreeMap<Vec<usize>, AnnotationSet> = BTreeMap::new();
    let mut errors = darling::Error::accumulator();

    for attr in attrs {
        if !attr.path().is_ident("cql") {
            continue;
        }
        let mut branches = Vec::new();
        let outcome = attr.parse_nested_meta(|meta| apply(&meta, &mut branches, &mut sets));
        if let Err(err) = outcome {
            errors.push(err.into());
        }
    }

    errors.finish()?;
    Ok(sets
        .into_iter()
        .map(|(branches, set)| PathAnnotations {
            path: FramePath::from_branches(branches),
            set
        })
        .collect())
}

fn apply(
    meta: &syn::meta::ParseNestedMeta<'_>,
    branches: &mut Vec<usize>,
    sets: &mut BTreeMap<Vec<usize>, AnnotationSet>
) -> syn::Result<()> {
    // Position wrappers recurse with their branch pushed.
    if meta.path.is_ident("element") || meta.path.is_ident("key") {
        branches.push(0);
        let outcome = meta.parse_nested_meta(|inner| apply(&inner, branches, sets));
        branches.pop();
        return outcome;
    }
    if meta.path.is_ident("value") {
        branches.push(1);
        let outcome = meta.parse_nested_meta(|inner| apply(&inner, branches, sets));
        branches.pop();
        return outcome;
    }
    if meta.path.is_ident("position") {
        let content;
        parenthesized!(content in meta.input);
        let literal: syn::LitInt = content.parse()?;
        let branch: usize = literal.base10_parse()?;
        let _: Token![,] = content.parse()?;
        let rest: TokenStream = content.parse()?;
        branches.push(branch);
        let outcome = syn::meta::parser(|inner| apply(&inner, branches, sets)).parse2(rest);
        branches.pop();
        return outcome;
    }

    let span = meta.path.span();
    let set = sets.entry(branches.clone()).or_default();

    if meta.path.is_ident("json") {
        if set.json {
            return Err(meta.error("duplicate `json` annotation"));
        }
        set.json = true;
    } else if meta.path.is_ident("enumerated") {
        if set.enumerated.is_some() {
            return Err(meta.error("duplicate `enumerated` annotation"));
        }
        if meta.input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in meta.input);
            let mode: syn::Ident = content.parse()?;
            let Some(encoding) = EnumEncoding::from_str(&mode.to_string()) else {
                return Err(syn::Error::new(mode.span(), "expected `name` or `ordinal`"));
            };
            set.enumerated = Some(encoding);
        } else {
            set.enumerated = Some(EnumEncoding::default());
        }
    } else if meta.path.is_ident("codec") {
        if set.codec.is_some() {
            return Err(meta.error("duplicate `codec` annotation"));
        }
        let _: Token![=] = meta.input.parse()?;
        let ty: syn::Type = meta.input.parse()?;
        let syn::Type::Path(syn::TypePath { qself: None, path }) = ty else {
            return Err(meta.error("codec expects a plain type path"));
        };
        set.codec = Some(ExplicitCodec { path, span });
    } else if meta.path.is_ident("runtime_codec") {
        if set.runtime_codec.is_some() {
            return Err(meta.error("duplicate `runtime_codec` annotation"));
        }
        let content;
        parenthesized!(content in meta.input);
        let mut target: Option<syn::Type> = None;
        let mut name: Option<String> = None;
        while !content.is_empty() {
            let key: syn::Ident = content.parse()?;
            if key == "target" {
                let _: Token![=] = content.parse()?;
                target = Some(content.parse()?);
            } else if key == "name" {
                name = Some(str_value(&content)?);
            } else {
                return Err(syn::Error::new(key.span(), "expected `target` or `name`"));
            }
            item_done(&content)?;
        }
        let Some(target) = target else {
            return Err(meta.error("runtime_codec requires `target = <type>`"));
        };
        set.runtime_codec = Some(RuntimeCodec { target, name, span });
    } else if meta.path.is_ident("computed") {
        if set.computed.is_some() {
            return Err(meta.error("duplicate `computed` annotation"));
        }
        let content;
        parenthesized!(content in meta.input);
        let mut function: Option<String> = None;
        let mut alias: Option<String> = None;
        let mut cql_class: Option<syn::Type> = None;
        let mut targets: Vec<String> = Vec::new();
        while !content.is_empty() {
            let key: syn::Ident = content.parse()?;
            if key == "function" {
                function = Some(str_value(&content)?);
            } else if key == "alias" {
                alias = Some(str_value(&content)?);
            } else if key == "cql_class" {
                let _: Token![=] = content.parse()?;
                cql_class = Some(content.parse()?);
            } else if key == "targets" {
                let inner;
                parenthesized!(inner in content);
                let columns = Punctuated::<syn::LitStr, Token![,]>::parse_terminated(&inner)?;
                targets = columns.iter().map(syn::LitStr::value).collect();
            } else {
                return Err(syn::Error::new(
                    key.span(),
                    "expected `function`, `alias`, `cql_class`, or `targets`"
                ));
            }
            item_done(&content)?;
        }
        let (Some(function), Some(alias), Some(cql_class)) = (function, alias, cql_class) else {
            return Err(meta.error("computed requires `function`, `alias`, and `cql_class`"));
        };
        set.computed = Some(ComputedColumn {
            function,
            alias,
            cql_class,
            targets,
            span
        });
    } else if meta.path.is_ident("counter") {
        if set.counter {
            return Err(meta.error("duplicate `counter` annotation"));
        }
        set.counter = true;
    } else if meta.path.is_ident("time_uuid") {
        if set.time_uuid {
            return Err(meta.error("duplicate `time_uuid` annotation"));
        }
        set.time_uuid = true;
    } else if meta.path.is_ident("ascii") {
        if set.ascii {
            return Err(meta.error("duplicate `ascii` annotation"));
        }
        set.ascii = true;
    } else if meta.path.is_ident("index") {
        if set.index.is_some() {
            return Err(meta.error("duplicate `index` annotation"));
        }
        let mut config = IndexConfig::default();
        if meta.input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in meta.input);
            while !content.is_empty() {
                let key: syn::Ident = content.parse()?;
                if key == "name" {
                    config.name = Some(str_value(&content)?);
                } else if key == "custom_class" {
                    config.custom_class = Some(str_value(&content)?);
                } else if key == "options" {
                    config.options = Some(str_value(&content)?);
                } else {
                    return Err(syn::Error::new(
                        key.span(),
                        "expected `name`, `custom_class`, or `options`"
                    ));
                }
                item_done(&content)?;
            }
        }
        set.index = Some(config);
    } else if meta.path.is_ident("sasi") {
        if set.sasi.is_some() {
            return Err(meta.error("duplicate `sasi` annotation"));
        }
        let mut config = SasiConfig::default();
        if meta.input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in meta.input);
            while !content.is_empty() {
                let key: syn::Ident = content.parse()?;
                if key == "mode" {
                    let value = str_value(&content)?;
                    let Some(mode) = SasiMode::from_str(&value) else {
                        return Err(syn::Error::new(
                            key.span(),
                            "expected `prefix`, `contains`, or `sparse`"
                        ));
                    };
                    config.mode = mode;
                } else if key == "analyzed" {
                    config.analyzed = true;
                } else if key == "analyzer_class" {
                    config.analyzer_class = Some(str_value(&content)?);
                } else if key == "flush_memory_mb" {
                    config.flush_memory_mb = int_value(&content)?;
                } else if key == "normalization" {
                    let value = str_value(&content)?;
                    let Some(normalization) = Normalization::from_str(&value) else {
                        return Err(syn::Error::new(
                            key.span(),
                            "expected `none`, `lowercase`, or `uppercase`"
                        ));
                    };
                    config.normalization = normalization;
                } else if key == "locale" {
                    config.locale = str_value(&content)?;
                } else if key == "stemming" {
                    config.stemming = true;
                } else if key == "skip_stop_words" {
                    config.skip_stop_words = true;
                } else {
                    return Err(syn::Error::new(key.span(), "unrecognized sasi option"));
                }
                item_done(&content)?;
            }
        }
        set.sasi = Some(config);
    } else if meta.path.is_ident("search") {
        if set.search.is_some() {
            return Err(meta.error("duplicate `search` annotation"));
        }
        let mut config = SearchConfig::default();
        if meta.input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in meta.input);
            while !content.is_empty() {
                let key: syn::Ident = content.parse()?;
                if key == "full_text" {
                    config.full_text = true;
                } else {
                    return Err(syn::Error::new(key.span(), "expected `full_text`"));
                }
                item_done(&content)?;
            }
        }
        set.search = Some(config);
    } else if meta.path.is_ident("partition_key") {
        if set.partition_key.is_some() {
            return Err(meta.error("duplicate `partition_key` annotation"));
        }
        let mut order = 1;
        if meta.input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in meta.input);
            while !content.is_empty() {
                let key: syn::Ident = content.parse()?;
                if key == "order" {
                    order = int_value(&content)?;
                } else {
                    return Err(syn::Error::new(key.span(), "expected `order`"));
                }
                item_done(&content)?;
            }
        }
        set.partition_key = Some(KeyOrder { order, span });
    } else if meta.path.is_ident("clustering_column") {
        if set.clustering.is_some() {
            return Err(meta.error("duplicate `clustering_column` annotation"));
        }
        let mut order = 1;
        let mut ascending = true;
        if meta.input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in meta.input);
            while !content.is_empty() {
                let key: syn::Ident = content.parse()?;
                if key == "order" {
                    order = int_value(&content)?;
                } else if key == "asc" {
                    ascending = true;
                } else if key == "desc" {
                    ascending = false;
                } else {
                    return Err(syn::Error::new(key.span(), "expected `order`, `asc`, or `desc`"));
                }
                item_done(&content)?;
            }
        }
        set.clustering = Some(ClusteringOrder {
            order,
            ascending,
            span
        });
    } else {
        return Err(meta.error("unrecognized cql annotation"));
    }

    Ok(())
}

fn str_value(content: ParseStream<'_>) -> syn::Result<String> {
    let _: Token![=] = content.parse()?;
    let value: syn::LitStr = content.parse()?;
    Ok(value.value())
}

fn int_value(content: ParseStream<'_>) -> syn::Result<u32> {
    let _: Token![=] = content.parse()?;
    let value: syn::LitInt = content.parse()?;
    value.base10_parse()
}

fn item_done(content: ParseStream<'_>) -> syn::Result<()> {
    if !content.is_empty() {
        let _: Token![,] = content.parse()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::parse_quote;

    use super::*;

    fn parse_cql(tokens: TokenStream) -> Vec<PathAnnotations> {
        let attr: Attribute = parse_quote!(#[cql(#tokens)]);
        match field_annotations(std::slice::from_ref(&attr)) {
            Ok(pairs) => pairs,
            Err(err) => panic!("annotations should parse: {err}")
        }
    }

    fn root_set(tokens: TokenStream) -> AnnotationSet {
        parse_cql(tokens)
            .into_iter()
            .find(|pair| pair.path.is_root())
            .map(|pair| pair.set)
            .unwrap_or_default()
    }

    #[test]
    fn parse_bare_flags() {
        let set = root_set(
            quote! { json, counter, time_uuid, ascii, static_column, frozen, empty_if_null }
        );
        assert!(set.json);
        assert!(set.counter);
        assert!(set.time_uuid);
        assert!(set.ascii);
        assert!(set.static_column);
        assert!(set.frozen);
        assert!(set.empty_if_null);
    }

    #[test]
    fn partition_key_defaults_to_order_one() {
        let set = root_set(quote! { partition_key });
        assert_eq!(set.partition_key.map(|key| key.order), Some(1));
    }

    #[test]
    fn partition_key_with_order() {
        let set = root_set(quote! { partition_key(order = 2) });
        assert_eq!(set.partition_key.map(|key| key.order), Some(2));
    }

    #[test]
    fn clustering_column_desc() {
        let set = root_set(quote! { clustering_column(order = 3, desc) });
        let clustering = set.clustering.expect("clustering payload");
        assert_eq!(clustering.order, 3);
        assert!(!clustering.ascending);
    }

    #[test]
    fn enumerated_defaults_to_name() {
        let set = root_set(quote! { enumerated });
        assert_eq!(set.enumerated, Some(EnumEncoding::Name));
    }

    #[test]
    fn enumerated_ordinal() {
        let set = root_set(quote! { enumerated(ordinal) });
        assert_eq!(set.enumerated, Some(EnumEncoding::Ordinal));
    }

    #[test]
    fn codec_keeps_generic_arguments() {
        let set = root_set(quote! { codec = conv::MoneyCodec<Price, i64> });
        let codec = set.codec.expect("codec payload");
        let path = codec.path;
        assert_eq!(
            quote!(#path).to_string().replace(' ', ""),
            "conv::MoneyCodec<Price,i64>"
        );
    }

    #[test]
    fn runtime_codec_payload() {
        let set = root_set(quote! { runtime_codec(target = String, name = "legacy") });
        let runtime = set.runtime_codec.expect("runtime codec payload");
        let target = &runtime.target;
        assert_eq!(quote!(#target).to_string(), "String");
        assert_eq!(runtime.name.as_deref(), Some("legacy"));
    }

    #[test]
    fn runtime_codec_requires_target() {
        let attr: Attribute = parse_quote!(#[cql(runtime_codec(name = "legacy"))]);
        assert!(field_annotations(std::slice::from_ref(&attr)).is_err());
    }

    #[test]
    fn computed_payload() {
        let set = root_set(quote! {
            computed(function = "writetime", alias = "wt", cql_class = i64, targets("value"))
        });
        let computed = set.computed.expect("computed payload");
        assert_eq!(computed.function, "writetime");
        assert_eq!(computed.alias, "wt");
        assert_eq!(computed.targets, vec!["value".to_string()]);
    }

    #[test]
    fn computed_requires_core_keys() {
        let attr: Attribute = parse_quote!(#[cql(computed(function = "writetime"))]);
        assert!(field_annotations(std::slice::from_ref(&attr)).is_err());
    }

    #[test]
    fn index_bare_and_configured() {
        let bare = root_set(quote! { index });
        assert!(bare.index.expect("index payload").name.is_none());

        let configured = root_set(quote! {
            index(name = "tags_idx", custom_class = "com.example.Indexer", options = "a=b")
        });
        let index = configured.index.expect("index payload");
        assert_eq!(index.name.as_deref(), Some("tags_idx"));
        assert_eq!(index.custom_class.as_deref(), Some("com.example.Indexer"));
        assert_eq!(index.options.as_deref(), Some("a=b"));
    }

    #[test]
    fn sasi_overrides() {
        let set = root_set(quote! {
            sasi(
                mode = "contains",
                analyzed,
                analyzer_class = "com.example.Analyzer",
                flush_memory_mb = 512,
                normalization = "lowercase",
                locale = "de",
                stemming,
                skip_stop_words
            )
        });
        let sasi = set.sasi.expect("sasi payload");
        assert_eq!(sasi.mode, SasiMode::Contains);
        assert!(sasi.analyzed);
        assert_eq!(sasi.analyzer_class.as_deref(), Some("com.example.Analyzer"));
        assert_eq!(sasi.flush_memory_mb, 512);
        assert_eq!(sasi.normalization, Normalization::Lowercase);
        assert_eq!(sasi.locale, "de");
        assert!(sasi.stemming);
        assert!(sasi.skip_stop_words);
    }

    #[test]
    fn search_full_text() {
        let set = root_set(quote! { search(full_text) });
        assert!(set.search.expect("search payload").full_text);
    }

    #[test]
    fn element_targets_branch_zero() {
        let pairs = parse_cql(quote! { element(frozen) });
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].path.branches(), &[0]);
        assert!(pairs[0].set.frozen);
    }

    #[test]
    fn key_and_value_branches() {
        let pairs = parse_cql(quote! { key(ascii), value(index) });
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].path.branches(), &[0]);
        assert!(pairs[0].set.ascii);
        assert_eq!(pairs[1].path.branches(), &[1]);
        assert!(pairs[1].set.index.is_some());
    }

    #[test]
    fn nested_wrappers_compose() {
        let pairs = parse_cql(quote! { value(element(frozen)) });
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].path.branches(), &[1, 0]);
        assert!(pairs[0].set.frozen);
    }

    #[test]
    fn position_wrapper_targets_tuple_branch() {
        let pairs = parse_cql(quote! { position(2, frozen, index) });
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].path.branches(), &[2]);
        assert!(pairs[0].set.frozen);
        assert!(pairs[0].set.index.is_some());
    }

    #[test]
    fn duplicate_within_one_attribute_errors() {
        let attr: Attribute = parse_quote!(#[cql(json, json)]);
        assert!(field_annotations(std::slice::from_ref(&attr)).is_err());
    }

    #[test]
    fn duplicate_across_attributes_errors() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[cql(json)]), parse_quote!(#[cql(json)])];
        assert!(field_annotations(&attrs).is_err());
    }

    #[test]
    fn unrecognized_annotation_errors() {
        let attr: Attribute = parse_quote!(#[cql(jsonb)]);
        assert!(field_annotations(std::slice::from_ref(&attr)).is_err());
    }

    #[test]
    fn non_cql_attributes_are_ignored() {
        let attr: Attribute = parse_quote!(#[serde(skip)]);
        let pairs = field_annotations(std::slice::from_ref(&attr));
        assert!(pairs.is_ok_and(|p| p.is_empty()));
    }

    #[test]
    fn paths_are_sorted_root_first() {
        let pairs = parse_cql(quote! { frozen, value(index), key(ascii) });
        let branches: Vec<&[usize]> = pairs.iter().map(|pair| pair.path.branches()).collect();
        assert_eq!(branches, vec![&[] as &[usize], &[0], &[1]]);
    }
}
