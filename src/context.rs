// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Resolution context.
//!
//! A [`ResolutionContext`] owns the mutable state of one resolution run:
//! the codec registry, the composite cache, and the diagnostics sink.
//! Records resolve one after another through a single `&mut` borrow, and
//! state is never shared behind the caller's back. Hosts that resolve in
//! parallel keep one context per worker and merge afterwards.

use crate::{
    catalog::TypeCatalog,
    codec::{CodecDescriptor, CodecRegistry},
    diagnostics::{Diagnostic, Diagnostics},
    metadata::{CompositeCache, FieldResolver, RecordMetadata, RecordSource}
};

/// Owns registry, cache, and diagnostics for one resolution run.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    registry:    CodecRegistry,
    cache:       CompositeCache,
    diagnostics: Diagnostics
}

impl ResolutionContext {
    /// Create a context with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context over a pre-populated codec registry.
    #[must_use]
    pub fn with_registry(registry: CodecRegistry) -> Self {
        Self {
            registry,
            cache: CompositeCache::new(),
            diagnostics: Diagnostics::new()
        }
    }

    /// Register a codec on the context's registry.
    ///
    /// The duplicate is also recorded as a diagnostic, so a host that
    /// ignores the return value still surfaces it at the boundary.
    ///
    /// # Errors
    ///
    /// Returns the registry diagnostic when the source type already has a
    /// codec; the first registration is kept.
    pub fn register_codec(&mut self, descriptor: CodecDescriptor) -> Result<(), Diagnostic> {
        if let Err(diagnostic) = self.registry.register(descriptor) {
            self.diagnostics.push(diagnostic.clone());
            return Err(diagnostic);
        }
        Ok(())
    }

    /// Resolve one record against the catalog.
    ///
    /// Field failures do not abort the record; they are recorded on the
    /// context and the remaining fields still resolve.
    pub fn resolve_record(
        &mut self,
        source: &RecordSource,
        catalog: &TypeCatalog
    ) -> RecordMetadata {
        FieldResolver {
            catalog,
            registry: &self.registry,
            cache: &mut self.cache,
            diagnostics: &mut self.diagnostics
        }
        .resolve_record(source)
    }

    /// Resolve several records in order, sharing the composite cache.
    pub fn resolve_records(
        &mut self,
        sources: &[RecordSource],
        catalog: &TypeCatalog
    ) -> Vec<RecordMetadata> {
        sources
            .iter()
            .map(|source| self.resolve_record(source, catalog))
            .collect()
    }

    /// Codecs registered so far.
    #[must_use]
    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Whether any resolution step failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Consume the context and keep only its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Finish the run, converting recorded diagnostics into one combined
    /// boundary error.
    ///
    /// # Errors
    ///
    /// Returns the combined error when any diagnostic was recorded.
    pub fn finish(self) -> Result<(), darling::Error> {
        match self.diagnostics.into_boundary_error() {
            Some(error) => Err(error),
            None => Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;
    use crate::{
        codec::CodecRef,
        diagnostics::ViolationKind,
        wire::{NativeType, WireType}
    };

    fn record(input: syn::DeriveInput) -> RecordSource {
        match RecordSource::from_derive_input(&input) {
            Ok(source) => source,
            Err(err) => panic!("record should parse: {err}")
        }
    }

    #[test]
    fn clean_run_finishes_without_error() {
        let mut context = ResolutionContext::new();
        let source = record(parse_quote! {
            struct Account {
                #[cql(partition_key)]
                id:    i64,
                email: String
            }
        });
        let metadata = context.resolve_record(&source, &TypeCatalog::new());
        assert_eq!(metadata.fields.len(), 2);
        assert!(!context.has_failures());
        assert!(context.finish().is_ok());
    }

    #[test]
    fn failures_surface_as_one_boundary_error() {
        let mut context = ResolutionContext::new();
        let source = record(parse_quote! {
            struct Account {
                a: NotMapped,
                b: AlsoNotMapped
            }
        });
        let metadata = context.resolve_record(&source, &TypeCatalog::new());
        assert!(metadata.fields.is_empty());
        assert!(context.has_failures());
        assert_eq!(context.diagnostics().len(), 2);
        assert!(context.finish().is_err());
    }

    #[test]
    fn duplicate_codec_registration_is_recorded() {
        let mut context = ResolutionContext::new();
        let first = CodecDescriptor::new(
            "Price",
            WireType::Native(NativeType::Bigint),
            CodecRef::Identity
        );
        let second = CodecDescriptor::new(
            "Price",
            WireType::Native(NativeType::Text),
            CodecRef::Identity
        );
        assert!(context.register_codec(first).is_ok());

        let err = match context.register_codec(second) {
            Ok(()) => panic!("duplicate registration must fail"),
            Err(diagnostic) => diagnostic
        };
        assert_eq!(err.kind(), ViolationKind::Registry);
        assert!(context.has_failures());
        assert!(context
            .registry()
            .lookup("Price")
            .is_some_and(|kept| kept.wire().rendered() == "bigint"));
    }

    #[test]
    fn composite_cache_spans_records_in_one_run() {
        let mut catalog = TypeCatalog::new();
        catalog.register_composite(record(parse_quote! {
            struct Address {
                street: String
            }
        }));

        let mut context = ResolutionContext::new();
        let sources = vec![
            record(parse_quote! {
                struct Customer {
                    home: Address
                }
            }),
            record(parse_quote! {
                struct Supplier {
                    office: Address
                }
            })
        ];
        let resolved = context.resolve_records(&sources, &catalog);
        assert_eq!(resolved.len(), 2);
        assert!(!context.has_failures());

        let first = match &resolved[0].fields[0].mapping {
            crate::metadata::FieldMapping::Composite { fields, .. } => fields,
            other => panic!("expected a composite mapping, got {other:?}")
        };
        let second = match &resolved[1].fields[0].mapping {
            crate::metadata::FieldMapping::Composite { fields, .. } => fields,
            other => panic!("expected a composite mapping, got {other:?}")
        };
        assert!(std::sync::Arc::ptr_eq(first, second));
    }
}
