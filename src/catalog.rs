// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Registered enum and composite types.
//!
//! Shape classification only sees a type's tokens, so the names that mean
//! "enum" or "user-defined composite" have to be declared up front. The
//! catalog is plain data passed to resolution explicitly; nothing here is
//! global state.
//!
//! Lookups match the last path segment, so `Status` and `models::Status`
//! name the same registered type.

use std::collections::HashMap;

use syn::{Data, DeriveInput, Fields, Type};

use crate::metadata::RecordSource;

/// Enum and composite registrations consulted during classification.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    enums:      HashMap<String, Vec<String>>,
    composites: HashMap<String, RecordSource>
}

impl TypeCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enum declaration. Its variants drive the NAME and
    /// ORDINAL encodings, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error when the input is not an enum, or when a variant
    /// carries fields.
    pub fn register_enum(&mut self, input: &DeriveInput) -> darling::Result<()> {
        let Data::Enum(data) = &input.data else {
            return Err(
                darling::Error::custom("only enums can drive an enum encoding").with_span(input)
            );
        };
        let mut variants = Vec::with_capacity(data.variants.len());
        for variant in &data.variants {
            if !matches!(variant.fields, Fields::Unit) {
                return Err(darling::Error::custom("enum encodings support unit variants only")
                    .with_span(variant));
            }
            variants.push(variant.ident.to_string());
        }
        self.enums.insert(input.ident.to_string(), variants);
        Ok(())
    }

    /// Register enum variants directly, without a declaration in scope.
    pub fn register_enum_variants(&mut self, name: impl Into<String>, variants: Vec<String>) {
        self.enums.insert(name.into(), variants);
    }

    /// Register a composite record. Fields declaring its type resolve as
    /// UDT columns. Registering the same name again replaces the earlier
    /// entry.
    pub fn register_composite(&mut self, source: RecordSource) {
        self.composites.insert(source.name(), source);
    }

    /// Whether `ty` names a registered enum.
    #[must_use]
    pub fn is_enum(&self, ty: &Type) -> bool {
        type_name(ty).is_some_and(|name| self.enums.contains_key(&name))
    }

    /// Variants of the registered enum `ty` names.
    #[must_use]
    pub fn enum_variants(&self, ty: &Type) -> Option<&[String]> {
        self.enums.get(&type_name(ty)?).map(Vec::as_slice)
    }

    /// Whether `ty` names a registered composite record.
    #[must_use]
    pub fn is_composite(&self, ty: &Type) -> bool {
        type_name(ty).is_some_and(|name| self.composites.contains_key(&name))
    }

    /// Source record of the composite `ty` names.
    #[must_use]
    pub fn composite(&self, ty: &Type) -> Option<&RecordSource> {
        self.composites.get(&type_name(ty)?)
    }
}

fn type_name(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
    } else {
        None
    }
}
