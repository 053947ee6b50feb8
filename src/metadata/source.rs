// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Parsed record and field inputs.
//!
//! [`RecordSource`] is the resolver-facing view of a struct declaration:
//! the record name plus one [`FieldSource`] per named field, with `cql`
//! annotations already extracted. Hosts that do not parse a derive input
//! can assemble sources directly.

use syn::{Data, DeriveInput, Fields, Ident, Type};

use crate::annotations::{PathAnnotations, field_annotations};

/// A record declaration whose fields map to CQL columns.
#[derive(Debug, Clone)]
pub struct RecordSource {
    ident:  Ident,
    fields: Vec<FieldSource>
}

impl RecordSource {
    /// Assemble a source from explicit parts.
    #[must_use]
    pub fn new(ident: Ident, fields: Vec<FieldSource>) -> Self {
        Self { ident, fields }
    }

    /// Parse a record from a derive input.
    ///
    /// # Errors
    ///
    /// Returns an error when the input is not a struct with named fields,
    /// and accumulates per-field annotation errors otherwise.
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let Data::Struct(data) = &input.data else {
            return Err(darling::Error::custom("records must be structs").with_span(input));
        };
        let Fields::Named(named) = &data.fields else {
            return Err(darling::Error::custom("records require named fields").with_span(input));
        };

        let mut errors = darling::Error::accumulator();
        let mut fields = Vec::with_capacity(named.named.len());
        for field in &named.named {
            if let Some(source) = errors.handle(FieldSource::from_field(field)) {
                fields.push(source);
            }
        }
        errors.finish_with(Self {
            ident: input.ident.clone(),
            fields
        })
    }

    /// Record type name.
    #[must_use]
    pub fn name(&self) -> String {
        self.ident.to_string()
    }

    /// Record identifier.
    #[must_use]
    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// Parsed fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSource] {
        &self.fields
    }
}

/// One record field with its extracted annotations.
#[derive(Debug, Clone)]
pub struct FieldSource {
    ident:       Ident,
    ty:          Type,
    annotations: Vec<PathAnnotations>,
    no_getter:   bool,
    no_setter:   bool
}

impl FieldSource {
    /// Parse one named field and extract its `cql` annotations.
    ///
    /// # Errors
    ///
    /// Returns an error for unnamed fields and for malformed annotations.
    pub fn from_field(field: &syn::Field) -> darling::Result<Self> {
        let Some(ident) = field.ident.clone() else {
            return Err(darling::Error::custom("record fields must be named").with_span(field));
        };
        let annotations = field_annotations(&field.attrs)?;
        Ok(Self {
            ident,
            ty: field.ty.clone(),
            annotations,
            no_getter: false,
            no_setter: false
        })
    }

    /// Declare how the host record exposes this field. `no_getter` makes
    /// reads go through the field itself instead of a getter method, and
    /// `no_setter` does the same for writes.
    #[must_use]
    pub fn with_accessor_flags(mut self, no_getter: bool, no_setter: bool) -> Self {
        self.no_getter = no_getter;
        self.no_setter = no_setter;
        self
    }

    /// Field identifier.
    #[must_use]
    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> String {
        self.ident.to_string()
    }

    /// Declared field type.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Extracted annotations, one entry per addressed path.
    #[must_use]
    pub fn annotations(&self) -> &[PathAnnotations] {
        &self.annotations
    }

    /// Whether reads bypass a getter method.
    #[must_use]
    pub fn no_getter(&self) -> bool {
        self.no_getter
    }

    /// Whether writes bypass a setter method.
    #[must_use]
    pub fn no_setter(&self) -> bool {
        self.no_setter
    }
}
