// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Resolved per-column metadata.
//!
//! [`FieldMetadataSignature`] is the terminal output of resolution: one
//! per column, nested again for every structural position beneath it.
//! Code generators consume these signatures directly; nothing in here
//! refers back to the source record beyond the accessor tokens.

use std::sync::Arc;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

use crate::{
    codec::CodecDescriptor, column::ColumnRole, index::IndexClassification, wire::WireType
};

/// How generated code reads and writes one resolved position.
#[derive(Debug, Clone)]
pub enum AccessorBindings {
    /// A field of the host record.
    Entity {
        /// Expression reading the value out of `entity`.
        read: TokenStream,

        /// Statement writing `value` back into `entity`.
        write: TokenStream
    },

    /// A structural position reached through its parent, such as a
    /// collection element or a tuple slot. No accessor of its own.
    Structural
}

impl AccessorBindings {
    /// Bindings for a record field. The flags mark fields the host
    /// exposes directly instead of through accessor methods.
    #[must_use]
    pub fn entity(field: &Ident, no_getter: bool, no_setter: bool) -> Self {
        let read = if no_getter {
            quote!(entity.#field)
        } else {
            quote!(entity.#field())
        };
        let write = if no_setter {
            quote!(entity.#field = value)
        } else {
            let setter = format_ident!("set_{}", field);
            quote!(entity.#setter(value))
        };
        Self::Entity { read, write }
    }
}

/// Wire structure beneath one resolved position.
#[derive(Debug, Clone)]
pub enum FieldMapping {
    /// Scalar position with its resolved codec.
    Scalar(CodecDescriptor),

    /// Nullable wrapper around an inner position.
    Optional {
        /// The wrapped position.
        inner: Box<FieldMetadataSignature>
    },

    /// `list<...>` column.
    List {
        /// Element position.
        element: Box<FieldMetadataSignature>
    },

    /// `set<...>` column.
    Set {
        /// Element position.
        element: Box<FieldMetadataSignature>
    },

    /// `map<...>` column.
    Map {
        /// Key position.
        key: Box<FieldMetadataSignature>,

        /// Value position.
        value: Box<FieldMetadataSignature>
    },

    /// `tuple<...>` column.
    Tuple {
        /// Positions in declaration order.
        elements: Vec<FieldMetadataSignature>
    },

    /// User-defined type column.
    Composite {
        /// UDT name on the wire.
        udt: String,

        /// Member signatures, shared with every field of the same type.
        fields: Arc<Vec<FieldMetadataSignature>>
    }
}

/// Fully resolved metadata of one column or nested position.
#[derive(Debug, Clone)]
pub struct FieldMetadataSignature {
    /// Field name, or the position label for structural entries.
    pub field: String,

    /// Wire column name. Snake case of the field name, or the computed
    /// alias for computed columns.
    pub column: String,

    /// Role of the column inside its table.
    pub role: ColumnRole,

    /// Whether the wire type at this position is frozen.
    pub frozen: bool,

    /// Whether a null read materializes an empty collection.
    pub empty_if_null: bool,

    /// Resolved index of this column.
    pub index: IndexClassification,

    /// Wire type of this position.
    pub wire: WireType,

    /// Structure and codecs beneath this position.
    pub mapping: FieldMapping,

    /// How generated code reaches the value.
    pub accessors: AccessorBindings
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn compact(tokens: &TokenStream) -> String {
        tokens.to_string().replace(' ', "")
    }

    #[test]
    fn accessor_methods_are_the_default() {
        let ident: Ident = parse_quote!(email);
        let bindings = AccessorBindings::entity(&ident, false, false);
        let AccessorBindings::Entity { read, write } = bindings else {
            panic!("expected entity bindings");
        };
        assert_eq!(compact(&read), "entity.email()");
        assert_eq!(compact(&write), "entity.set_email(value)");
    }

    #[test]
    fn direct_field_access_skips_methods() {
        let ident: Ident = parse_quote!(email);
        let AccessorBindings::Entity { read, write } = AccessorBindings::entity(&ident, true, true)
        else {
            panic!("expected entity bindings");
        };
        assert_eq!(compact(&read), "entity.email");
        assert_eq!(compact(&write), "entity.email=value");
    }

    #[test]
    fn flags_apply_independently() {
        let ident: Ident = parse_quote!(score);
        let AccessorBindings::Entity { read, write } = AccessorBindings::entity(&ident, true, false)
        else {
            panic!("expected entity bindings");
        };
        assert_eq!(compact(&read), "entity.score");
        assert_eq!(compact(&write), "entity.set_score(value)");
    }
}
