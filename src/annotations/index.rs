// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Secondary-index annotation payloads.
//!
//! Three index families exist and are mutually exclusive on one column:
//! native secondary indexes (`index`), SASI indexes (`sasi`), and search
//! indexes (`search`).

/// Payload of `index(...)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexConfig {
    /// Index name. Defaults to `{field}_index` when absent.
    pub name: Option<String>,

    /// Fully qualified custom indexer class.
    ///
    /// Presence switches the index category to `Custom`.
    pub custom_class: Option<String>,

    /// Raw option string passed through to the indexer.
    pub options: Option<String>
}

/// SASI operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SasiMode {
    /// Prefix matching (default).
    #[default]
    Prefix,

    /// Substring matching. Requires an analyzed index.
    Contains,

    /// Sparse mode for columns where few rows share a value.
    Sparse
}

impl SasiMode {
    /// Parse a mode name.
    ///
    /// Returns `None` for unrecognized values.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "prefix" => Some(Self::Prefix),
            "contains" => Some(Self::Contains),
            "sparse" => Some(Self::Sparse),
            _ => None
        }
    }
}

/// Token normalization applied by the SASI analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// No normalization (default).
    #[default]
    None,

    /// Lowercase all tokens.
    Lowercase,

    /// Uppercase all tokens.
    Uppercase
}

impl Normalization {
    /// Parse a normalization name.
    ///
    /// Returns `None` for unrecognized values.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "lowercase" => Some(Self::Lowercase),
            "uppercase" => Some(Self::Uppercase),
            _ => None
        }
    }
}

/// Payload of `sasi(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasiConfig {
    /// Operation mode.
    pub mode: SasiMode,

    /// Whether values pass through the analyzer.
    pub analyzed: bool,

    /// Fully qualified analyzer class, when overriding the default.
    pub analyzer_class: Option<String>,

    /// Memory ceiling for the index in megabytes.
    pub flush_memory_mb: u32,

    /// Token normalization.
    pub normalization: Normalization,

    /// Analyzer locale.
    pub locale: String,

    /// Whether stemming is applied.
    pub stemming: bool,

    /// Whether stop words are dropped.
    pub skip_stop_words: bool
}

impl Default for SasiConfig {
    fn default() -> Self {
        Self {
            mode: SasiMode::default(),
            analyzed: false,
            analyzer_class: None,
            flush_memory_mb: 1024,
            normalization: Normalization::default(),
            locale: "en".to_string(),
            stemming: false,
            skip_stop_words: false
        }
    }
}

/// Payload of `search(...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchConfig {
    /// Enable full-text analysis on the indexed column.
    pub full_text: bool
}
