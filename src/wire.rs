// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! CQL wire type model.
//!
//! [`WireType`] describes the column type a field occupies on the wire,
//! exactly as it would appear in DDL: native types, collections, tuples,
//! user-defined types, and `frozen<...>` wrappers.
//!
//! # Native Types
//!
//! | CQL | Carried as |
//! |-----|-----------|
//! | `ascii`, `text` | strings |
//! | `tinyint`, `smallint`, `int`, `bigint`, `varint` | integers |
//! | `float`, `double`, `decimal` | fractional numbers |
//! | `boolean` | booleans |
//! | `blob` | raw bytes |
//! | `counter` | distributed counters |
//! | `date`, `time`, `timestamp` | dates, times, instants |
//! | `uuid`, `timeuuid` | UUIDs |
//! | `inet` | IP addresses |

use std::fmt;

/// A CQL native type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// `ascii` — US-ASCII string.
    Ascii,

    /// `bigint` — 64-bit signed integer.
    Bigint,

    /// `blob` — arbitrary bytes.
    Blob,

    /// `boolean` — true/false.
    Boolean,

    /// `counter` — distributed 64-bit counter.
    Counter,

    /// `date` — date without a time component.
    Date,

    /// `decimal` — variable-precision decimal.
    Decimal,

    /// `double` — 64-bit IEEE-754 float.
    Double,

    /// `float` — 32-bit IEEE-754 float.
    Float,

    /// `inet` — IPv4 or IPv6 address.
    Inet,

    /// `int` — 32-bit signed integer.
    Int,

    /// `smallint` — 16-bit signed integer.
    Smallint,

    /// `text` — UTF-8 string.
    Text,

    /// `time` — time without a date component.
    Time,

    /// `timestamp` — instant with millisecond precision.
    Timestamp,

    /// `timeuuid` — version 1 UUID, time ordered.
    Timeuuid,

    /// `tinyint` — 8-bit signed integer.
    Tinyint,

    /// `uuid` — any UUID version.
    Uuid,

    /// `varint` — arbitrary-precision integer.
    Varint
}

impl NativeType {
    /// The type name as written in CQL DDL.
    #[must_use]
    pub fn cql_name(&self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Bigint => "bigint",
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::Counter => "counter",
            Self::Date => "date",
            Self::Decimal => "decimal",
            Self::Double => "double",
            Self::Float => "float",
            Self::Inet => "inet",
            Self::Int => "int",
            Self::Smallint => "smallint",
            Self::Text => "text",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Timeuuid => "timeuuid",
            Self::Tinyint => "tinyint",
            Self::Uuid => "uuid",
            Self::Varint => "varint"
        }
    }
}

/// The wire (CQL) type of a resolved column, including nesting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireType {
    /// A native type.
    Native(NativeType),

    /// `list<inner>`.
    List(Box<WireType>),

    /// `set<inner>`.
    Set(Box<WireType>),

    /// `map<key, value>`.
    Map(Box<WireType>, Box<WireType>),

    /// `tuple<...>` of the element wire types.
    Tuple(Vec<WireType>),

    /// A user-defined type referenced by name.
    Udt(String),

    /// `frozen<inner>`.
    Frozen(Box<WireType>)
}

impl WireType {
    /// Wrap a wire type in `frozen<...>`.
    ///
    /// Idempotent: freezing an already frozen type returns it unchanged.
    #[must_use]
    pub fn frozen(inner: Self) -> Self {
        match inner {
            Self::Frozen(_) => inner,
            other => Self::Frozen(Box::new(other))
        }
    }

    /// Whether the outermost wrapper is `frozen<...>`.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        matches!(self, Self::Frozen(_))
    }

    /// Render the type exactly as it appears in DDL.
    #[must_use]
    pub fn rendered(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(native) => f.write_str(native.cql_name()),
            Self::List(inner) => write!(f, "list<{inner}>"),
            Self::Set(inner) => write!(f, "set<{inner}>"),
            Self::Map(key, value) => write!(f, "map<{key}, {value}>"),
            Self::Tuple(elements) => {
                f.write_str("tuple<")?;
                for (position, element) in elements.iter().enumerate() {
                    if position > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(">")
            }
            Self::Udt(name) => f.write_str(name),
            Self::Frozen(inner) => write!(f, "frozen<{inner}>")
        }
    }
}
