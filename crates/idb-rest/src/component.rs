// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! The typed atomic values that make up an Item.
//!
//! Every component renders to exactly one canonical token (see [`crate::token`]
//! for the inverse). Components only order against components of the same
//! variant; the server's inter-type order is not reproduced on the client.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

use crate::error::{Error, Result};

/// Maximum payload of a `Bytes` or `ByteString` component.
pub const MAX_BYTES_LEN: usize = 1024;
/// Maximum payload of a `Chars` component, in chars.
pub const MAX_CHARS_LEN: usize = 1024;

/// Returns true for names matching `[A-Z][A-Za-z0-9._-]*`.
pub fn is_legal_entity_class_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase()) && is_identifier(name)
}

/// Returns true for names matching `[a-z][A-Za-z0-9._-]*`.
pub fn is_legal_attribute_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase()) && is_identifier(name)
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Identity of an `EntityClass` or `Attribute` component.
///
/// A tag is either named or identified by a numeric id. Equality, hashing and
/// ordering use only the canonical string: the name, or `EntityClass(<id>)` /
/// `Attribute(<id>)` for id-based tags.
#[derive(Debug, Clone)]
pub struct TagName {
    canonical: String,
    id: Option<u64>,
}

impl TagName {
    fn named(name: &str) -> Self {
        Self {
            canonical: name.to_string(),
            id: None,
        }
    }

    fn numbered(kind: &str, id: u64) -> Self {
        Self {
            canonical: format!("{kind}({id})"),
            id: Some(id),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        match self.id {
            Some(_) => None,
            None => Some(&self.canonical),
        }
    }
}

impl PartialEq for TagName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for TagName {}

impl Hash for TagName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for TagName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TagName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

/// Byte payload of at most [`MAX_BYTES_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByteArray(Vec<u8>);

impl ByteArray {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() > MAX_BYTES_LEN {
            return Err(Error::value(format!(
                "byte component of {} bytes exceeds maximum {MAX_BYTES_LEN}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Uppercase hex pairs joined by single underscores, e.g. `5A_26`.
    pub fn to_hex_pairs(&self) -> String {
        let hex = hex::encode_upper(&self.0);
        let mut out = String::with_capacity(hex.len() + hex.len() / 2);
        for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
            if i > 0 {
                out.push('_');
            }
            out.extend(pair.iter().map(|b| *b as char));
        }
        out
    }
}

/// Char payload of at most [`MAX_CHARS_LEN`] chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharArray(String);

impl CharArray {
    pub fn new(chars: impl Into<String>) -> Result<Self> {
        let chars = chars.into();
        let count = chars.chars().count();
        if count > MAX_CHARS_LEN {
            return Err(Error::value(format!(
                "Chars component of {count} chars exceeds maximum {MAX_CHARS_LEN}"
            )));
        }
        Ok(Self(chars))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One atomic, immutable element of an Item.
#[derive(Debug, Clone)]
pub enum Component {
    String(String),
    Boolean(bool),
    Null,
    Integer(i64),
    /// A native double; its token always contains a decimal point.
    Double(f64),
    /// The database's own float type; its token carries a trailing `f`.
    Float(f32),
    Date(DateTime<FixedOffset>),
    EntityClass(TagName),
    Attribute(TagName),
    /// Orders by length first, then lexicographically.
    Bytes(ByteArray),
    /// Orders purely lexicographically.
    ByteString(ByteArray),
    Chars(CharArray),
    /// A position within a list stored as a map.
    Index(u64),
}

impl Component {
    pub fn entity_class(name: &str) -> Result<Self> {
        if !is_legal_entity_class_name(name) {
            return Err(Error::value(format!(
                "EntityClass name must match [A-Z][A-Za-z0-9._-]*: {name:?}"
            )));
        }
        Ok(Component::EntityClass(TagName::named(name)))
    }

    pub fn entity_class_id(id: u64) -> Self {
        Component::EntityClass(TagName::numbered("EntityClass", id))
    }

    pub fn attribute(name: &str) -> Result<Self> {
        if !is_legal_attribute_name(name) {
            return Err(Error::value(format!(
                "Attribute name must match [a-z][A-Za-z0-9._-]*: {name:?}"
            )));
        }
        Ok(Component::Attribute(TagName::named(name)))
    }

    pub fn attribute_id(id: u64) -> Self {
        Component::Attribute(TagName::numbered("Attribute", id))
    }

    /// A `Double`; infinities and NaN have no token and are rejected.
    pub fn double(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::value(format!("Double must be finite, got {value}")));
        }
        Ok(Component::Double(value))
    }

    pub fn float(value: f32) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::value(format!("Float must be finite, got {value}")));
        }
        Ok(Component::Float(value))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Component::Bytes(ByteArray::new(bytes)?))
    }

    pub fn byte_string(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Component::ByteString(ByteArray::new(bytes)?))
    }

    pub fn chars(chars: impl Into<String>) -> Result<Self> {
        Ok(Component::Chars(CharArray::new(chars)?))
    }

    /// The canonical token, failing for a non-finite `Double` or `Float`
    /// built directly from its variant.
    pub fn to_token(&self) -> Result<String> {
        match self {
            Component::Double(v) if !v.is_finite() => Err(non_finite(self)),
            Component::Float(v) if !v.is_finite() => Err(non_finite(self)),
            _ => Ok(self.to_string()),
        }
    }

    /// Short variant name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Component::String(_) => "String",
            Component::Boolean(_) => "Boolean",
            Component::Null => "Null",
            Component::Integer(_) => "Integer",
            Component::Double(_) => "Double",
            Component::Float(_) => "Float",
            Component::Date(_) => "Date",
            Component::EntityClass(_) => "EntityClass",
            Component::Attribute(_) => "Attribute",
            Component::Bytes(_) => "Bytes",
            Component::ByteString(_) => "ByteString",
            Component::Chars(_) => "Chars",
            Component::Index(_) => "Index",
        }
    }

    /// EntityClass and Attribute components delimit tuples within an Item.
    pub fn is_tag(&self) -> bool {
        matches!(self, Component::EntityClass(_) | Component::Attribute(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Component::Null)
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Component::Index(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Component::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Component::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value of an `Integer`, `Double` or `Float` component.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Component::Integer(v) => Some(*v as f64),
            Component::Double(v) => Some(*v),
            Component::Float(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Compares two components of the same variant.
    ///
    /// Components of different variants are unorderable on the client and
    /// produce [`Error::Type`].
    pub fn try_cmp(&self, other: &Component) -> Result<Ordering> {
        use Component::*;
        let ordering = match (self, other) {
            (String(a), String(b)) => a.cmp(b),
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Null, Null) => Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Double(a), Double(b)) => a.total_cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (EntityClass(a), EntityClass(b)) => a.cmp(b),
            (Attribute(a), Attribute(b)) => a.cmp(b),
            (Bytes(a), Bytes(b)) => a.len().cmp(&b.len()).then_with(|| a.0.cmp(&b.0)),
            (ByteString(a), ByteString(b)) => a.0.cmp(&b.0),
            (Chars(a), Chars(b)) => a.cmp(b),
            (Index(a), Index(b)) => a.cmp(b),
            _ => {
                return Err(Error::type_error(format!(
                    "unorderable components: {} {self} and {} {other}",
                    self.kind(),
                    other.kind()
                )))
            }
        };
        Ok(ordering)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        use Component::*;
        match (self, other) {
            (String(a), String(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (Null, Null) => true,
            (Integer(a), Integer(b)) => a == b,
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Date(a), Date(b)) => a == b,
            (EntityClass(a), EntityClass(b)) => a == b,
            (Attribute(a), Attribute(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (ByteString(a), ByteString(b)) => a == b,
            (Chars(a), Chars(b)) => a == b,
            (Index(a), Index(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Component::String(s) => s.hash(state),
            Component::Boolean(b) => b.hash(state),
            Component::Null => {}
            Component::Integer(v) => v.hash(state),
            Component::Double(v) => v.to_bits().hash(state),
            Component::Float(v) => v.to_bits().hash(state),
            Component::Date(d) => d.hash(state),
            Component::EntityClass(t) | Component::Attribute(t) => t.hash(state),
            Component::Bytes(b) | Component::ByteString(b) => b.hash(state),
            Component::Chars(c) => c.hash(state),
            Component::Index(i) => i.hash(state),
        }
    }
}

impl PartialOrd for Component {
    /// `None` for components of different variants.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

/// Renders the canonical token, the exact inverse of
/// [`parse_primitive`](crate::token::parse_primitive) for every component
/// [`Component::to_token`] accepts.
impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::String(s) => write!(f, "{}", serde_json::Value::from(s.as_str())),
            Component::Boolean(b) => write!(f, "{b}"),
            Component::Null => f.write_str("null"),
            Component::Integer(v) => write!(f, "{v}"),
            Component::Double(v) => f.write_str(&decimal(v.to_string())),
            Component::Float(v) => write!(f, "{}f", decimal(v.to_string())),
            Component::Date(d) => f.write_str(&date_token(d)),
            Component::EntityClass(t) | Component::Attribute(t) => f.write_str(t.as_str()),
            Component::Bytes(b) => write!(f, "Bytes({})", b.to_hex_pairs()),
            Component::ByteString(b) => write!(f, "ByteString({})", b.to_hex_pairs()),
            Component::Chars(c) => write!(f, "Chars({})", serde_json::Value::from(c.as_str())),
            Component::Index(i) => write!(f, "[{i}]"),
        }
    }
}

fn non_finite(component: &Component) -> Error {
    Error::value(format!(
        "non-finite {} {component} has no token",
        component.kind()
    ))
}

// Milliseconds at least; finer fractions are kept whole.
fn date_token(date: &DateTime<FixedOffset>) -> String {
    let format = if date.timestamp_subsec_nanos() % 1_000_000 == 0 {
        SecondsFormat::Millis
    } else {
        SecondsFormat::AutoSi
    };
    date.to_rfc3339_opts(format, true)
}

// Rust never prints floats in exponent form via Display, so appending ".0" is
// enough to keep the decimal point that separates doubles from integers.
fn decimal(mut text: String) -> String {
    if !text.contains('.') && !text.contains("inf") && !text.contains("NaN") {
        text.push_str(".0");
    }
    text
}

impl From<&str> for Component {
    fn from(value: &str) -> Self {
        Component::String(value.to_string())
    }
}

impl From<String> for Component {
    fn from(value: String) -> Self {
        Component::String(value)
    }
}

impl From<bool> for Component {
    fn from(value: bool) -> Self {
        Component::Boolean(value)
    }
}

impl From<i64> for Component {
    fn from(value: i64) -> Self {
        Component::Integer(value)
    }
}

impl From<i32> for Component {
    fn from(value: i32) -> Self {
        Component::Integer(i64::from(value))
    }
}

impl TryFrom<f64> for Component {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Component::double(value)
    }
}

impl TryFrom<f32> for Component {
    type Error = Error;

    fn try_from(value: f32) -> Result<Self> {
        Component::float(value)
    }
}

impl From<DateTime<FixedOffset>> for Component {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Component::Date(value)
    }
}

impl From<DateTime<Utc>> for Component {
    fn from(value: DateTime<Utc>) -> Self {
        Component::Date(value.fixed_offset())
    }
}
