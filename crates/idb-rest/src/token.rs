// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Token grammar: parsing canonical component tokens and whitespace-separated
//! token strings.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::component::{is_identifier, Component};
use crate::error::{Error, Result};
use crate::item::Item;

const CHARS_OPEN: &str = "Chars(";
const BYTES_OPEN: &str = "Bytes(";
const BYTE_STRING_OPEN: &str = "ByteString(";
const ENTITY_CLASS_OPEN: &str = "EntityClass(";
const ATTRIBUTE_OPEN: &str = "Attribute(";

/// Parses one canonical token into a component.
pub fn parse_primitive(token: &str) -> Result<Component> {
    let Some(first) = token.chars().next() else {
        return Err(Error::syntax("expected a component token, found empty text"));
    };

    if first == '"' {
        let end = skip_json_string(token, 0)?;
        if end != token.len() {
            return Err(Error::syntax(format!(
                "unexpected text after string token: '{token}'"
            )));
        }
        return Ok(Component::String(decode_json_string(token)?));
    }
    match token {
        "true" => return Ok(Component::Boolean(true)),
        "false" => return Ok(Component::Boolean(false)),
        "null" => return Ok(Component::Null),
        _ => {}
    }
    if first.is_ascii_digit() || first == '+' || first == '-' {
        return parse_numeric(token);
    }
    if first == '[' {
        return parse_index(token);
    }
    if let Some(inner) = wrapped(token, BYTES_OPEN) {
        return Component::bytes(parse_hex_pairs(inner, token)?);
    }
    if let Some(inner) = wrapped(token, BYTE_STRING_OPEN) {
        return Component::byte_string(parse_hex_pairs(inner, token)?);
    }
    if let Some(inner) = wrapped(token, CHARS_OPEN) {
        if !inner.starts_with('"') || skip_json_string(inner, 0)? != inner.len() {
            return Err(Error::syntax(format!("malformed Chars token: '{token}'")));
        }
        return Component::chars(decode_json_string(inner)?);
    }
    if let Some(id) = wrapped(token, ENTITY_CLASS_OPEN).and_then(parse_tag_id) {
        return Ok(Component::entity_class_id(id));
    }
    if let Some(id) = wrapped(token, ATTRIBUTE_OPEN).and_then(parse_tag_id) {
        return Ok(Component::attribute_id(id));
    }
    if is_identifier(token) {
        return if first.is_ascii_uppercase() {
            Component::entity_class(token)
        } else {
            Component::attribute(token)
        };
    }
    Err(Error::syntax(format!("unrecognized component token: '{token}'")))
}

fn wrapped<'a>(token: &'a str, open: &str) -> Option<&'a str> {
    token.strip_prefix(open)?.strip_suffix(')')
}

fn parse_tag_id(inner: &str) -> Option<u64> {
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    inner.parse().ok()
}

fn parse_numeric(token: &str) -> Result<Component> {
    let digits = token.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && token.as_bytes().get(digits) == Some(&b'-') {
        return parse_date(token).map(Component::Date);
    }
    if token.contains('.') {
        if let Some(float) = token.strip_suffix('f') {
            let value = float
                .parse::<f32>()
                .map_err(|_| Error::syntax(format!("malformed Float token: '{token}'")))?;
            return Component::float(value);
        }
        let value = token
            .parse::<f64>()
            .map_err(|_| Error::syntax(format!("malformed double token: '{token}'")))?;
        return Component::double(value);
    }
    token
        .parse::<i64>()
        .map(Component::Integer)
        .map_err(|_| Error::syntax(format!("malformed integer token: '{token}'")))
}

fn parse_index(token: &str) -> Result<Component> {
    let inner = token
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::syntax(format!("Index token must end with ']': '{token}'")))?;
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::syntax(format!("malformed Index token: '{token}'")));
    }
    inner
        .parse::<u64>()
        .map(Component::Index)
        .map_err(|_| Error::syntax(format!("Index out of range: '{token}'")))
}

fn parse_hex_pairs(inner: &str, token: &str) -> Result<Vec<u8>> {
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    let mut digits = String::with_capacity(inner.len());
    for pair in inner.split('_') {
        if pair.len() != 2 {
            return Err(Error::syntax(format!(
                "byte tokens need hex pairs separated by '_': '{token}'"
            )));
        }
        digits.push_str(pair);
    }
    hex::decode(&digits).map_err(|err| Error::syntax(format!("bad hex in '{token}': {err}")))
}

/// Parses a date token.
///
/// RFC 3339 with an offset or `Z` is preferred; offset-less forms are taken
/// as UTC.
pub fn parse_date(token: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(token) {
        return Ok(date);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc().fixed_offset());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc().fixed_offset());
    }
    Err(Error::syntax(format!("malformed date token: '{token}'")))
}

/// Returns the offset just past the JSON string starting at `start`.
///
/// The text at `start` must be a double quote. Escapes are validated but not
/// decoded.
pub fn skip_json_string(text: &str, start: usize) -> Result<usize> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'"') {
        return Err(Error::syntax(format!(
            "expected '\"' at offset {start} in '{text}'"
        )));
    }
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => return Ok(i + 1),
            b'\\' => {
                match bytes.get(i + 1) {
                    Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => i += 2,
                    Some(b'u') => i += 6,
                    _ => {
                        return Err(Error::syntax(format!(
                            "bad escape at offset {i} in '{text}'"
                        )))
                    }
                }
            }
            _ => i += 1,
        }
    }
    Err(Error::syntax(format!("unterminated string: '{}'", &text[start..])))
}

fn decode_json_string(quoted: &str) -> Result<String> {
    serde_json::from_str::<String>(quoted)
        .map_err(|err| Error::syntax(format!("malformed string {quoted}: {err}")))
}

/// Returns the end offset of the token starting at `pos`, or `None` when no
/// text remains.
///
/// Strings and `Chars(...)` may contain whitespace. Any other token ends at
/// the first character `<= ' '`, so a zero-length result means `pos` sits on
/// a control character.
pub fn skip_component(text: &str, pos: usize) -> Result<Option<usize>> {
    if pos >= text.len() {
        return Ok(None);
    }
    let rest = &text[pos..];
    if rest.starts_with('"') {
        return skip_json_string(text, pos).map(Some);
    }
    if rest.starts_with(CHARS_OPEN) {
        let end = skip_json_string(text, pos + CHARS_OPEN.len())?;
        if text.as_bytes().get(end) != Some(&b')') {
            return Err(Error::syntax(format!(
                "Chars token missing ')': '{rest}'"
            )));
        }
        return Ok(Some(end + 1));
    }
    let len = rest.find(|c: char| c <= ' ').unwrap_or(rest.len());
    Ok(Some(pos + len))
}

fn skip_separators(text: &str, mut pos: usize) -> usize {
    let bytes = text.as_bytes();
    while matches!(bytes.get(pos), Some(b' ' | b'\r' | b'\n')) {
        pos += 1;
    }
    pos
}

/// Parses a space-separated token string, such as one line of a batch
/// response, into components.
pub fn parse_token_string_into_components(text: &str) -> Result<Vec<Component>> {
    let mut components = Vec::new();
    let mut pos = skip_separators(text, 0);
    while let Some(end) = skip_component(text, pos)? {
        if end == pos {
            let found = text[pos..].chars().next().unwrap_or(' ');
            return Err(Error::syntax(format!(
                "illegal character {found:?} at offset {pos} in '{text}'"
            )));
        }
        components.push(parse_primitive(&text[pos..end])?);
        pos = skip_separators(text, end);
        if pos == end && pos < text.len() {
            return Err(Error::syntax(format!(
                "unexpected text after token at offset {end} in '{text}'"
            )));
        }
    }
    Ok(components)
}

/// Parses a batch response body: one Item per non-empty line.
pub fn parse_items(text: &str) -> Result<Vec<Item>> {
    let items = text
        .lines()
        .filter(|line| !line.trim_matches(|c| c == ' ' || c == '\r').is_empty())
        .map(Item::parse)
        .collect::<Result<Vec<_>>>()?;
    tracing::trace!(items = items.len(), "parsed item lines");
    Ok(items)
}
