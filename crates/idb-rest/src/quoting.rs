// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Underscore quoting: the wire JSON form of component trees.
//!
//! JSON has no place for most component variants, so they travel as strings
//! prefixed with `_` followed by their token. Plain strings that already start
//! with `_` get one more `_` stuffed in front.

use serde_json::{Map, Number, Value};

use crate::component::Component;
use crate::error::{Error, Result};
use crate::token::parse_primitive;
use crate::tree::{Key, Tree, TreeMap};

/// Quotes a component for use as a JSON object key.
pub fn quote_key(component: &Component) -> Result<String> {
    match component {
        Component::String(s) if s.starts_with('_') => Ok(format!("_{s}")),
        Component::String(s) => Ok(s.clone()),
        other => Ok(format!("_{}", other.to_token()?)),
    }
}

/// Quotes a component for use as a JSON value.
///
/// Null, booleans, integers and doubles stay native JSON.
pub fn quote_value(component: &Component) -> Result<Value> {
    match component {
        Component::Null => Ok(Value::Null),
        Component::Boolean(b) => Ok(Value::Bool(*b)),
        Component::Integer(v) => Ok(Value::Number(Number::from(*v))),
        Component::Double(v) => Number::from_f64(*v)
            .map(Value::Number)
            .ok_or_else(|| Error::value(format!("cannot quote non-finite number {component}"))),
        other => quote_key(other).map(Value::String),
    }
}

/// Converts a tree into underscore-quoted JSON.
///
/// Tuple paths have no JSON form; unflatten first.
pub fn quote(tree: &Tree) -> Result<Value> {
    match tree {
        Tree::Leaf(component) => quote_value(component),
        Tree::List(elements) => Ok(Value::Array(
            elements.iter().map(quote).collect::<Result<_>>()?,
        )),
        Tree::Map(map) => {
            let mut object = Map::new();
            for (key, value) in map.iter() {
                let Key::Component(component) = key else {
                    return Err(path_error(key.components()));
                };
                object.insert(quote_key(component)?, quote(value)?);
            }
            Ok(Value::Object(object))
        }
        Tree::Path(path) => Err(path_error(path)),
    }
}

fn path_error(path: &[Component]) -> Error {
    let tokens: Vec<String> = path.iter().map(Component::to_string).collect();
    Error::type_error(format!(
        "tuple ({}) cannot be underscore-quoted; unflatten first",
        tokens.join(" ")
    ))
}

/// Reads one underscore-quoted string back into a component.
pub fn unquote_str(text: &str) -> Result<Component> {
    if let Some(stuffed) = text.strip_prefix("__") {
        return Ok(Component::String(format!("_{stuffed}")));
    }
    match text.strip_prefix('_') {
        Some("") => Err(Error::syntax("cannot underscore-unquote a lone underscore")),
        Some(token) => parse_primitive(token),
        None => Ok(Component::String(text.to_string())),
    }
}

/// Converts underscore-quoted JSON back into a tree.
pub fn unquote(value: &Value) -> Result<Tree> {
    match value {
        Value::Null => Ok(Tree::null()),
        Value::Bool(b) => Ok(Tree::Leaf(Component::Boolean(*b))),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(v), _) => Ok(Tree::Leaf(Component::Integer(v))),
            (None, Some(v)) => Ok(Tree::Leaf(Component::Double(v))),
            (None, None) => Err(Error::value(format!("unrepresentable JSON number {n}"))),
        },
        Value::String(s) => unquote_str(s).map(Tree::Leaf),
        Value::Array(elements) => Ok(Tree::List(
            elements.iter().map(unquote).collect::<Result<_>>()?,
        )),
        Value::Object(object) => {
            let mut map = TreeMap::new();
            for (key, value) in object {
                map.insert(Key::Component(unquote_str(key)?), unquote(value)?);
            }
            Ok(Tree::Map(map))
        }
    }
}

/// Serializes a tree as an underscore-quoted JSON body.
pub fn encode_json(tree: &Tree) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&quote(tree)?)?)
}

/// Parses an underscore-quoted JSON body. An empty body is an empty map.
pub fn decode_json(body: &[u8]) -> Result<Tree> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Tree::Map(TreeMap::new()));
    }
    let value: Value = serde_json::from_slice(body)?;
    unquote(&value)
}
