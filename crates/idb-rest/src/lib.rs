// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Client core for an item-space database reached over a JSON REST surface.
//!
//! Provides the typed component model and its token grammar, the
//! underscore-quoted JSON and extended text codecs, the tree to tuple
//! flattening engine, and a buffered cursor over any [`ItemSource`].

pub mod component;
pub mod config;
pub mod cursor;
pub mod error;
pub mod extended;
pub mod flatten;
pub mod item;
pub mod quoting;
pub mod testing;
pub mod token;
pub mod tree;

#[cfg(test)]
mod test_util;

pub use crate::component::{
    is_legal_attribute_name, is_legal_entity_class_name, ByteArray, CharArray, Component, TagName,
    MAX_BYTES_LEN, MAX_CHARS_LEN,
};
pub use crate::config::{CursorConfig, DEFAULT_BUFFER_SIZE};
pub use crate::cursor::{Bound, Cursor, ItemSource, NextBuffer};
pub use crate::error::{is_remote_error, Error, RemoteError, Result};
pub use crate::extended::{parse_extended, render_extended};
pub use crate::flatten::{
    compact_tips, flatten, flatten_to_tuples, lists_to_markers, markers_to_lists, uncompact_tips,
    unflatten, FlattenOptions, TipMode, MAX_LIST_PADDING,
};
pub use crate::item::{item_to_tuples, Item, ItemSegment};
pub use crate::quoting::{
    decode_json, encode_json, quote, quote_key, quote_value, unquote, unquote_str,
};
pub use crate::token::{
    parse_items, parse_primitive, parse_token_string_into_components, skip_component,
};
pub use crate::tree::{Key, Tree, TreeMap};
