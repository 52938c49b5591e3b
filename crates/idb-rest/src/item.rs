// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;
use std::fmt;

use crate::component::Component;
use crate::error::Result;
use crate::token::parse_token_string_into_components;

/// An ordered sequence of components: one record key in the item space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Item(Vec<Component>);

/// One run of an Item split at its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSegment {
    /// Consecutive non-tag components, possibly empty.
    Tuple(Vec<Component>),
    Tag(Component),
}

impl Item {
    pub fn new(components: Vec<Component>) -> Self {
        Self(components)
    }

    /// Parses a space-separated token line.
    pub fn parse(text: &str) -> Result<Self> {
        parse_token_string_into_components(text).map(Self)
    }

    pub fn as_slice(&self) -> &[Component] {
        &self.0
    }

    pub fn into_components(self) -> Vec<Component> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, component: Component) {
        self.0.push(component);
    }

    /// The first `len` components, clamped to the item length.
    pub fn prefix(&self, len: usize) -> &[Component] {
        &self.0[..len.min(self.0.len())]
    }

    pub fn truncated(&self, len: usize) -> Item {
        Item(self.prefix(len).to_vec())
    }

    pub fn starts_with(&self, prefix: &[Component]) -> bool {
        self.0.starts_with(prefix)
    }

    /// Offset just past the last tag, or 0 when the item has no tags.
    pub fn last_tuple_offset(&self) -> usize {
        self.0
            .iter()
            .rposition(Component::is_tag)
            .map_or(0, |pos| pos + 1)
    }

    /// Offset of the first tag at or after `from`, or the item length.
    pub fn tuple_end(&self, from: usize) -> usize {
        self.0
            .iter()
            .skip(from)
            .position(Component::is_tag)
            .map_or(self.0.len(), |pos| from + pos)
    }

    /// Lexicographic comparison; a shorter prefix sorts first.
    ///
    /// Fails when two components at the same position are of different
    /// variants.
    pub fn try_cmp(&self, other: &Item) -> Result<Ordering> {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.try_cmp(b)? {
                Ordering::Equal => continue,
                unequal => return Ok(unequal),
            }
        }
        Ok(self.0.len().cmp(&other.0.len()))
    }

    /// Splits the item into alternating tuples and tags.
    ///
    /// `E "e" 9 a "v" 42` becomes `() E ("e" 9) a ("v" 42)`, always one more
    /// tuple than there are tags.
    pub fn to_tuples(&self) -> Vec<ItemSegment> {
        let mut segments = Vec::new();
        let mut tuple = Vec::new();
        for component in &self.0 {
            if component.is_tag() {
                segments.push(ItemSegment::Tuple(std::mem::take(&mut tuple)));
                segments.push(ItemSegment::Tag(component.clone()));
            } else {
                tuple.push(component.clone());
            }
        }
        segments.push(ItemSegment::Tuple(tuple));
        segments
    }
}

pub fn item_to_tuples(item: &Item) -> Vec<ItemSegment> {
    item.to_tuples()
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl From<Vec<Component>> for Item {
    fn from(components: Vec<Component>) -> Self {
        Self(components)
    }
}

impl From<&[Component]> for Item {
    fn from(components: &[Component]) -> Self {
        Self(components.to_vec())
    }
}

impl FromIterator<Component> for Item {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Item {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
