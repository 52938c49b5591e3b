// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Nested trees of components, the in-memory form of JSON documents and
//! flattened tuple maps.

use crate::component::Component;
use crate::item::Item;

/// A mapping key: a single component or a tuple path of components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Component(Component),
    Path(Vec<Component>),
}

impl Key {
    pub fn path(components: impl IntoIterator<Item = Component>) -> Self {
        Key::Path(components.into_iter().collect())
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Key::Component(c) if c.is_tag())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Key::Component(Component::Null))
    }

    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Key::Component(c) => Some(c),
            Key::Path(_) => None,
        }
    }

    /// The key's components: one for a component key, all of them for a path.
    pub fn components(&self) -> &[Component] {
        match self {
            Key::Component(c) => std::slice::from_ref(c),
            Key::Path(p) => p,
        }
    }
}

impl From<Component> for Key {
    fn from(value: Component) -> Self {
        Key::Component(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Component(Component::from(value))
    }
}

impl From<Vec<Component>> for Key {
    fn from(value: Vec<Component>) -> Self {
        Key::Path(value)
    }
}

/// Insertion-ordered association list. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct TreeMap {
    entries: Vec<(Key, Tree)>,
}

impl TreeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&Tree> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Tree> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Inserts or replaces in place, returning the previous value.
    pub fn insert(&mut self, key: impl Into<Key>, value: Tree) -> Option<Tree> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Returns the value for `key`, inserting `default()` first if absent.
    pub fn get_or_insert_with(&mut self, key: Key, default: impl FnOnce() -> Tree) -> &mut Tree {
        let pos = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(pos) => pos,
            None => {
                self.entries.push((key, default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    pub fn remove(&mut self, key: &Key) -> Option<Tree> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Tree)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Tree> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl PartialEq for TreeMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for TreeMap {}

impl<K: Into<Key>> FromIterator<(K, Tree)> for TreeMap {
    fn from_iter<I: IntoIterator<Item = (K, Tree)>>(iter: I) -> Self {
        let mut map = TreeMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for TreeMap {
    type Item = (Key, Tree);
    type IntoIter = std::vec::IntoIter<(Key, Tree)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A JSON-like document whose scalars are components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    Leaf(Component),
    /// A tuple value; only produced by flattening.
    Path(Vec<Component>),
    Map(TreeMap),
    List(Vec<Tree>),
}

impl Tree {
    pub fn null() -> Self {
        Tree::Leaf(Component::Null)
    }

    pub fn leaf(component: impl Into<Component>) -> Self {
        Tree::Leaf(component.into())
    }

    pub fn map<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Tree)>) -> Self {
        Tree::Map(entries.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Tree::Leaf(Component::Null))
    }

    pub fn is_empty_map(&self) -> bool {
        matches!(self, Tree::Map(map) if map.is_empty())
    }

    pub fn as_map(&self) -> Option<&TreeMap> {
        match self {
            Tree::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tree]> {
        match self {
            Tree::List(list) => Some(list),
            _ => None,
        }
    }

    /// A map-of-maps chain for one Item, ending in a `Null` leaf.
    ///
    /// The empty Item yields an empty map.
    pub fn from_item(item: &Item) -> Tree {
        item.as_slice()
            .iter()
            .rev()
            .fold(None, |child, component| {
                Some(Tree::map([(
                    Key::Component(component.clone()),
                    child.unwrap_or_else(Tree::null),
                )]))
            })
            .unwrap_or_else(|| Tree::Map(TreeMap::new()))
    }

    /// Enumerates the Items this tree represents.
    ///
    /// Keys contribute their components, list elements contribute their
    /// position as an `Index`, and a non-null leaf or path value contributes a
    /// final run of components. Empty maps and lists contribute nothing.
    pub fn to_items(&self) -> Vec<Item> {
        let mut items = Vec::new();
        let mut prefix = Vec::new();
        collect_items(self, &mut prefix, &mut items);
        items
    }
}

fn collect_items(tree: &Tree, prefix: &mut Vec<Component>, out: &mut Vec<Item>) {
    match tree {
        Tree::Leaf(Component::Null) => {
            if !prefix.is_empty() {
                out.push(Item::from(prefix.as_slice()));
            }
        }
        Tree::Leaf(component) => {
            let mut item = Item::from(prefix.as_slice());
            item.push(component.clone());
            out.push(item);
        }
        Tree::Path(path) => {
            if !prefix.is_empty() || !path.is_empty() {
                out.push(prefix.iter().chain(path).cloned().collect());
            }
        }
        Tree::List(elements) => {
            for (i, element) in elements.iter().enumerate() {
                prefix.push(Component::Index(i as u64));
                collect_items(element, prefix, out);
                prefix.pop();
            }
        }
        Tree::Map(map) => {
            for (key, value) in map.iter() {
                let depth = prefix.len();
                prefix.extend_from_slice(key.components());
                collect_items(value, prefix, out);
                prefix.truncate(depth);
            }
        }
    }
}

impl From<Component> for Tree {
    fn from(value: Component) -> Self {
        Tree::Leaf(value)
    }
}

impl From<TreeMap> for Tree {
    fn from(value: TreeMap) -> Self {
        Tree::Map(value)
    }
}

impl From<Vec<Tree>> for Tree {
    fn from(value: Vec<Tree>) -> Self {
        Tree::List(value)
    }
}
