// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Conversion between nested trees and tuple-keyed trees.
//!
//! A flattened tree folds runs of plain keys into tuple paths, so that
//! `{"a": {"b": 1}}` becomes `{("a", "b", 1): null}`. EntityClass and
//! Attribute keys are never folded; they stay bare and start a new level.

use crate::component::Component;
use crate::error::{Error, Result};
use crate::tree::{Key, Tree, TreeMap};

/// Largest run of `Null` elements inserted to reach a sparse list position.
pub const MAX_LIST_PADDING: usize = 1024;

/// What to do with the tips of a flattened tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TipMode {
    #[default]
    Keep,
    Compact,
    Uncompact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Turn lists into `Index`-keyed maps before flattening; otherwise
    /// `Index`-keyed maps are turned back into lists.
    pub flatten_lists: bool,
    pub tips: TipMode,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            flatten_lists: true,
            tips: TipMode::Keep,
        }
    }
}

/// Replaces every list with a map keyed by `Index(0..n)`.
pub fn lists_to_markers(tree: &Tree) -> Tree {
    match tree {
        Tree::List(elements) => Tree::Map(
            elements
                .iter()
                .enumerate()
                .map(|(i, element)| {
                    (Key::Component(Component::Index(i as u64)), lists_to_markers(element))
                })
                .collect(),
        ),
        Tree::Map(map) => Tree::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), lists_to_markers(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replaces every map keyed only by `Index` components with a list.
///
/// Gaps between indexes are filled with `Null` unless `collapse_sparse` is
/// set; a gap longer than [`MAX_LIST_PADDING`] is a value error. A map
/// mixing `Index` and other keys is a type error under `strict`
/// and is otherwise kept as a map.
pub fn markers_to_lists(tree: &Tree, strict: bool, collapse_sparse: bool) -> Result<Tree> {
    match tree {
        Tree::List(elements) => Ok(Tree::List(
            elements
                .iter()
                .map(|e| markers_to_lists(e, strict, collapse_sparse))
                .collect::<Result<_>>()?,
        )),
        Tree::Map(map) if !map.is_empty() => {
            let indexes = map
                .keys()
                .filter(|k| matches!(k, Key::Component(Component::Index(_))))
                .count();
            if indexes == map.len() {
                return index_map_to_list(map, strict, collapse_sparse);
            }
            if indexes > 0 && strict {
                return Err(Error::type_error(format!(
                    "map mixes {indexes} Index keys with {} other keys",
                    map.len() - indexes
                )));
            }
            let converted = map
                .iter()
                .map(|(k, v)| -> Result<(Key, Tree)> {
                    Ok((k.clone(), markers_to_lists(v, strict, collapse_sparse)?))
                })
                .collect::<Result<TreeMap>>()?;
            Ok(Tree::Map(converted))
        }
        other => Ok(other.clone()),
    }
}

fn index_map_to_list(map: &TreeMap, strict: bool, collapse_sparse: bool) -> Result<Tree> {
    let mut entries: Vec<(u64, &Tree)> = map
        .iter()
        .filter_map(|(k, v)| match k {
            Key::Component(Component::Index(i)) => Some((*i, v)),
            _ => None,
        })
        .collect();
    entries.sort_by_key(|(i, _)| *i);

    let mut list = Vec::with_capacity(entries.len());
    for (index, value) in entries {
        if !collapse_sparse {
            let position = padded_position(index, list.len())?;
            list.resize(position.max(list.len()), Tree::null());
        }
        list.push(markers_to_lists(value, strict, collapse_sparse)?);
    }
    Ok(Tree::List(list))
}

// Checks that placing an element at `index` in a list of `len` elements pads
// with at most MAX_LIST_PADDING nulls.
fn padded_position(index: u64, len: usize) -> Result<usize> {
    let position = usize::try_from(index)
        .map_err(|_| Error::value(format!("list position {index} out of range")))?;
    let padding = position.saturating_sub(len);
    if padding > MAX_LIST_PADDING {
        return Err(Error::value(format!(
            "list position {position} would pad a list of {len} with {padding} nulls; \
             at most {MAX_LIST_PADDING} are allowed"
        )));
    }
    Ok(position)
}

/// Folds plain keys into tuple paths, preserving lists.
///
/// An empty map or list flattens to `Null`, and a bare scalar `v` to
/// `{(v,): null}`.
pub fn flatten(tree: &Tree) -> Tree {
    match tree {
        Tree::Map(map) if map.is_empty() => Tree::null(),
        Tree::List(elements) if elements.is_empty() => Tree::null(),
        Tree::Map(map) => Tree::Map(flatten_map(map)),
        Tree::List(elements) => Tree::List(elements.iter().map(flatten).collect()),
        Tree::Leaf(Component::Null) => Tree::null(),
        Tree::Leaf(component) => Tree::map([(Key::Path(vec![component.clone()]), Tree::null())]),
        Tree::Path(path) if path.is_empty() => Tree::null(),
        Tree::Path(path) => Tree::map([(Key::Path(path.clone()), Tree::null())]),
    }
}

fn flatten_map(map: &TreeMap) -> TreeMap {
    let mut out = TreeMap::new();
    for (key, value) in map.iter() {
        if key.is_null() {
            continue;
        }
        match flatten(value) {
            Tree::Map(nested) if !nested.is_empty() => fold_nested(&mut out, key, nested),
            list @ Tree::List(_) => {
                out.insert(bare_or_path(key), list);
            }
            _ => {
                out.insert(bare_or_path(key), Tree::null());
            }
        }
    }
    out
}

// A flattened child only has tag keys and tuple keys at its top level.
fn fold_nested(out: &mut TreeMap, key: &Key, nested: TreeMap) {
    let mut tagged = TreeMap::new();
    if key.is_tag() {
        let mut group = TreeMap::new();
        for (child_key, child) in nested {
            if child_key.is_tag() {
                tagged.insert(child_key, child);
            } else {
                group.insert(child_key, child);
            }
        }
        if !tagged.is_empty() {
            group.insert(Key::Path(Vec::new()), Tree::Map(tagged));
        }
        merge_map(out, key.clone(), group);
        return;
    }

    for (child_key, child) in nested {
        if child_key.is_tag() {
            tagged.insert(child_key, child);
        } else {
            let joined = key.components().iter().chain(child_key.components());
            out.insert(Key::Path(joined.cloned().collect()), child);
        }
    }
    if !tagged.is_empty() {
        merge_map(out, Key::Path(key.components().to_vec()), tagged);
    }
}

fn merge_map(out: &mut TreeMap, key: Key, additions: TreeMap) {
    match out.get_mut(&key) {
        Some(Tree::Map(existing)) => {
            for (k, v) in additions {
                existing.insert(k, v);
            }
        }
        _ => {
            out.insert(key, Tree::Map(additions));
        }
    }
}

// Tags stay bare; every other key becomes a tuple.
fn bare_or_path(key: &Key) -> Key {
    if key.is_tag() {
        key.clone()
    } else {
        Key::Path(key.components().to_vec())
    }
}

/// Flattens with list handling and tip treatment chosen by `options`.
pub fn flatten_to_tuples(tree: &Tree, options: FlattenOptions) -> Result<Tree> {
    let prepared = if options.flatten_lists {
        lists_to_markers(tree)
    } else {
        markers_to_lists(tree, false, false)?
    };
    let flat = flatten(&prepared);
    tracing::trace!(flatten_lists = options.flatten_lists, tips = ?options.tips, "flattened tree");
    Ok(match options.tips {
        TipMode::Keep => flat,
        TipMode::Compact => compact_tips(&flat),
        TipMode::Uncompact => uncompact_tips(&flat),
    })
}

/// Expands a tuple-keyed tree back into nested single-component keys.
///
/// Adjacent tuples merge: `{("a",): {("b",): null}}` and `{("a", "b"): null}`
/// unflatten to the same tree. A key first created with an `Index` as its
/// next component becomes a list, padded with at most [`MAX_LIST_PADDING`]
/// nulls per element.
pub fn unflatten(tree: &Tree) -> Result<Tree> {
    let items = tree.to_items();
    let mut root = Tree::Map(TreeMap::new());
    for item in &items {
        insert_path(&mut root, item.as_slice())?;
    }
    tracing::trace!(items = items.len(), "unflattened tree");
    Ok(root)
}

fn container_for(next: &Component) -> Tree {
    if next.is_index() {
        Tree::List(Vec::new())
    } else {
        Tree::Map(TreeMap::new())
    }
}

fn insert_path(container: &mut Tree, path: &[Component]) -> Result<()> {
    let Some((head, rest)) = path.split_first() else {
        return Ok(());
    };
    let child = match container {
        Tree::Map(map) => map.get_or_insert_with(Key::Component(head.clone()), Tree::null),
        Tree::List(elements) => {
            let Component::Index(position) = head else {
                return Err(Error::type_error(format!(
                    "list element position must be an Index, found {} {head}",
                    head.kind()
                )));
            };
            let position = padded_position(*position, elements.len())?;
            if elements.len() <= position {
                let len = position
                    .checked_add(1)
                    .ok_or_else(|| Error::value(format!("list position {position} out of range")))?;
                elements.resize(len, Tree::null());
            }
            &mut elements[position]
        }
        Tree::Leaf(_) | Tree::Path(_) => {
            return Err(Error::type_error(format!(
                "cannot insert {head} below a terminal value"
            )))
        }
    };
    if let Some(next) = rest.first() {
        if child.is_null() {
            *child = container_for(next);
        }
    }
    insert_path(child, rest)
}

/// Collapses tips: `{k: {}}` becomes `k` and `{(k,): null}` becomes `k`.
pub fn compact_tips(tree: &Tree) -> Tree {
    match tree {
        Tree::Map(map) => {
            if map.len() == 1 {
                if let Some((key, value)) = map.iter().next() {
                    if value.is_empty_map() {
                        return match key {
                            Key::Component(c) => Tree::Leaf(c.clone()),
                            Key::Path(p) => Tree::Path(p.clone()),
                        };
                    }
                    if let Key::Path(p) = key {
                        if p.len() == 1 && value.is_null() {
                            return Tree::Leaf(p[0].clone());
                        }
                    }
                }
            }
            Tree::Map(map.iter().map(|(k, v)| (k.clone(), compact_tips(v))).collect())
        }
        Tree::List(elements) => Tree::List(elements.iter().map(compact_tips).collect()),
        other => other.clone(),
    }
}

/// Expands tips: a bare value `v` becomes `{v: null}` and `(k,) -> null`
/// becomes `k -> null`.
pub fn uncompact_tips(tree: &Tree) -> Tree {
    match tree {
        Tree::Map(map) => Tree::Map(
            map.iter()
                .map(|(key, value)| match (key, value) {
                    (Key::Path(p), v) if v.is_null() => (tip_key(p), Tree::null()),
                    (Key::Component(_), Tree::Leaf(c)) if !c.is_null() => (
                        key.clone(),
                        Tree::map([(Key::Component(c.clone()), Tree::null())]),
                    ),
                    _ => (key.clone(), uncompact_tips(value)),
                })
                .collect(),
        ),
        Tree::List(elements) => Tree::List(elements.iter().map(uncompact_tips).collect()),
        Tree::Leaf(Component::Null) => Tree::null(),
        Tree::Leaf(c) => Tree::map([(Key::Component(c.clone()), Tree::null())]),
        Tree::Path(p) => Tree::map([(tip_key(p), Tree::null())]),
    }
}

// A one-component tuple tip is written as the bare component.
fn tip_key(path: &[Component]) -> Key {
    match path {
        [single] => Key::Component(single.clone()),
        _ => Key::Path(path.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{att, ec, int, key, leaf, map, null, path, s};

    fn options(flatten_lists: bool, tips: TipMode) -> FlattenOptions {
        FlattenOptions { flatten_lists, tips }
    }

    #[test]
    fn plain_keys_fold_into_one_tuple() {
        let tree = map(vec![(key(s("a")), map(vec![(key(s("b")), leaf(int(1)))]))]);
        let flat = flatten_to_tuples(&tree, options(true, TipMode::Uncompact)).unwrap();
        assert_eq!(flat, map(vec![(path(&[s("a"), s("b"), int(1)]), null())]));

        let with_null = map(vec![(key(s("a")), map(vec![(key(s("b")), null())]))]);
        assert_eq!(
            flatten(&with_null),
            map(vec![(path(&[s("a"), s("b")]), null())])
        );
    }

    #[test]
    fn tag_keys_start_a_new_level() {
        let e = ec("E");
        let tree = map(vec![(
            key(s("a")),
            map(vec![(key(e.clone()), map(vec![(key(s("b")), null())]))]),
        )]);
        let expected = map(vec![(
            path(&[s("a")]),
            map(vec![(key(e.clone()), map(vec![(path(&[s("b")]), null())]))]),
        )]);
        assert_eq!(flatten(&tree), expected);
        assert_eq!(
            flatten_to_tuples(&tree, options(true, TipMode::Keep)).unwrap(),
            expected
        );

        let deeper = map(vec![(
            key(s("a")),
            map(vec![(
                key(e.clone()),
                map(vec![(key(s("b")), map(vec![(key(s("c")), null())]))]),
            )]),
        )]);
        assert_eq!(
            flatten(&deeper),
            map(vec![(
                path(&[s("a")]),
                map(vec![(key(e.clone()), map(vec![(path(&[s("b"), s("c")]), null())]))]),
            )])
        );
    }

    #[test]
    fn tuples_resume_after_tag_levels() {
        let e = ec("E");
        let tree = map(vec![(
            key(s("a")),
            map(vec![(
                key(s("b")),
                map(vec![(
                    key(e.clone()),
                    map(vec![(key(s("c")), null()), (key(s("d")), null())]),
                )]),
            )]),
        )]);
        assert_eq!(
            flatten(&tree),
            map(vec![(
                path(&[s("a"), s("b")]),
                map(vec![(
                    key(e),
                    map(vec![(path(&[s("c")]), null()), (path(&[s("d")]), null())]),
                )]),
            )])
        );
    }

    #[test]
    fn tag_under_tag_uses_the_empty_tuple() {
        let tree = map(vec![(
            key(ec("E")),
            map(vec![
                (key(att("x")), leaf(int(1))),
                (key(att("y")), leaf(int(2))),
                (key(s("z")), null()),
            ]),
        )]);
        assert_eq!(
            flatten(&tree),
            map(vec![(
                key(ec("E")),
                map(vec![
                    (
                        path(&[]),
                        map(vec![
                            (key(att("x")), map(vec![(path(&[int(1)]), null())])),
                            (key(att("y")), map(vec![(path(&[int(2)]), null())])),
                        ]),
                    ),
                    (path(&[s("z")]), null()),
                ]),
            )])
        );
    }

    #[test]
    fn several_tag_children_under_a_plain_key_are_kept() {
        let tree = map(vec![(
            key(s("a")),
            map(vec![(key(att("x")), null()), (key(att("y")), null())]),
        )]);
        assert_eq!(
            flatten(&tree),
            map(vec![(
                path(&[s("a")]),
                map(vec![(key(att("x")), null()), (key(att("y")), null())]),
            )])
        );
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(flatten(&map(vec![])), null());
        assert_eq!(flatten(&Tree::List(vec![])), null());
        assert_eq!(flatten(&leaf(int(0))), map(vec![(path(&[int(0)]), null())]));
        assert_eq!(
            flatten(&map(vec![(key(Component::Null), leaf(int(1)))])),
            map(vec![])
        );
        assert_eq!(
            flatten(&map(vec![(key(s("a")), map(vec![]))])),
            map(vec![(path(&[s("a")]), null())])
        );
    }

    #[test]
    fn lists_are_preserved_or_marked() {
        let tree = map(vec![(
            key(s("a")),
            Tree::List(vec![leaf(int(1)), leaf(int(2))]),
        )]);
        assert_eq!(
            flatten_to_tuples(&tree, options(false, TipMode::Keep)).unwrap(),
            map(vec![(
                path(&[s("a")]),
                Tree::List(vec![
                    map(vec![(path(&[int(1)]), null())]),
                    map(vec![(path(&[int(2)]), null())]),
                ]),
            )])
        );
        assert_eq!(
            flatten_to_tuples(&tree, options(true, TipMode::Keep)).unwrap(),
            map(vec![
                (path(&[s("a"), Component::Index(0), int(1)]), null()),
                (path(&[s("a"), Component::Index(1), int(2)]), null()),
            ])
        );
    }

    #[test]
    fn markers_round_trip_through_lists() {
        let tree = map(vec![(
            key(s("xs")),
            Tree::List(vec![leaf(s("p")), Tree::List(vec![leaf(int(3))])]),
        )]);
        let marked = lists_to_markers(&tree);
        assert_eq!(
            marked,
            map(vec![(
                key(s("xs")),
                map(vec![
                    (key(Component::Index(0)), leaf(s("p"))),
                    (key(Component::Index(1)), map(vec![(key(Component::Index(0)), leaf(int(3)))])),
                ]),
            )])
        );
        assert_eq!(markers_to_lists(&marked, true, false).unwrap(), tree);
    }

    #[test]
    fn sparse_markers_fill_or_collapse() {
        let sparse = map(vec![
            (key(Component::Index(2)), leaf(s("c"))),
            (key(Component::Index(0)), leaf(s("a"))),
        ]);
        assert_eq!(
            markers_to_lists(&sparse, true, false).unwrap(),
            Tree::List(vec![leaf(s("a")), null(), leaf(s("c"))])
        );
        assert_eq!(
            markers_to_lists(&sparse, true, true).unwrap(),
            Tree::List(vec![leaf(s("a")), leaf(s("c"))])
        );
    }

    #[test]
    fn mixed_markers_fail_only_when_strict() {
        let mixed = map(vec![
            (key(Component::Index(0)), leaf(s("a"))),
            (key(s("name")), map(vec![(key(Component::Index(0)), leaf(int(1)))])),
        ]);
        assert!(matches!(
            markers_to_lists(&mixed, true, false),
            Err(Error::Type(_))
        ));
        assert_eq!(
            markers_to_lists(&mixed, false, false).unwrap(),
            map(vec![
                (key(Component::Index(0)), leaf(s("a"))),
                (key(s("name")), Tree::List(vec![leaf(int(1))])),
            ])
        );
    }

    #[test]
    fn compact_collapses_single_tips() {
        let e = ec("E");
        let flat = map(vec![(
            path(&[s("a")]),
            map(vec![(key(e.clone()), map(vec![(path(&[s("b")]), null())]))]),
        )]);
        let compact = compact_tips(&flat);
        assert_eq!(
            compact,
            map(vec![(path(&[s("a")]), map(vec![(key(e), leaf(s("b")))]))])
        );
        assert_eq!(compact_tips(&compact), compact);

        assert_eq!(compact_tips(&map(vec![(key(s("k")), map(vec![]))])), leaf(s("k")));
        assert_eq!(
            compact_tips(&map(vec![(path(&[s("k"), int(1)]), map(vec![]))])),
            Tree::Path(vec![s("k"), int(1)])
        );
    }

    #[test]
    fn uncompact_expands_bare_values() {
        let compact = map(vec![(key(s("a")), leaf(int(1))), (path(&[s("b")]), null())]);
        let expanded = uncompact_tips(&compact);
        assert_eq!(
            expanded,
            map(vec![
                (key(s("a")), map(vec![(key(int(1)), null())])),
                (key(s("b")), null()),
            ])
        );
        assert_eq!(uncompact_tips(&expanded), expanded);
        assert_eq!(uncompact_tips(&leaf(s("x"))), map(vec![(key(s("x")), null())]));
        assert_eq!(uncompact_tips(&null()), null());
        assert_eq!(
            uncompact_tips(&map(vec![(path(&[s("a"), s("b")]), null())])),
            map(vec![(path(&[s("a"), s("b")]), null())])
        );
    }

    #[test]
    fn uncompact_is_idempotent_on_compacted_shapes() {
        let e = ec("E");
        let shapes = vec![
            map(vec![(path(&[s("k")]), map(vec![]))]),
            map(vec![(key(s("a")), map(vec![(path(&[s("k")]), map(vec![]))]))]),
            map(vec![
                (path(&[s("a"), int(1)]), null()),
                (key(e), map(vec![(path(&[s("b")]), null())])),
            ]),
            map(vec![(
                key(s("x")),
                Tree::List(vec![leaf(int(1)), map(vec![(path(&[s("y")]), null())])]),
            )]),
            leaf(s("v")),
        ];
        for shape in shapes {
            let compact = compact_tips(&shape);
            assert_eq!(compact_tips(&compact), compact);
            let once = uncompact_tips(&compact);
            assert_eq!(uncompact_tips(&once), once, "{compact:?}");
        }
        assert_eq!(
            uncompact_tips(&Tree::Path(vec![s("k")])),
            map(vec![(key(s("k")), null())])
        );
        assert_eq!(
            uncompact_tips(&map(vec![(key(s("a")), Tree::Path(vec![s("k")]))])),
            map(vec![(key(s("a")), map(vec![(key(s("k")), null())]))])
        );
    }

    #[test]
    fn far_list_positions_are_rejected() {
        let overflow = map(vec![(path(&[s("a"), Component::Index(u64::MAX)]), null())]);
        assert!(matches!(unflatten(&overflow), Err(Error::Value(_))));
        let far = map(vec![(
            path(&[s("a"), Component::Index(1_000_000_000_000)]),
            null(),
        )]);
        assert!(matches!(unflatten(&far), Err(Error::Value(_))));

        let edge = map(vec![(
            path(&[s("a"), Component::Index(MAX_LIST_PADDING as u64)]),
            null(),
        )]);
        let padded = unflatten(&edge).unwrap();
        let list = padded
            .as_map()
            .and_then(|m| m.get(&key(s("a"))))
            .and_then(Tree::as_list)
            .unwrap();
        assert_eq!(list.len(), MAX_LIST_PADDING + 1);
        assert!(list.iter().all(Tree::is_null));

        let sparse = map(vec![(key(Component::Index(1_000_000_000_000)), leaf(s("x")))]);
        assert!(matches!(
            markers_to_lists(&sparse, false, false),
            Err(Error::Value(_))
        ));
        assert_eq!(
            markers_to_lists(&sparse, false, true).unwrap(),
            Tree::List(vec![leaf(s("x"))])
        );
    }

    #[test]
    fn unflatten_inverts_flatten_for_null_tipped_trees() {
        let e = ec("E");
        let tree = map(vec![
            (
                key(s("a")),
                map(vec![(key(e.clone()), map(vec![(key(s("b")), null())]))]),
            ),
            (
                key(s("c")),
                map(vec![(key(int(1)), null()), (key(int(2)), null())]),
            ),
            (
                key(s("xs")),
                Tree::List(vec![map(vec![(key(s("p")), null())]), null()]),
            ),
        ]);
        let flat = flatten(&tree);
        assert_eq!(unflatten(&flat).unwrap(), tree);
    }

    #[test]
    fn unflatten_merges_adjacent_tuples() {
        let split = map(vec![(path(&[s("a")]), map(vec![(path(&[s("b")]), null())]))]);
        let joined = map(vec![(path(&[s("a"), s("b")]), null())]);
        assert_eq!(unflatten(&split).unwrap(), unflatten(&joined).unwrap());
        assert_eq!(flatten(&unflatten(&split).unwrap()), joined);
        assert_ne!(flatten(&unflatten(&split).unwrap()), split);
    }

    #[test]
    fn unflatten_expands_scalar_tips_and_paths() {
        assert_eq!(
            unflatten(&Tree::Path(vec![s("a"), int(0)])).unwrap(),
            map(vec![(key(s("a")), map(vec![(key(int(0)), null())]))])
        );
        assert_eq!(
            unflatten(&map(vec![(path(&[s("a")]), leaf(int(5)))])).unwrap(),
            map(vec![(key(s("a")), map(vec![(key(int(5)), null())]))])
        );
    }

    #[test]
    fn unflatten_builds_lists_from_leading_indexes() {
        let flat = map(vec![
            (path(&[s("a"), Component::Index(0), s("x")]), null()),
            (path(&[s("a"), Component::Index(1), s("y")]), null()),
            (path(&[s("b"), s("k")]), null()),
            (path(&[s("b"), Component::Index(0)]), null()),
        ]);
        assert_eq!(
            unflatten(&flat).unwrap(),
            map(vec![
                (
                    key(s("a")),
                    Tree::List(vec![
                        map(vec![(key(s("x")), null())]),
                        map(vec![(key(s("y")), null())]),
                    ]),
                ),
                (
                    key(s("b")),
                    map(vec![(key(s("k")), null()), (key(Component::Index(0)), null())]),
                ),
            ])
        );

        let bad = map(vec![
            (path(&[s("a"), Component::Index(0)]), null()),
            (path(&[s("a"), s("x")]), null()),
        ]);
        assert!(matches!(unflatten(&bad), Err(Error::Type(_))));
    }
}
