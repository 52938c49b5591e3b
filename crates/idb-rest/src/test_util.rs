// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;

use crate::component::Component;
use crate::tree::{Key, Tree, TreeMap};

#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[allow(dead_code)]
    pub name: String,
    /// Underscore-quoted wire JSON.
    pub json: serde_json::Value,
    /// Compact extended-text rendering of the same tree.
    pub extended: String,
    #[allow(dead_code)]
    pub notes: Option<String>,
}

pub fn load_fixture(name: &str) -> Fixture {
    let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");
    let path = dir.join(format!("{name}.json"));
    let data = std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {name}: {err}"));
    serde_json::from_str(&data)
        .unwrap_or_else(|err| panic!("failed to parse fixture {name}: {err}"))
}

pub fn s(text: &str) -> Component {
    Component::from(text)
}

pub fn int(value: i64) -> Component {
    Component::Integer(value)
}

pub fn ec(name: &str) -> Component {
    Component::entity_class(name).unwrap_or_else(|err| panic!("bad class {name}: {err}"))
}

pub fn att(name: &str) -> Component {
    Component::attribute(name).unwrap_or_else(|err| panic!("bad attribute {name}: {err}"))
}

pub fn leaf(component: Component) -> Tree {
    Tree::Leaf(component)
}

pub fn null() -> Tree {
    Tree::null()
}

pub fn key(component: Component) -> Key {
    Key::Component(component)
}

pub fn path(components: &[Component]) -> Key {
    Key::Path(components.to_vec())
}

pub fn map(entries: Vec<(Key, Tree)>) -> Tree {
    Tree::Map(entries.into_iter().collect::<TreeMap>())
}

/// One key and value of every component variant, in fixture order.
pub fn mixed_key_tree() -> Tree {
    let bytes = Component::bytes(vec![0x5A, 0x26]).unwrap();
    let chars = Component::chars("ccc").unwrap();
    let date = Component::Date(
        chrono::DateTime::parse_from_rfc3339("2019-01-01T00:00:00Z").unwrap(),
    );
    map(vec![
        (key(s("a")), leaf(int(1))),
        (key(s("_c")), leaf(s("_d"))),
        (key(Component::Double(6.0)), leaf(Component::Double(6.0))),
        (key(Component::Float(7.0)), leaf(Component::Float(7.0))),
        (key(int(5)), leaf(Component::Boolean(true))),
        (key(Component::Null), null()),
        (key(Component::Boolean(true)), leaf(Component::Boolean(false))),
        (key(ec("EC")), leaf(att("att"))),
        (key(bytes.clone()), leaf(bytes)),
        (key(Component::Index(3)), leaf(Component::Index(3))),
        (key(chars.clone()), leaf(chars)),
        (key(date.clone()), leaf(date)),
        (
            key(s("list")),
            Tree::List(vec![leaf(Component::Float(6.0)), leaf(s("x")), leaf(int(2))]),
        ),
    ])
}
