// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

use idb_rest::testing::MemoryItemSource;
use idb_rest::{
    encode_json, flatten_to_tuples, parse_items, render_extended, unflatten, Cursor, CursorConfig,
    FlattenOptions, Item, Key, Tree,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let text = std::env::var("IDB_ITEMS")
        .unwrap_or_else(|_| "Person \"ann\" age 41\nPerson \"bob\" age 37\n".to_string());
    let items = parse_items(&text)?;

    let tuples = Tree::map(
        items
            .iter()
            .map(|item| (Key::path(item.as_slice().iter().cloned()), Tree::null())),
    );
    let nested = unflatten(&tuples)?;
    println!("json: {}", String::from_utf8(encode_json(&nested)?)?);
    println!("extended:{}", render_extended(&nested, true)?);
    let flat = flatten_to_tuples(&nested, FlattenOptions::default())?;
    println!("flattened: {}", render_extended(&flat, false)?);

    let source = MemoryItemSource::new().with_database("demo/readonly", items);
    let config = CursorConfig::default().with_database("demo/readonly");
    let mut cursor = Cursor::new(source, config)?;
    let mut current = Item::default();
    while let Some(next) = cursor.next_item(&current)? {
        println!("item: {next}");
        current = next;
    }
    println!("fetches: {:?}", cursor.source().calls());
    Ok(())
}
