// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! The extended text format: JSON syntax with bare component tokens.
//!
//! Strings keep their JSON quotes, every other component is written as its
//! canonical token, and keys may be any component:
//!
//! ```text
//! {"name":"x",EC:att,5:true,[3]:Bytes(5A_26),2019-01-01T00:00:00.000Z:7.0f}
//! ```
//!
//! The output is valid JSON only when the tree holds nothing but strings,
//! integers, doubles, booleans and nulls.

use std::fmt;

use crate::component::Component;
use crate::error::{Error, Result};
use crate::token::{parse_primitive, skip_component, skip_json_string};
use crate::tree::{Key, Tree, TreeMap};

const ENTRY_INDENT: &str = "   ";
const LEVEL_INDENT: &str = "    ";

/// Renders a tree in extended text, either compact or indented with CRLF
/// line breaks.
///
/// Fails on a non-finite `Double` or `Float`, which has no token.
pub fn render_extended(tree: &Tree, indented: bool) -> Result<String> {
    let mut out = String::new();
    write_tree(&mut out, tree, indented, 0)?;
    Ok(out)
}

fn write_tree(out: &mut String, tree: &Tree, indented: bool, depth: usize) -> Result<()> {
    match tree {
        Tree::Leaf(component) => out.push_str(&component.to_token()?),
        Tree::Path(path) => {
            let elements: Vec<Tree> = path.iter().cloned().map(Tree::Leaf).collect();
            write_list(out, &elements, indented, depth)?;
        }
        Tree::List(elements) => write_list(out, elements, indented, depth)?,
        Tree::Map(map) => {
            out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                entry_break(out, indented, depth);
                write_key(out, key, indented, depth + 1)?;
                out.push(':');
                if indented {
                    out.push(' ');
                }
                write_tree(out, value, indented, depth + 1)?;
            }
            closer_break(out, indented, depth, map.is_empty());
            out.push('}');
        }
    }
    Ok(())
}

fn write_key(out: &mut String, key: &Key, indented: bool, depth: usize) -> Result<()> {
    match key {
        Key::Component(component) => {
            out.push_str(&component.to_token()?);
            Ok(())
        }
        Key::Path(path) => write_tree(out, &Tree::Path(path.clone()), indented, depth),
    }
}

fn write_list(out: &mut String, elements: &[Tree], indented: bool, depth: usize) -> Result<()> {
    out.push('[');
    // `[3]` alone would read back as an Index token.
    if !indented && matches!(elements, [Tree::Leaf(Component::Integer(n))] if *n >= 0) {
        out.push(' ');
    }
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        entry_break(out, indented, depth);
        write_tree(out, element, indented, depth + 1)?;
    }
    closer_break(out, indented, depth, elements.is_empty());
    out.push(']');
    Ok(())
}

fn entry_break(out: &mut String, indented: bool, depth: usize) {
    if indented {
        out.push_str("\r\n");
        out.push_str(ENTRY_INDENT);
        push_levels(out, depth);
    }
}

fn closer_break(out: &mut String, indented: bool, depth: usize, empty: bool) {
    if indented && !empty {
        out.push_str("\r\n");
        push_levels(out, depth);
    }
}

fn push_levels(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(LEVEL_INDENT);
    }
}

/// Parses extended text back into a tree.
pub fn parse_extended(text: &str) -> Result<Tree> {
    let mut parser = Parser {
        lexer: Lexer { text, pos: 0 },
        peeked: None,
    };
    let tree = parser.parse_value()?;
    if let Some(extra) = parser.next()? {
        return Err(Error::syntax(format!(
            "unexpected {extra} after end of value at offset {}",
            parser.lexer.pos
        )));
    }
    tracing::trace!(bytes = text.len(), "parsed extended text");
    Ok(tree)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Punct(char),
    Scalar(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Punct(c) => write!(f, "'{c}'"),
            Token::Scalar(s) => write!(f, "token '{s}'"),
        }
    }
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Option<Token<'a>>> {
        let text: &'a str = self.text;
        let bytes = text.as_bytes();
        while bytes.get(self.pos).is_some_and(|b| *b <= b' ') {
            self.pos += 1;
        }
        let start = self.pos;
        let rest = &text[start..];
        let Some(&first) = bytes.get(start) else {
            return Ok(None);
        };

        let end = if let Some(len) = date_len(rest) {
            start + len
        } else {
            match first {
                b'{' | b'}' | b']' | b',' | b':' => {
                    self.pos += 1;
                    return Ok(Some(Token::Punct(first as char)));
                }
                b'[' => match index_len(rest) {
                    Some(len) => start + len,
                    None => {
                        self.pos += 1;
                        return Ok(Some(Token::Punct('[')));
                    }
                },
                b'"' => skip_json_string(text, start)?,
                _ if rest.starts_with("Chars(") => {
                    skip_component(text, start)?.unwrap_or(text.len())
                }
                _ => {
                    start
                        + rest
                            .find(|c: char| c <= ' ' || "{}[],:".contains(c))
                            .unwrap_or(rest.len())
                }
            }
        };
        self.pos = end;
        Ok(Some(Token::Scalar(&text[start..end])))
    }
}

// YYYY-MM-DDTHH:MM:SS[.fff][Z|+hh:mm]
fn date_len(text: &str) -> Option<usize> {
    const SHAPE: &[u8] = b"dddd-dd-ddTdd:dd:dd";
    let bytes = text.as_bytes();
    if !matches_shape(bytes, SHAPE) {
        return None;
    }
    let mut end = SHAPE.len();
    if bytes.get(end) == Some(&b'.') {
        let digits = bytes[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        end += 1 + digits;
    }
    match bytes.get(end) {
        Some(b'Z') => end += 1,
        Some(b'+' | b'-') if matches_shape(&bytes[end + 1..], b"dd:dd") => end += 6,
        _ => {}
    }
    Some(end)
}

fn matches_shape(bytes: &[u8], shape: &[u8]) -> bool {
    bytes.len() >= shape.len()
        && shape.iter().zip(bytes).all(|(want, got)| match want {
            b'd' => got.is_ascii_digit(),
            other => got == other,
        })
}

// `[<digits>]` with nothing in between is an Index token, not a list.
fn index_len(text: &str) -> Option<usize> {
    let digits = text[1..].bytes().take_while(u8::is_ascii_digit).count();
    (digits > 0 && text.as_bytes().get(1 + digits) == Some(&b']')).then_some(digits + 2)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token<'a>>,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Result<Option<Token<'a>>> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.lexer.next_token(),
        }
    }

    fn peek(&mut self) -> Result<Option<Token<'a>>> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token()?;
        }
        Ok(self.peeked)
    }

    fn expect_any(&mut self) -> Result<Token<'a>> {
        self.next()?
            .ok_or_else(|| Error::syntax("unexpected end of extended text"))
    }

    fn parse_value(&mut self) -> Result<Tree> {
        match self.expect_any()? {
            Token::Punct('{') => self.parse_map(),
            Token::Punct('[') => self.parse_list(),
            Token::Scalar(token) => Ok(Tree::Leaf(parse_primitive(token)?)),
            other => Err(Error::syntax(format!("unexpected {other}, expected a value"))),
        }
    }

    fn parse_map(&mut self) -> Result<Tree> {
        let mut map = TreeMap::new();
        if self.peek()? == Some(Token::Punct('}')) {
            self.next()?;
            return Ok(Tree::Map(map));
        }
        loop {
            let key = match self.expect_any()? {
                Token::Scalar(token) => parse_primitive(token)?,
                other => {
                    return Err(Error::syntax(format!(
                        "unexpected {other}, map keys must be single components"
                    )))
                }
            };
            match self.expect_any()? {
                Token::Punct(':') => {}
                other => return Err(Error::syntax(format!("expected ':' after key, found {other}"))),
            }
            let value = self.parse_value()?;
            map.insert(Key::Component(key), value);
            match self.expect_any()? {
                Token::Punct(',') => continue,
                Token::Punct('}') => return Ok(Tree::Map(map)),
                other => return Err(Error::syntax(format!("expected ',' or '}}', found {other}"))),
            }
        }
    }

    fn parse_list(&mut self) -> Result<Tree> {
        let mut elements = Vec::new();
        if self.peek()? == Some(Token::Punct(']')) {
            self.next()?;
            return Ok(Tree::List(elements));
        }
        loop {
            elements.push(self.parse_value()?);
            match self.expect_any()? {
                Token::Punct(',') => continue,
                Token::Punct(']') => return Ok(Tree::List(elements)),
                other => return Err(Error::syntax(format!("expected ',' or ']', found {other}"))),
            }
        }
    }
}
