// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Committed fibers and flattened child descriptions.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::value::{ElementNode, Props, Value};

/// Identifies a child among its siblings across renders.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Key {
    /// Unkeyed child, matched by slot position. Skipped slots (`Null`,
    /// booleans) still count, so a conditional child does not shift the
    /// siblings after it.
    Slot(usize),
    /// Explicitly keyed child.
    Explicit(String),
}

/// The last committed description of one host instance.
#[derive(Clone, Debug)]
pub(crate) enum Fiber<I> {
    Host {
        key: Key,
        ty: String,
        props: Props,
        instance: I,
        children: Vec<Self>,
        /// The host renders the children as its own text content.
        text_content: bool,
    },
    Text {
        key: Key,
        text: String,
        instance: I,
    },
}

impl<I: Copy> Fiber<I> {
    pub(crate) fn instance(&self) -> I {
        match self {
            Self::Host { instance, .. } | Self::Text { instance, .. } => *instance,
        }
    }

    pub(crate) fn key(&self) -> &Key {
        match self {
            Self::Host { key, .. } | Self::Text { key, .. } => key,
        }
    }
}

/// A renderable child extracted from a children value.
#[derive(Debug)]
pub(crate) enum Child<'a> {
    Element { key: Key, node: &'a ElementNode },
    Text { key: Key, text: String },
}

impl Child<'_> {
    pub(crate) fn key(&self) -> &Key {
        match self {
            Self::Element { key, .. } | Self::Text { key, .. } => key,
        }
    }
}

/// Flattens nested lists into renderable children.
///
/// Strings and numbers become text, elements stay elements, and `Null`,
/// booleans and maps render nothing.
pub(crate) fn flatten(children: &Value) -> Vec<Child<'_>> {
    let mut out = Vec::new();
    let mut slot = 0;
    flatten_into(children, &mut slot, &mut out);
    out
}

fn flatten_into<'a>(value: &'a Value, slot: &mut usize, out: &mut Vec<Child<'a>>) {
    let key = Key::Slot(*slot);
    let text = match value {
        Value::List(items) => {
            for item in items {
                flatten_into(item, slot, out);
            }
            return;
        }
        Value::Element(node) => {
            *slot += 1;
            let key = node.key.clone().map_or(key, Key::Explicit);
            out.push(Child::Element { key, node });
            return;
        }
        Value::Null | Value::Bool(_) | Value::Map(_) => {
            *slot += 1;
            return;
        }
        Value::String(s) => s.clone(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => format!("{n}"),
    };
    *slot += 1;
    out.push(Child::Text { key, text });
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::value::props;

    #[test]
    fn flatten_nested_lists() {
        let value = Value::List(vec![
            Value::text("a"),
            Value::List(vec![Value::Int(1), Value::List(vec![Value::text("b")])]),
        ]);
        let texts: Vec<_> = flatten(&value)
            .into_iter()
            .map(|child| match child {
                Child::Text { text, .. } => text,
                Child::Element { .. } => panic!("unexpected element"),
            })
            .collect();
        assert_eq!(texts, ["a", "1", "b"]);
    }

    #[test]
    fn skipped_slots_keep_positions() {
        let value = Value::List(vec![Value::Bool(false), Value::Null, Value::text("x")]);
        let children = flatten(&value);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].key(), &Key::Slot(2));
    }

    #[test]
    fn explicit_keys_win() {
        let value = Value::List(vec![
            Value::keyed("item", "k", props([]), []),
            Value::element("item", props([]), []),
        ]);
        let children = flatten(&value);
        assert_eq!(children[0].key(), &Key::Explicit("k".into()));
        assert_eq!(children[1].key(), &Key::Slot(1));
    }

    #[test]
    fn single_value_is_one_child() {
        assert_eq!(flatten(&Value::Float(1.5)).len(), 1);
        assert!(flatten(&Value::Null).is_empty());
    }
}
