// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree snapshots for inspection and golden tests.
//!
//! Both helpers take the serialized form of a container (see
//! [`Renderer::container_to_elements`](hollow_core::renderer::Renderer::container_to_elements)):
//!
//! - [`to_json`] maps a value onto `serde_json`. Elements become objects with
//!   `"type"`, optional `"key"`, `"props"` (without children) and
//!   `"children"`.
//! - [`write_outline`] writes an indented, markup-like outline.

use std::io::{self, Write};

use serde_json::{Map, Number, json};

use hollow_core::value::{CHILDREN, ElementNode, Value, to_children};

/// Converts a value into JSON.
///
/// Non-finite floats become `null`.
#[must_use]
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(n) => json!(n),
        Value::Float(n) => Number::from_f64(*n).map_or(serde_json::Value::Null, Into::into),
        Value::String(s) => json!(s),
        Value::List(items) => items.iter().map(to_json).collect(),
        Value::Map(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), to_json(v)))
            .collect::<Map<_, _>>()
            .into(),
        Value::Element(node) => element_json(node),
    }
}

fn element_json(node: &ElementNode) -> serde_json::Value {
    let props: Map<_, _> = node
        .props
        .iter()
        .filter(|(k, _)| k.as_str() != CHILDREN)
        .map(|(k, v)| (k.clone(), to_json(v)))
        .collect();
    let children: Vec<_> = to_children(node.children()).iter().map(to_json).collect();
    let mut obj = json!({
        "type": node.ty,
        "props": props,
        "children": children,
    });
    if let Some(key) = &node.key {
        obj["key"] = json!(key);
    }
    obj
}

/// Writes an indented outline of `values`, one node per line.
///
/// Text renders quoted, elements render as `<type prop=value …>` with their
/// children indented below, and childless elements render self-closed.
pub fn write_outline(values: &[Value], writer: &mut dyn Write) -> io::Result<()> {
    for value in values {
        write_node(value, 0, writer)?;
    }
    Ok(())
}

fn write_node(value: &Value, depth: usize, writer: &mut dyn Write) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    match value {
        Value::Element(node) => {
            write!(writer, "{indent}<{}", node.ty)?;
            for (key, prop) in node.props.iter().filter(|(k, _)| k.as_str() != CHILDREN) {
                write!(writer, " {key}={}", to_json(prop))?;
            }
            let children = to_children(node.children());
            if children.is_empty() {
                writeln!(writer, "/>")?;
            } else {
                writeln!(writer, ">")?;
                for child in children {
                    write_node(child, depth + 1, writer)?;
                }
            }
        }
        Value::List(items) => {
            for item in items {
                write_node(item, depth, writer)?;
            }
        }
        Value::Null => {}
        other => writeln!(writer, "{indent}{}", to_json(other))?,
    }
    Ok(())
}
