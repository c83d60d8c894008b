// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative values and elements.
//!
//! A [`Value`] is the dynamic data callers hand to a
//! [`Renderer`](crate::renderer::Renderer). Only a subset of values are
//! *elements* (see [`validate`](crate::validate)):
//!
//! - [`Value::Null`] — renders nothing.
//! - [`Value::String`] — a leaf text node.
//! - [`Value::Element`] — a tagged composite carrying a type, an optional key,
//!   and a property mapping.
//!
//! Children travel inside the property mapping under the [`CHILDREN`] key, the
//! way an element factory places them: no child leaves the key absent, one
//! child is stored as-is, and several children are stored as a
//! [`Value::List`]. Lists may nest arbitrarily; they are flattened when the
//! tree is traversed.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Property key reserved for structural children.
pub const CHILDREN: &str = "children";

/// A property mapping.
pub type Props = BTreeMap<String, Value>;

/// A dynamic, immutable declarative value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absent value. Renders nothing.
    #[default]
    Null,
    /// A boolean. Renders nothing when used as a child.
    Bool(bool),
    /// An integer. Renders as text when used as a child.
    Int(i64),
    /// A float. Renders as text when used as a child.
    Float(f64),
    /// A string. Renders as a text node.
    String(String),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// A nested property mapping.
    Map(Props),
    /// A tagged composite element.
    Element(ElementNode),
}

/// The payload of [`Value::Element`].
#[derive(Clone, Debug, PartialEq)]
pub struct ElementNode {
    /// Type identifier (e.g. `"box"`).
    pub ty: String,
    /// Reconciliation key. Siblings with equal keys are matched across renders.
    pub key: Option<String>,
    /// Properties, including [`CHILDREN`] when the element has children.
    pub props: Props,
}

impl ElementNode {
    /// Creates an element with the given type and properties and no key.
    #[must_use]
    pub fn new(ty: impl Into<String>, props: Props) -> Self {
        Self {
            ty: ty.into(),
            key: None,
            props,
        }
    }

    /// Sets the reconciliation key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Stores `children` under [`CHILDREN`].
    ///
    /// An empty iterator leaves the properties untouched, a single child is
    /// stored directly, and several children are stored as a list.
    #[must_use]
    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut children: Vec<Value> = children.into_iter().collect();
        match children.len() {
            0 => {}
            1 => {
                let only = children.pop().unwrap_or_default();
                self.props.insert(CHILDREN.to_string(), only);
            }
            _ => {
                self.props
                    .insert(CHILDREN.to_string(), Value::List(children));
            }
        }
        self
    }

    /// Returns the children stored under [`CHILDREN`], or [`Value::Null`].
    #[must_use]
    pub fn children(&self) -> &Value {
        self.props.get(CHILDREN).unwrap_or(&Value::Null)
    }
}

impl Value {
    /// Builds an element value, like an element factory call
    /// `element(ty, props, ...children)`.
    #[must_use]
    pub fn element<I>(ty: impl Into<String>, props: Props, children: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::Element(ElementNode::new(ty, props).with_children(children))
    }

    /// Builds a keyed element value.
    #[must_use]
    pub fn keyed<I>(ty: impl Into<String>, key: impl Into<String>, props: Props, children: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::Element(
            ElementNode::new(ty, props)
                .with_key(key)
                .with_children(children),
        )
    }

    /// Builds a text value.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the element payload, if any.
    #[must_use]
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Self::Element(node) => Some(node),
            _ => None,
        }
    }
}

/// Builds a [`Props`] mapping from key/value pairs.
#[must_use]
pub fn props<const N: usize>(pairs: [(&str, Value); N]) -> Props {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Returns a copy of `props` without the [`CHILDREN`] entry.
#[must_use]
pub fn props_without_children(props: &Props) -> Props {
    props
        .iter()
        .filter(|(key, _)| key.as_str() != CHILDREN)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Normalizes a children value into a sequence.
///
/// `Null` becomes empty, a list is forwarded as-is, and any other value
/// becomes a one-element sequence.
#[must_use]
pub fn to_children(value: &Value) -> &[Value] {
    match value {
        Value::Null => &[],
        Value::List(items) => items,
        other => core::slice::from_ref(other),
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<Props> for Value {
    fn from(map: Props) -> Self {
        Self::Map(map)
    }
}

impl From<ElementNode> for Value {
    fn from(node: ElementNode) -> Self {
        Self::Element(node)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
