// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion of live instances back into declarative values.
//!
//! Rendering the output of [`container_to_elements`] into a fresh container
//! reproduces an equivalent tree: same types, same properties (children
//! excluded), same text, same shape. Keys are not preserved.

use alloc::vec::Vec;

pub use crate::value::to_children;

use crate::instance::{ContainerId, Instance, InstanceId, InstanceStore};
use crate::value::Value;

/// Converts one instance and its subtree into a value.
///
/// Composite instances become elements carrying their stored properties and
/// converted children, text instances become strings, and stale handles become
/// [`Value::Null`].
#[must_use]
pub fn instance_to_element(store: &InstanceStore, id: InstanceId) -> Value {
    match store.try_get(id) {
        None => Value::Null,
        Some(Instance::Text(node)) => Value::text(node.text()),
        Some(Instance::Composite(node)) => Value::element(
            node.ty(),
            node.props().clone(),
            node.children()
                .iter()
                .map(|&child| instance_to_element(store, child)),
        ),
    }
}

/// Converts the top-level sequence of `container`, in order.
///
/// # Panics
///
/// Panics if `container` was not allocated by `store`.
#[must_use]
pub fn container_to_elements(store: &InstanceStore, container: ContainerId) -> Vec<Value> {
    store
        .container(container)
        .children()
        .iter()
        .map(|&child| instance_to_element(store, child))
        .collect()
}
