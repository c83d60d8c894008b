// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Argument validation for public entry points.
//!
//! These predicates never panic and accept any value.

use crate::instance::{ContainerId, InstanceStore};
use crate::value::Value;

/// Returns `true` for `Null`, any string, or a tagged element.
#[must_use]
pub fn is_element(value: &Value) -> bool {
    matches!(value, Value::Null | Value::String(_) | Value::Element(_))
}

/// Returns `true` for an element, or a list whose members (recursively) all
/// satisfy this predicate.
#[must_use]
pub fn is_element_or_elements(value: &Value) -> bool {
    match value {
        Value::List(items) => items.iter().all(is_element_or_elements),
        other => is_element(other),
    }
}

/// Returns `true` if `container` names a container record of `store`.
#[must_use]
pub fn is_container(store: &InstanceStore, container: ContainerId) -> bool {
    store.is_container(container)
}
