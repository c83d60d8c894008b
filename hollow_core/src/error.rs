// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Two families of failure exist:
//!
//! - [`RenderError`] — a caller handed a malformed container or children value
//!   to a public entry point. Reported before anything is mutated.
//! - [`HostError`] — the reconciler asked for a structural mutation that
//!   names a child not present in the parent. This breaks the contract between
//!   engine and host; it is reported immediately and never retried.

use core::fmt;

use crate::instance::{ContainerId, InstanceId, ParentId};

/// Structural invariant violations raised by tree mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostError {
    /// The referenced child is not in the parent's child sequence.
    ChildNotFound {
        /// The parent whose sequence was searched.
        parent: ParentId,
        /// The child that was expected to be present.
        child: InstanceId,
    },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChildNotFound { parent, child } => {
                write!(f, "child {child:?} does not exist in {parent:?}")
            }
        }
    }
}

impl core::error::Error for HostError {}

/// Errors returned by the [`Renderer`](crate::renderer::Renderer) entry points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// The container argument does not name a container of this renderer.
    InvalidContainer(ContainerId),
    /// The children argument is not an element or a (nested) list of elements.
    InvalidChildren,
    /// The reconciler violated a structural invariant while committing.
    Host(HostError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidContainer(id) => write!(f, "invalid container argument: {id:?}"),
            Self::InvalidChildren => {
                f.write_str("invalid children argument: expected element or elements")
            }
            Self::Host(err) => write!(f, "host operation failed: {err}"),
        }
    }
}

impl core::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Host(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for RenderError {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}
