// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change tracking between commits.
//!
//! [`CommitChanges`] uses raw slot indices (`u32`) rather than [`InstanceId`]
//! handles: an index in `removed` names a slot whose previous occupant is gone,
//! and the slot may already have been reused by an entry in `added`.
//!
//! [`InstanceId`]: super::InstanceId

use alloc::vec::Vec;

use super::id::ContainerId;

/// The set of changes produced by a single
/// [`InstanceStore::take_changes`](super::InstanceStore::take_changes) call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitChanges {
    /// Instances created since the last call.
    pub added: Vec<u32>,
    /// Instances destroyed since the last call.
    pub removed: Vec<u32>,
    /// Composite instances whose properties were replaced.
    pub props: Vec<u32>,
    /// Text instances whose content was replaced.
    pub text: Vec<u32>,
    /// Composite instances whose child sequence changed.
    pub children: Vec<u32>,
    /// Containers whose top-level sequence changed.
    pub containers: Vec<ContainerId>,
}

impl CommitChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
        self.props.clear();
        self.text.clear();
        self.children.clear();
        self.containers.clear();
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.props.is_empty()
            && self.text.is_empty()
            && self.children.is_empty()
            && self.containers.is_empty()
    }
}
