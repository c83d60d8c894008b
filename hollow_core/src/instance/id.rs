// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance and container identity types.

use core::fmt;

/// A handle to an instance in an [`InstanceStore`](super::InstanceStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after an instance is destroyed and the slot is reused. Two
/// handles name the same node iff they are equal; instance contents never take
/// part in identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId {
    /// Slot index into the store.
    pub(crate) idx: u32,
    /// Generation counter; must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl InstanceId {
    /// Rebuilds a handle from its raw parts, e.g. when decoding a recording.
    ///
    /// A handle built this way is only live if a store issued the same pair.
    #[inline]
    #[must_use]
    pub const fn from_raw(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({}@gen{})", self.idx, self.generation)
    }
}

/// A handle to a root container.
///
/// Containers live as long as the store that allocated them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId(pub(crate) u32);

impl ContainerId {
    /// Rebuilds a handle from its raw index, e.g. when decoding a recording.
    #[inline]
    #[must_use]
    pub const fn from_raw(idx: u32) -> Self {
        Self(idx)
    }

    /// Returns the raw container index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({})", self.0)
    }
}

/// Anything that owns an ordered child sequence.
///
/// Tree mutations take a `ParentId` so that nested and top-level children are
/// handled by the same algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParentId {
    /// A composite instance.
    Instance(InstanceId),
    /// A container's top-level sequence.
    Container(ContainerId),
}

impl From<InstanceId> for ParentId {
    fn from(id: InstanceId) -> Self {
        Self::Instance(id)
    }
}

impl From<ContainerId> for ParentId {
    fn from(id: ContainerId) -> Self {
        Self::Container(id)
    }
}
