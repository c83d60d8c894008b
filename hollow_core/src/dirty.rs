// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Hollow uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! record which instances were touched by host operations since the last
//! [`InstanceStore::take_changes`](crate::instance::InstanceStore::take_changes)
//! call. None of the channels propagate: a property commit only concerns the
//! instance it was applied to.
//!
//! - [`PROPS`] — marked by `commit_update`.
//! - [`TEXT`] — marked by `commit_text_update`.
//! - [`CHILDREN`] — marked on the *parent* whenever its child sequence is
//!   mutated (append, insert-before, remove). Container sequences are tracked
//!   separately because containers do not live in the instance index space.

use understory_dirty::Channel;

/// Composite instance properties were replaced.
pub const PROPS: Channel = Channel::new(0);

/// Text instance content was replaced.
pub const TEXT: Channel = Channel::new(1);

/// A composite instance's child sequence changed.
pub const CHILDREN: Channel = Channel::new(2);
