// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance tree data model.
//!
//! An *instance* is a node the host materialized for the reconciler. It is
//! one of two kinds:
//!
//! - **Composite** — a type identifier, a property mapping (never containing
//!   `children`), and an ordered child sequence.
//! - **Text** — a mutable string leaf.
//!
//! A *container* is a root that owns a top-level child sequence. Containers
//! and composite instances share one mutation algorithm through [`ParentId`].
//!
//! Every instance is addressed by an [`InstanceId`], a generational handle
//! that becomes stale when the instance is destroyed. Identity is the handle:
//! two instances with equal contents are still distinct.
//!
//! # Dirty tracking
//!
//! Mutations mark the corresponding dirty channel (see
//! [`dirty`](crate::dirty)); [`InstanceStore::take_changes`] drains them into
//! a [`CommitChanges`] for observers.

mod changes;
mod id;
mod store;

pub use changes::CommitChanges;
pub use id::{ContainerId, InstanceId, ParentId};
pub use store::{CompositeInstance, ContainerInfo, Instance, InstanceStore, TextInstance};
