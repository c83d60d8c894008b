// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract between a reconciliation engine and a host.
//!
//! A reconciler computes *what* must change; a host decides *how* nodes are
//! materialized. [`HostConfig`] is the seam between the two. The reconciler in
//! [`reconcile`](crate::reconcile) drives any `HostConfig`, and
//! [`InstanceStore`] is the in-memory host this crate ships.
//!
//! Lifecycle hooks that an in-memory host has no use for are default methods:
//! context hooks hand out the default context, `finalize_initial_children`,
//! `should_set_text_content` and `should_deprioritize_subtree` answer `false`,
//! and the rest do nothing.
//!
//! # Deferred work
//!
//! The engine never runs scheduled work itself. It hands the host an opaque
//! [`DeferredWork`] token via [`HostConfig::schedule_deferred_callback`]; the
//! host queues the token and later gives it back to
//! [`Reconciler::perform_deferred_work`](crate::reconcile::Reconciler::perform_deferred_work)
//! together with a [`Deadline`]. The in-memory host always passes
//! [`Unbounded`], so a flush never yields.

use core::fmt;

use crate::error::HostError;
use crate::instance::{ContainerId, InstanceId, InstanceStore, ParentId};
use crate::value::Props;

/// Reports how much time is left for deferred work.
pub trait Deadline {
    /// Remaining time in milliseconds. Work continues while this is positive.
    fn time_remaining(&self) -> f64;
}

/// A [`Deadline`] that never runs out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unbounded;

impl Deadline for Unbounded {
    #[inline]
    fn time_remaining(&self) -> f64 {
        f64::INFINITY
    }
}

/// An opaque token naming one scheduled batch of deferred work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeferredWork {
    seq: u64,
}

impl DeferredWork {
    /// Creates a token with the given sequence number.
    #[inline]
    #[must_use]
    pub const fn new(seq: u64) -> Self {
        Self { seq }
    }

    /// Returns the sequence number.
    #[inline]
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.seq
    }
}

/// Host operations invoked by a reconciler.
///
/// Structural operations that name a reference child (`insert_before`,
/// `remove_child` and their container forms) return [`HostError`] when the
/// child is absent. Such an error means the engine and host disagree about the
/// tree; callers propagate it and do not retry.
pub trait HostConfig {
    /// Handle to a composite or text node.
    type Instance: Copy + Eq + fmt::Debug;
    /// Handle to a root container.
    type Container: Copy + Eq + fmt::Debug;
    /// Result of [`prepare_update`](Self::prepare_update), consumed by
    /// [`commit_update`](Self::commit_update).
    type UpdatePayload;
    /// Context threaded from a parent to its children during rendering.
    type HostContext: Clone + Default;

    // -- Contexts --

    /// Returns the context for the children of `container`.
    fn get_root_host_context(&self, container: Self::Container) -> Self::HostContext {
        _ = container;
        Self::HostContext::default()
    }

    /// Returns the context for the children of a node of type `ty`.
    fn get_child_host_context(&self, parent: &Self::HostContext, ty: &str) -> Self::HostContext {
        _ = ty;
        parent.clone()
    }

    // -- Creation --

    /// Creates a detached composite instance.
    fn create_instance(
        &mut self,
        ty: &str,
        props: &Props,
        context: &Self::HostContext,
    ) -> Self::Instance;

    /// Creates a detached text instance.
    fn create_text_instance(&mut self, text: &str, context: &Self::HostContext) -> Self::Instance;

    /// Returns what user code sees for `instance`.
    fn get_public_instance(&self, instance: Self::Instance) -> Self::Instance {
        instance
    }

    /// Attaches a child while the parent is still being built.
    fn append_initial_child(&mut self, parent: Self::Instance, child: Self::Instance) {
        self.append_child(parent, child);
    }

    /// Called once a fresh instance has all its initial children. Returning
    /// `true` requests a [`commit_mount`](Self::commit_mount) after placement.
    fn finalize_initial_children(
        &mut self,
        instance: Self::Instance,
        ty: &str,
        props: &Props,
    ) -> bool {
        _ = (instance, ty, props);
        false
    }

    /// Called after placement for instances whose finalization asked for it.
    fn commit_mount(&mut self, instance: Self::Instance, ty: &str, props: &Props) {
        _ = (instance, ty, props);
    }

    // -- Updates --

    /// Computes an update payload without mutating anything. `None` means no
    /// commit is needed.
    fn prepare_update(
        &self,
        instance: Self::Instance,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Option<Self::UpdatePayload>;

    /// Applies a payload produced by [`prepare_update`](Self::prepare_update).
    fn commit_update(
        &mut self,
        instance: Self::Instance,
        payload: Self::UpdatePayload,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    );

    /// Replaces the content of a text instance.
    fn commit_text_update(&mut self, instance: Self::Instance, old_text: &str, new_text: &str);

    /// Whether a node of this type renders its children as its own text
    /// content instead of child instances.
    fn should_set_text_content(&self, ty: &str, props: &Props) -> bool {
        _ = (ty, props);
        false
    }

    /// Clears text content set directly on `instance`.
    fn reset_text_content(&mut self, instance: Self::Instance) {
        _ = instance;
    }

    /// Whether the subtree below a node of this type may render later than
    /// the rest of the tree.
    fn should_deprioritize_subtree(&self, ty: &str, props: &Props) -> bool {
        _ = (ty, props);
        false
    }

    // -- Structure --

    /// Moves `child` to the end of `parent`'s children.
    fn append_child(&mut self, parent: Self::Instance, child: Self::Instance);

    /// Moves `child` to the end of `container`'s top-level children.
    fn append_child_to_container(&mut self, container: Self::Container, child: Self::Instance);

    /// Places `child` immediately before `before` among `parent`'s children.
    fn insert_before(
        &mut self,
        parent: Self::Instance,
        child: Self::Instance,
        before: Self::Instance,
    ) -> Result<(), HostError>;

    /// Places `child` immediately before `before` among `container`'s
    /// top-level children.
    fn insert_in_container_before(
        &mut self,
        container: Self::Container,
        child: Self::Instance,
        before: Self::Instance,
    ) -> Result<(), HostError>;

    /// Removes `child` from `parent`'s children.
    fn remove_child(&mut self, parent: Self::Instance, child: Self::Instance)
    -> Result<(), HostError>;

    /// Removes `child` from `container`'s top-level children.
    fn remove_child_from_container(
        &mut self,
        container: Self::Container,
        child: Self::Instance,
    ) -> Result<(), HostError>;

    /// Called for the root of every removed subtree after it was detached.
    fn detach_deleted_instance(&mut self, instance: Self::Instance) {
        _ = instance;
    }

    // -- Commit bracketing and scheduling --

    /// Called before the mutations of a commit are applied.
    fn prepare_for_commit(&mut self, container: Self::Container) {
        _ = container;
    }

    /// Called after the mutations of a commit were applied.
    fn reset_after_commit(&mut self, container: Self::Container) {
        _ = container;
    }

    /// Queues `work` to be handed back to the engine on the next tick.
    fn schedule_deferred_callback(&mut self, work: DeferredWork);
}

impl HostConfig for InstanceStore {
    type Instance = InstanceId;
    type Container = ContainerId;
    type UpdatePayload = Props;
    type HostContext = ();

    fn create_instance(&mut self, ty: &str, props: &Props, _context: &()) -> InstanceId {
        Self::create_instance(self, ty, props)
    }

    fn create_text_instance(&mut self, text: &str, _context: &()) -> InstanceId {
        Self::create_text_instance(self, text)
    }

    fn get_public_instance(&self, instance: InstanceId) -> InstanceId {
        Self::get_public_instance(self, instance)
    }

    fn prepare_update(
        &self,
        instance: InstanceId,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Option<Props> {
        Some(Self::prepare_update(self, instance, ty, old_props, new_props))
    }

    fn commit_update(
        &mut self,
        instance: InstanceId,
        payload: Props,
        _ty: &str,
        _old_props: &Props,
        _new_props: &Props,
    ) {
        Self::commit_update(self, instance, payload);
    }

    fn commit_text_update(&mut self, instance: InstanceId, old_text: &str, new_text: &str) {
        Self::commit_text_update(self, instance, old_text, new_text);
    }

    fn append_child(&mut self, parent: InstanceId, child: InstanceId) {
        Self::append_child(self, ParentId::Instance(parent), child);
    }

    fn append_child_to_container(&mut self, container: ContainerId, child: InstanceId) {
        Self::append_child(self, ParentId::Container(container), child);
    }

    fn insert_before(
        &mut self,
        parent: InstanceId,
        child: InstanceId,
        before: InstanceId,
    ) -> Result<(), HostError> {
        Self::insert_before(self, ParentId::Instance(parent), child, before)
    }

    fn insert_in_container_before(
        &mut self,
        container: ContainerId,
        child: InstanceId,
        before: InstanceId,
    ) -> Result<(), HostError> {
        Self::insert_before(self, ParentId::Container(container), child, before)
    }

    fn remove_child(&mut self, parent: InstanceId, child: InstanceId) -> Result<(), HostError> {
        Self::remove_child(self, ParentId::Instance(parent), child)
    }

    fn remove_child_from_container(
        &mut self,
        container: ContainerId,
        child: InstanceId,
    ) -> Result<(), HostError> {
        Self::remove_child(self, ParentId::Container(container), child)
    }

    fn detach_deleted_instance(&mut self, instance: InstanceId) {
        self.destroy(instance);
    }

    fn schedule_deferred_callback(&mut self, work: DeferredWork) {
        self.schedule_deferred(work);
    }
}
