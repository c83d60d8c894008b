// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena storage for instances and containers, with topology and property
//! management.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker};

use super::changes::CommitChanges;
use super::id::{ContainerId, InstanceId, ParentId};
use crate::dirty;
use crate::error::HostError;
use crate::host::DeferredWork;
use crate::value::{Props, props_without_children};

/// A renderable node.
#[derive(Clone, Debug, PartialEq)]
pub enum Instance {
    /// An element-backed node with properties and ordered children.
    Composite(CompositeInstance),
    /// A leaf holding mutable text.
    Text(TextInstance),
}

/// The payload of [`Instance::Composite`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeInstance {
    pub(crate) ty: String,
    pub(crate) props: Props,
    pub(crate) children: Vec<InstanceId>,
}

impl CompositeInstance {
    /// Returns the type identifier.
    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Returns the stored properties. Never contains a `children` entry.
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Returns the ordered child sequence.
    #[must_use]
    pub fn children(&self) -> &[InstanceId] {
        &self.children
    }
}

/// The payload of [`Instance::Text`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextInstance {
    pub(crate) text: String,
}

impl TextInstance {
    /// Returns the current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The record behind a [`ContainerId`]: an ordered top-level sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerInfo {
    pub(crate) children: Vec<InstanceId>,
}

impl ContainerInfo {
    /// Returns the ordered top-level child sequence.
    #[must_use]
    pub fn children(&self) -> &[InstanceId] {
        &self.children
    }
}

/// Arena storage for all instances and containers.
///
/// Instances are addressed by [`InstanceId`] handles. Destroyed instances are
/// recycled via a free list, and generation counters prevent stale handle
/// access. A parent's child sequence is the authority on membership; each
/// instance additionally records its current parent so that attaching it
/// elsewhere detaches it first.
#[derive(Debug)]
pub struct InstanceStore {
    // -- Instances --
    pub(crate) instances: Vec<Option<Instance>>,
    pub(crate) parent: Vec<Option<ParentId>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Containers --
    pub(crate) containers: Vec<ContainerInfo>,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
    pub(crate) touched_containers: Vec<ContainerId>,

    // -- Deferred work --
    pub(crate) deferred: VecDeque<DeferredWork>,
}

impl Default for InstanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
            parent: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            containers: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            touched_containers: Vec::new(),
            deferred: VecDeque::new(),
        }
    }

    // -- Container API --

    /// Allocates an empty container.
    pub fn create_container(&mut self) -> ContainerId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "container handles are u32 by construction"
        )]
        let id = ContainerId(self.containers.len() as u32);
        self.containers.push(ContainerInfo::default());
        id
    }

    /// Returns whether `id` names a container allocated by this store.
    #[must_use]
    pub fn is_container(&self, id: ContainerId) -> bool {
        (id.0 as usize) < self.containers.len()
    }

    /// Returns the container record.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this store.
    #[must_use]
    pub fn container(&self, id: ContainerId) -> &ContainerInfo {
        self.validate_container(id);
        &self.containers[id.0 as usize]
    }

    /// Returns the number of containers.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    // -- Allocation API --

    /// Creates a composite instance with an empty child sequence.
    ///
    /// The stored properties are `props` without any `children` entry.
    pub fn create_instance(&mut self, ty: &str, props: &Props) -> InstanceId {
        self.allocate(Instance::Composite(CompositeInstance {
            ty: ty.into(),
            props: props_without_children(props),
            children: Vec::new(),
        }))
    }

    /// Creates a text instance.
    pub fn create_text_instance(&mut self, text: &str) -> InstanceId {
        self.allocate(Instance::Text(TextInstance { text: text.into() }))
    }

    /// Destroys a detached instance and its entire subtree, freeing the slots
    /// for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the instance is still attached to a
    /// parent (remove it first).
    pub fn destroy(&mut self, id: InstanceId) {
        self.validate(id);
        assert!(
            self.parent[id.idx as usize].is_none(),
            "cannot destroy attached instance {id:?}"
        );

        let mut stack = Vec::from([id.idx]);
        while let Some(idx) = stack.pop() {
            if let Some(Instance::Composite(node)) = self.instances[idx as usize].take() {
                stack.extend(node.children.iter().map(|child| child.idx));
            }
            self.parent[idx as usize] = None;
            self.dirty.remove_key(idx);
            // Bump generation so old handles immediately fail validation.
            self.generation[idx as usize] += 1;
            self.free_list.push(idx);
            self.pending_removed.push(idx);
        }
    }

    /// Returns whether the given handle refers to a live instance.
    #[must_use]
    pub fn is_alive(&self, id: InstanceId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.instances[id.idx as usize].is_some()
    }

    /// Returns the number of live instances.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.instances.iter().filter(|slot| slot.is_some()).count()
    }

    // -- Queries --

    /// Returns the instance behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn get(&self, id: InstanceId) -> &Instance {
        match self.try_get(id) {
            Some(instance) => instance,
            None => panic!("stale InstanceId: {id:?}"),
        }
    }

    /// Returns the instance behind a handle, or `None` if the handle is stale.
    #[must_use]
    pub fn try_get(&self, id: InstanceId) -> Option<&Instance> {
        if !self.is_alive(id) {
            return None;
        }
        self.instances[id.idx as usize].as_ref()
    }

    /// Returns the public face of an instance, which is the handle itself.
    #[inline]
    #[must_use]
    pub fn get_public_instance(&self, id: InstanceId) -> InstanceId {
        id
    }

    /// Returns the current parent of an instance, if attached.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn parent(&self, id: InstanceId) -> Option<ParentId> {
        self.validate(id);
        self.parent[id.idx as usize]
    }

    /// Returns the ordered child sequence of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a stale handle, an unknown container, or a text
    /// instance.
    #[must_use]
    pub fn children(&self, parent: ParentId) -> &[InstanceId] {
        match parent {
            ParentId::Container(c) => &self.container(c).children,
            ParentId::Instance(id) => match self.get(id) {
                Instance::Composite(node) => &node.children,
                Instance::Text(_) => panic!("text instance {id:?} cannot have children"),
            },
        }
    }

    // -- Topology API --

    /// Moves `child` to the end of `parent`'s child sequence.
    ///
    /// If `child` is already in the sequence it is removed first, so it ends up
    /// in the last position exactly once. If it is attached to a different
    /// parent it is detached from there.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `parent` is a text instance.
    pub fn append_child(&mut self, parent: ParentId, child: InstanceId) {
        self.validate(child);
        self.detach_from_other(parent, child);

        let children = self.child_list_mut(parent);
        if let Some(index) = position(children, child) {
            children.remove(index);
        }
        children.push(child);

        self.parent[child.idx as usize] = Some(parent);
        self.mark_children_dirty(parent);
    }

    /// Places `child` immediately before `before` in `parent`'s sequence.
    ///
    /// If `child` is already in the sequence it is removed first. `before`
    /// must be present and must differ from `child`; otherwise
    /// [`HostError::ChildNotFound`] is returned and nothing is mutated.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `parent` is a text instance.
    pub fn insert_before(
        &mut self,
        parent: ParentId,
        child: InstanceId,
        before: InstanceId,
    ) -> Result<(), HostError> {
        self.validate(child);
        self.validate(before);
        let missing = HostError::ChildNotFound {
            parent,
            child: before,
        };
        if child == before || position(self.children(parent), before).is_none() {
            return Err(missing);
        }

        self.detach_from_other(parent, child);

        let children = self.child_list_mut(parent);
        if let Some(index) = position(children, child) {
            children.remove(index);
        }
        let before_index = position(children, before).ok_or(missing)?;
        children.insert(before_index, child);

        self.parent[child.idx as usize] = Some(parent);
        self.mark_children_dirty(parent);
        Ok(())
    }

    /// Removes `child` from `parent`'s sequence.
    ///
    /// Returns [`HostError::ChildNotFound`] without mutating anything if
    /// `child` is not present.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `parent` is a text instance.
    pub fn remove_child(&mut self, parent: ParentId, child: InstanceId) -> Result<(), HostError> {
        self.validate(child);
        let children = self.child_list_mut(parent);
        let index = position(children, child).ok_or(HostError::ChildNotFound { parent, child })?;
        children.remove(index);

        self.parent[child.idx as usize] = None;
        self.mark_children_dirty(parent);
        Ok(())
    }

    // -- Property API --

    /// Computes the property mapping a later [`commit_update`](Self::commit_update)
    /// will install: `new_props` without children. Does not mutate.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn prepare_update(
        &self,
        id: InstanceId,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Props {
        self.validate(id);
        _ = (ty, old_props);
        props_without_children(new_props)
    }

    /// Replaces the whole property mapping of a composite instance.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or names a text instance.
    pub fn commit_update(&mut self, id: InstanceId, payload: Props) {
        match self.get_mut(id) {
            Instance::Composite(node) => node.props = payload,
            Instance::Text(_) => panic!("cannot commit properties to text instance {id:?}"),
        }
        self.dirty.mark(id.idx, dirty::PROPS);
    }

    /// Replaces the content of a text instance.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or names a composite instance.
    pub fn commit_text_update(&mut self, id: InstanceId, old_text: &str, new_text: &str) {
        _ = old_text;
        match self.get_mut(id) {
            Instance::Text(node) => node.text = new_text.into(),
            Instance::Composite(_) => panic!("cannot commit text to composite instance {id:?}"),
        }
        self.dirty.mark(id.idx, dirty::TEXT);
    }

    // -- Change tracking --

    /// Drains all dirty channels and returns the instances touched since the
    /// previous call.
    pub fn take_changes(&mut self) -> CommitChanges {
        let mut changes = CommitChanges::default();
        self.take_changes_into(&mut changes);
        changes
    }

    /// Like [`take_changes`](Self::take_changes), but reuses a caller-provided
    /// buffer.
    pub fn take_changes_into(&mut self, changes: &mut CommitChanges) {
        changes.clear();
        changes
            .props
            .extend(self.dirty.drain(dirty::PROPS).affected().deterministic().run());
        changes
            .text
            .extend(self.dirty.drain(dirty::TEXT).affected().deterministic().run());
        changes.children.extend(
            self.dirty
                .drain(dirty::CHILDREN)
                .affected()
                .deterministic()
                .run(),
        );
        changes.added.append(&mut self.pending_added);
        changes.removed.append(&mut self.pending_removed);
        changes.containers.append(&mut self.touched_containers);
    }

    // -- Deferred work --

    /// Queues a unit of deferred work to run at the next flush.
    pub fn schedule_deferred(&mut self, work: DeferredWork) {
        self.deferred.push_back(work);
    }

    /// Pops the oldest queued unit of deferred work.
    pub fn next_deferred(&mut self) -> Option<DeferredWork> {
        self.deferred.pop_front()
    }

    /// Returns the number of queued units of deferred work.
    #[must_use]
    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    // -- Internal helpers --

    fn allocate(&mut self, instance: Instance) -> InstanceId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.instances[idx as usize] = Some(instance);
            self.parent[idx as usize] = None;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.instances.push(Some(instance));
            self.parent.push(None);
            self.generation.push(0);
            idx
        };

        self.pending_added.push(idx);

        InstanceId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    fn validate(&self, id: InstanceId) {
        assert!(
            self.is_alive(id),
            "stale InstanceId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Panics if the container was not allocated by this store.
    fn validate_container(&self, id: ContainerId) {
        assert!(self.is_container(id), "unknown ContainerId: {id:?}");
    }

    fn get_mut(&mut self, id: InstanceId) -> &mut Instance {
        self.validate(id);
        match self.instances[id.idx as usize].as_mut() {
            Some(instance) => instance,
            None => panic!("stale InstanceId: {id:?}"),
        }
    }

    fn child_list_mut(&mut self, parent: ParentId) -> &mut Vec<InstanceId> {
        match parent {
            ParentId::Container(c) => {
                self.validate_container(c);
                &mut self.containers[c.0 as usize].children
            }
            ParentId::Instance(id) => match self.get_mut(id) {
                Instance::Composite(node) => &mut node.children,
                Instance::Text(_) => panic!("text instance {id:?} cannot have children"),
            },
        }
    }

    /// Detaches `child` from its current parent if that parent is not `parent`.
    fn detach_from_other(&mut self, parent: ParentId, child: InstanceId) {
        if let Some(old) = self.parent[child.idx as usize]
            && old != parent
        {
            let siblings = self.child_list_mut(old);
            if let Some(index) = position(siblings, child) {
                siblings.remove(index);
            }
            self.parent[child.idx as usize] = None;
            self.mark_children_dirty(old);
        }
    }

    fn mark_children_dirty(&mut self, parent: ParentId) {
        match parent {
            ParentId::Instance(id) => self.dirty.mark(id.idx, dirty::CHILDREN),
            ParentId::Container(c) => {
                if !self.touched_containers.contains(&c) {
                    self.touched_containers.push(c);
                }
            }
        }
    }
}

/// Finds `child` in a sequence by identity.
fn position(children: &[InstanceId], child: InstanceId) -> Option<usize> {
    children.iter().position(|&c| c == child)
}
