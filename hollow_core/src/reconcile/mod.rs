// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference reconciliation engine.
//!
//! [`Reconciler`] keeps one fiber tree per root container and turns a new
//! children value into host operations in two phases:
//!
//! 1. **Render** — diff new children against the committed fibers, match by
//!    key, reuse same-typed nodes, create fresh instance trees, and record
//!    every mutation of the live tree.
//! 2. **Commit** — bracketed by `prepare_for_commit` / `reset_after_commit`:
//!    deletions, text resets, placements, property updates, text updates, then
//!    `commit_mount` for fresh instances that asked for it.
//!
//! The engine is generic over [`HostConfig`] and never inspects host
//! instances. Host structural errors abort the commit and propagate.
//!
//! # Deferred updates
//!
//! [`Reconciler::schedule_update`] queues an update and asks the host for a
//! single callback per batch. The host later calls
//! [`Reconciler::perform_deferred_work`] with the token it was given; queued
//! updates run until the [`Deadline`] reports no time remaining.

mod diff;
mod fiber;

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

use self::diff::{Effects, HostEffects, ParentRef, Placement, reconcile_children};
use self::fiber::Fiber;
use crate::error::HostError;
use crate::host::{Deadline, DeferredWork, HostConfig};
use crate::value::Value;

/// A completion callback, invoked once the update it belongs to was committed.
pub type Callback = Box<dyn FnOnce()>;

/// Counts of what one commit did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Instances created during the render phase.
    pub created: u32,
    /// Children placed (inserted or moved).
    pub placed: u32,
    /// Subtrees removed.
    pub removed: u32,
    /// Composite property commits.
    pub updated: u32,
    /// Text commits.
    pub text_updated: u32,
}

struct Root<I, C> {
    container: C,
    current: Vec<Fiber<I>>,
}

struct PendingUpdate<C> {
    container: C,
    children: Value,
    callback: Option<Callback>,
}

/// A reconciler driving any [`HostConfig`] whose handles are `I` and `C`.
pub struct Reconciler<I, C> {
    roots: Vec<Root<I, C>>,
    queue: VecDeque<PendingUpdate<C>>,
    scheduled: Option<DeferredWork>,
    next_seq: u64,
}

impl<I, C> fmt::Debug for Reconciler<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("roots", &self.roots.len())
            .field("queued", &self.queue.len())
            .field("scheduled", &self.scheduled)
            .finish_non_exhaustive()
    }
}

impl<I, C> Default for Reconciler<I, C> {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            queue: VecDeque::new(),
            scheduled: None,
            next_seq: 0,
        }
    }
}

impl<I, C> Reconciler<I, C>
where
    I: Copy + Eq + fmt::Debug,
    C: Copy + Eq + fmt::Debug,
{
    /// Creates a reconciler with no roots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `container` as a root. Registering twice is a no-op.
    pub fn create_container(&mut self, container: C) {
        if !self.has_root(container) {
            self.roots.push(Root {
                container,
                current: Vec::new(),
            });
        }
    }

    /// Returns whether `container` is a registered root.
    #[must_use]
    pub fn has_root(&self, container: C) -> bool {
        self.roots.iter().any(|root| root.container == container)
    }

    /// Returns the top-level instances last committed to `container`.
    pub fn root_instances(&self, container: C) -> impl Iterator<Item = I> + '_ {
        self.roots
            .iter()
            .filter(move |root| root.container == container)
            .flat_map(|root| root.current.iter().map(Fiber::instance))
    }

    /// Returns the number of queued deferred updates.
    #[must_use]
    pub fn queued_updates(&self) -> usize {
        self.queue.len()
    }

    /// Reconciles `children` into `container` and commits synchronously.
    ///
    /// The callback runs after a successful commit. Unregistered containers
    /// are registered on first use.
    ///
    /// If the commit fails, the previously committed fibers stay installed and
    /// freshly created instances that were never placed are handed to
    /// `detach_deleted_instance`.
    pub fn update_container<H>(
        &mut self,
        host: &mut H,
        container: C,
        children: &Value,
        callback: Option<Callback>,
    ) -> Result<CommitStats, HostError>
    where
        H: HostConfig<Instance = I, Container = C>,
    {
        let index = self.root_index(container);
        let root = &mut self.roots[index];
        let context = host.get_root_host_context(container);

        let mut effects = Effects::new();
        let next = reconcile_children(
            host,
            ParentRef::Container(container),
            root.current.clone(),
            children,
            &context,
            &mut effects,
        );

        let stats = commit(host, container, effects)?;
        root.current = next;
        if let Some(callback) = callback {
            callback();
        }
        Ok(stats)
    }

    /// Queues an update for the next deferred flush.
    pub fn schedule_update<H>(
        &mut self,
        host: &mut H,
        container: C,
        children: Value,
        callback: Option<Callback>,
    ) where
        H: HostConfig<Instance = I, Container = C>,
    {
        self.queue.push_back(PendingUpdate {
            container,
            children,
            callback,
        });
        self.request_callback(host);
    }

    /// Runs queued updates for the batch named by `work`.
    ///
    /// Returns the committed containers with their stats, in queue order. A
    /// token that does not name the outstanding batch is ignored. If the
    /// deadline runs out, or a commit fails, the remaining updates stay queued
    /// and a new callback is requested.
    pub fn perform_deferred_work<H>(
        &mut self,
        host: &mut H,
        work: DeferredWork,
        deadline: &dyn Deadline,
    ) -> Result<Vec<(C, CommitStats)>, HostError>
    where
        H: HostConfig<Instance = I, Container = C>,
    {
        let mut committed = Vec::new();
        if self.scheduled != Some(work) {
            return Ok(committed);
        }
        self.scheduled = None;

        while deadline.time_remaining() > 0.0 {
            let Some(update) = self.queue.pop_front() else {
                break;
            };
            let result =
                self.update_container(host, update.container, &update.children, update.callback);
            match result {
                Ok(stats) => committed.push((update.container, stats)),
                Err(err) => {
                    if !self.queue.is_empty() {
                        self.request_callback(host);
                    }
                    return Err(err);
                }
            }
        }

        if !self.queue.is_empty() {
            self.request_callback(host);
        }
        Ok(committed)
    }

    fn root_index(&mut self, container: C) -> usize {
        if let Some(index) = self.roots.iter().position(|r| r.container == container) {
            return index;
        }
        self.create_container(container);
        self.roots.len() - 1
    }

    fn request_callback<H>(&mut self, host: &mut H)
    where
        H: HostConfig<Instance = I, Container = C>,
    {
        if self.scheduled.is_none() {
            let work = DeferredWork::new(self.next_seq);
            self.next_seq += 1;
            self.scheduled = Some(work);
            host.schedule_deferred_callback(work);
        }
    }
}

/// Applies recorded effects to the host.
///
/// On a structural error, fresh subtrees whose placement was not applied are
/// released before the error is returned.
fn commit<H: HostConfig>(
    host: &mut H,
    container: H::Container,
    effects: HostEffects<H>,
) -> Result<CommitStats, HostError> {
    let Effects {
        deletions,
        resets,
        placements,
        updates,
        text_updates,
        mounts,
        fresh,
        created,
    } = effects;
    let mut stats = CommitStats {
        created,
        ..CommitStats::default()
    };

    host.prepare_for_commit(container);

    let mut placements = placements.into_iter();
    for (parent, instance) in deletions {
        let removed = match parent {
            ParentRef::Instance(parent) => host.remove_child(parent, instance),
            ParentRef::Container(container) => host.remove_child_from_container(container, instance),
        };
        if let Err(err) = removed {
            release_unplaced(host, &fresh, placements);
            return Err(err);
        }
        host.detach_deleted_instance(instance);
        stats.removed += 1;
    }

    for instance in resets {
        host.reset_text_content(instance);
    }

    while let Some(placement) = placements.next() {
        let child = placement.instance;
        let placed = match (placement.parent, placement.before) {
            (ParentRef::Instance(parent), Some(before)) => host.insert_before(parent, child, before),
            (ParentRef::Instance(parent), None) => {
                host.append_child(parent, child);
                Ok(())
            }
            (ParentRef::Container(container), Some(before)) => {
                host.insert_in_container_before(container, child, before)
            }
            (ParentRef::Container(container), None) => {
                host.append_child_to_container(container, child);
                Ok(())
            }
        };
        if let Err(err) = placed {
            release_unplaced(host, &fresh, core::iter::once(placement).chain(placements));
            return Err(err);
        }
        stats.placed += 1;
    }

    for update in updates {
        host.commit_update(
            update.instance,
            update.payload,
            &update.ty,
            &update.old_props,
            &update.new_props,
        );
        stats.updated += 1;
    }

    for update in text_updates {
        host.commit_text_update(update.instance, &update.old, &update.new);
        stats.text_updated += 1;
    }

    for mount in mounts {
        host.commit_mount(mount.instance, &mount.ty, &mount.props);
    }

    host.reset_after_commit(container);
    Ok(stats)
}

/// Hands every fresh subtree among the `pending` placements back to the host.
fn release_unplaced<H: HostConfig>(
    host: &mut H,
    fresh: &[H::Instance],
    pending: impl Iterator<Item = Placement<H::Instance, H::Container>>,
) {
    for placement in pending {
        if fresh.contains(&placement.instance) {
            host.detach_deleted_instance(placement.instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::cell::Cell;

    use super::*;
    use crate::instance::{ContainerId, Instance, InstanceId, InstanceStore, ParentId};
    use crate::value::{Props, props};

    type Engine = Reconciler<InstanceId, ContainerId>;

    fn setup() -> (InstanceStore, Engine, ContainerId) {
        let mut store = InstanceStore::new();
        let mut engine = Engine::new();
        let c = store.create_container();
        engine.create_container(c);
        (store, engine, c)
    }

    fn item(key: &str) -> Value {
        Value::keyed("item", key, props([("name", key.into())]), [])
    }

    fn top(store: &InstanceStore, c: ContainerId) -> Vec<InstanceId> {
        store.children(ParentId::Container(c)).to_vec()
    }

    #[test]
    fn initial_render_creates_tree() {
        let (mut store, mut engine, c) = setup();
        let tree = Value::element(
            "box",
            props([("id", 1.into())]),
            [Value::text("hello"), Value::element("leaf", Props::new(), [])],
        );
        let stats = engine.update_container(&mut store, c, &tree, None).unwrap();
        assert_eq!(stats.created, 3);
        assert_eq!(stats.placed, 1);

        let roots = top(&store, c);
        assert_eq!(roots.len(), 1);
        let Instance::Composite(node) = store.get(roots[0]) else {
            panic!("expected composite");
        };
        assert_eq!(node.ty(), "box");
        assert_eq!(node.props(), &props([("id", 1.into())]));
        assert_eq!(node.children().len(), 2);
    }

    #[test]
    fn keyed_reorder_moves_instead_of_remounting() {
        let (mut store, mut engine, c) = setup();
        let abc = Value::List(vec![item("a"), item("b"), item("c")]);
        engine.update_container(&mut store, c, &abc, None).unwrap();
        let before = top(&store, c);

        let cab = Value::List(vec![item("c"), item("a"), item("b")]);
        let stats = engine.update_container(&mut store, c, &cab, None).unwrap();
        let after = top(&store, c);

        assert_eq!(after, vec![before[2], before[0], before[1]]);
        assert_eq!(stats.created, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.placed, 2);
    }

    #[test]
    fn keyed_insert_in_the_middle() {
        let (mut store, mut engine, c) = setup();
        let ac = Value::List(vec![item("a"), item("c")]);
        engine.update_container(&mut store, c, &ac, None).unwrap();
        let before = top(&store, c);

        let abc = Value::List(vec![item("a"), item("b"), item("c")]);
        let stats = engine.update_container(&mut store, c, &abc, None).unwrap();
        let after = top(&store, c);
        assert_eq!(after.len(), 3);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[1]);
        assert_eq!(stats.created, 1);
        assert_eq!(stats.placed, 1);
    }

    #[test]
    fn type_change_remounts() {
        let (mut store, mut engine, c) = setup();
        engine
            .update_container(&mut store, c, &Value::element("a", Props::new(), []), None)
            .unwrap();
        let old = top(&store, c)[0];
        let stats = engine
            .update_container(&mut store, c, &Value::element("b", Props::new(), []), None)
            .unwrap();
        assert_eq!(stats.removed, 1);
        assert!(!store.is_alive(old));
        assert_ne!(top(&store, c)[0], old);
    }

    #[test]
    fn unchanged_props_are_not_committed() {
        let (mut store, mut engine, c) = setup();
        let tree = Value::element("box", props([("a", 1.into())]), [Value::text("x")]);
        engine.update_container(&mut store, c, &tree, None).unwrap();
        let stats = engine.update_container(&mut store, c, &tree, None).unwrap();
        assert_eq!(stats, CommitStats::default());
    }

    #[test]
    fn changed_props_and_text_are_committed() {
        let (mut store, mut engine, c) = setup();
        let v1 = Value::element("box", props([("a", 1.into())]), [Value::text("x")]);
        let v2 = Value::element("box", props([("a", 2.into())]), [Value::text("y")]);
        engine.update_container(&mut store, c, &v1, None).unwrap();
        let root = top(&store, c)[0];
        let stats = engine.update_container(&mut store, c, &v2, None).unwrap();
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.text_updated, 1);
        assert_eq!(top(&store, c)[0], root);

        let Instance::Composite(node) = store.get(root) else {
            panic!("expected composite");
        };
        assert_eq!(node.props(), &props([("a", 2.into())]));
        let text = node.children()[0];
        assert_eq!(
            store.get(text),
            &Instance::Text(crate::instance::TextInstance { text: "y".into() })
        );
    }

    #[test]
    fn removed_children_are_freed() {
        let (mut store, mut engine, c) = setup();
        let tree = Value::element("box", Props::new(), [Value::text("a"), Value::text("b")]);
        engine.update_container(&mut store, c, &tree, None).unwrap();
        assert_eq!(store.live_count(), 3);
        engine
            .update_container(&mut store, c, &Value::Null, None)
            .unwrap();
        assert!(top(&store, c).is_empty());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn conditional_child_keeps_sibling() {
        let (mut store, mut engine, c) = setup();
        let with = Value::List(vec![Value::text("maybe"), Value::element("x", Props::new(), [])]);
        let without = Value::List(vec![Value::Bool(false), Value::element("x", Props::new(), [])]);
        engine.update_container(&mut store, c, &with, None).unwrap();
        let x = top(&store, c)[1];
        let stats = engine
            .update_container(&mut store, c, &without, None)
            .unwrap();
        assert_eq!(top(&store, c), vec![x]);
        assert_eq!(stats.created, 0);
        assert_eq!(stats.removed, 1);
    }

    #[test]
    fn callback_runs_after_commit() {
        let (mut store, mut engine, c) = setup();
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        engine
            .update_container(
                &mut store,
                c,
                &Value::text("x"),
                Some(Box::new(move || flag.set(true))),
            )
            .unwrap();
        assert!(called.get());
    }

    #[test]
    fn deferred_updates_wait_for_the_token() {
        let (mut store, mut engine, c) = setup();
        engine.schedule_update(&mut store, c, Value::text("one"), None);
        engine.schedule_update(&mut store, c, Value::text("two"), None);
        // One callback per batch.
        assert_eq!(store.pending_deferred(), 1);
        assert!(top(&store, c).is_empty());

        let work = store.next_deferred().unwrap();
        let committed = engine
            .perform_deferred_work(&mut store, work, &crate::host::Unbounded)
            .unwrap();
        assert_eq!(committed.len(), 2);
        assert_eq!(engine.queued_updates(), 0);
        let text = top(&store, c)[0];
        assert_eq!(
            store.get(text),
            &Instance::Text(crate::instance::TextInstance { text: "two".into() })
        );
    }

    #[test]
    fn stale_token_is_ignored() {
        let (mut store, mut engine, c) = setup();
        engine.schedule_update(&mut store, c, Value::text("one"), None);
        let committed = engine
            .perform_deferred_work(&mut store, DeferredWork::new(99), &crate::host::Unbounded)
            .unwrap();
        assert!(committed.is_empty());
        assert_eq!(engine.queued_updates(), 1);
    }

    #[test]
    fn exhausted_deadline_reschedules() {
        struct Exhausted;
        impl Deadline for Exhausted {
            fn time_remaining(&self) -> f64 {
                0.0
            }
        }

        let (mut store, mut engine, c) = setup();
        engine.schedule_update(&mut store, c, Value::text("one"), None);
        let work = store.next_deferred().unwrap();
        let committed = engine
            .perform_deferred_work(&mut store, work, &Exhausted)
            .unwrap();
        assert!(committed.is_empty());
        assert_eq!(store.pending_deferred(), 1);
    }

    /// Records hook calls on top of an `InstanceStore`.
    #[derive(Default)]
    struct RecordingHost {
        store: InstanceStore,
        log: Vec<String>,
        mount_types: Vec<&'static str>,
        text_types: Vec<&'static str>,
    }

    impl HostConfig for RecordingHost {
        type Instance = InstanceId;
        type Container = ContainerId;
        type UpdatePayload = Props;
        type HostContext = u32;

        fn get_root_host_context(&self, _container: ContainerId) -> u32 {
            0
        }

        fn get_child_host_context(&self, parent: &u32, _ty: &str) -> u32 {
            parent + 1
        }

        fn create_instance(&mut self, ty: &str, props: &Props, depth: &u32) -> InstanceId {
            self.log.push(alloc::format!("create {ty}@{depth}"));
            self.store.create_instance(ty, props)
        }

        fn create_text_instance(&mut self, text: &str, depth: &u32) -> InstanceId {
            self.log.push(alloc::format!("text {text}@{depth}"));
            self.store.create_text_instance(text)
        }

        fn finalize_initial_children(&mut self, _: InstanceId, ty: &str, _: &Props) -> bool {
            self.mount_types.iter().any(|t| *t == ty)
        }

        fn commit_mount(&mut self, _: InstanceId, ty: &str, _: &Props) {
            self.log.push(alloc::format!("mount {ty}"));
        }

        fn should_set_text_content(&self, ty: &str, _: &Props) -> bool {
            self.text_types.iter().any(|t| *t == ty)
        }

        fn prepare_update(
            &self,
            instance: InstanceId,
            ty: &str,
            old: &Props,
            new: &Props,
        ) -> Option<Props> {
            Some(self.store.prepare_update(instance, ty, old, new))
        }

        fn commit_update(&mut self, instance: InstanceId, payload: Props, _: &str, _: &Props, _: &Props) {
            self.log.push("update".into());
            self.store.commit_update(instance, payload);
        }

        fn commit_text_update(&mut self, instance: InstanceId, old: &str, new: &str) {
            self.store.commit_text_update(instance, old, new);
        }

        fn append_child(&mut self, parent: InstanceId, child: InstanceId) {
            self.store.append_child(ParentId::Instance(parent), child);
        }

        fn append_child_to_container(&mut self, container: ContainerId, child: InstanceId) {
            self.log.push("append".into());
            self.store.append_child(ParentId::Container(container), child);
        }

        fn insert_before(
            &mut self,
            parent: InstanceId,
            child: InstanceId,
            before: InstanceId,
        ) -> Result<(), HostError> {
            self.store.insert_before(ParentId::Instance(parent), child, before)
        }

        fn insert_in_container_before(
            &mut self,
            container: ContainerId,
            child: InstanceId,
            before: InstanceId,
        ) -> Result<(), HostError> {
            self.store.insert_before(ParentId::Container(container), child, before)
        }

        fn remove_child(&mut self, parent: InstanceId, child: InstanceId) -> Result<(), HostError> {
            self.store.remove_child(ParentId::Instance(parent), child)
        }

        fn remove_child_from_container(
            &mut self,
            container: ContainerId,
            child: InstanceId,
        ) -> Result<(), HostError> {
            self.log.push("remove".into());
            self.store.remove_child(ParentId::Container(container), child)
        }

        fn prepare_for_commit(&mut self, _: ContainerId) {
            self.log.push("prepare".into());
        }

        fn reset_after_commit(&mut self, _: ContainerId) {
            self.log.push("reset".into());
        }

        fn schedule_deferred_callback(&mut self, work: DeferredWork) {
            self.store.schedule_deferred(work);
        }
    }

    #[test]
    fn commit_is_bracketed_and_ordered() {
        let mut host = RecordingHost {
            mount_types: vec!["input"],
            ..RecordingHost::default()
        };
        let c = host.store.create_container();
        let mut engine = Engine::new();
        let tree = Value::element("input", Props::new(), [Value::text("t")]);
        engine.update_container(&mut host, c, &tree, None).unwrap();
        // Bottom-up creation with contexts, then the bracketed commit.
        assert_eq!(
            host.log,
            ["text t@1", "create input@0", "prepare", "append", "mount input", "reset"]
        );

        host.log.clear();
        let next = Value::element("other", props([("a", 1.into())]), []);
        engine.update_container(&mut host, c, &next, None).unwrap();
        assert_eq!(
            host.log,
            ["create other@0", "prepare", "remove", "append", "reset"]
        );
    }

    #[test]
    fn text_content_hosts_skip_children() {
        let mut host = RecordingHost {
            text_types: vec!["label"],
            ..RecordingHost::default()
        };
        let c = host.store.create_container();
        let mut engine = Engine::new();
        let tree = Value::element("label", Props::new(), [Value::text("inline")]);
        let stats = engine.update_container(&mut host, c, &tree, None).unwrap();
        assert_eq!(stats.created, 1);
        let root = host.store.children(ParentId::Container(c))[0];
        assert!(host.store.children(ParentId::Instance(root)).is_empty());
    }

    #[test]
    fn missing_reference_child_fails_fast() {
        let (mut store, mut engine, c) = setup();
        let ab = Value::List(vec![item("a"), item("b")]);
        engine.update_container(&mut store, c, &ab, None).unwrap();
        // Pull an instance out from under the engine.
        let a = top(&store, c)[0];
        store.remove_child(ParentId::Container(c), a).unwrap();

        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        let err = engine
            .update_container(
                &mut store,
                c,
                &Value::List(vec![item("b")]),
                Some(Box::new(move || flag.set(true))),
            )
            .unwrap_err();
        assert!(matches!(err, HostError::ChildNotFound { child, .. } if child == a));
        assert!(!called.get());
    }

    #[test]
    fn failed_commit_keeps_fibers_and_frees_fresh_instances() {
        let (mut store, mut engine, c) = setup();
        let ab = Value::List(vec![item("a"), item("b")]);
        engine.update_container(&mut store, c, &ab, None).unwrap();
        let before = top(&store, c);
        // Detach the anchor the next render inserts in front of.
        store.remove_child(ParentId::Container(c), before[1]).unwrap();

        let axb = Value::List(vec![item("a"), item("x"), item("b")]);
        let err = engine
            .update_container(&mut store, c, &axb, None)
            .unwrap_err();
        assert!(matches!(err, HostError::ChildNotFound { child, .. } if child == before[1]));

        // Only `a` and the detached `b` survive; `x` was released.
        assert_eq!(store.live_count(), 2);
        assert_eq!(engine.root_instances(c).collect::<Vec<_>>(), before);

        store.append_child(ParentId::Container(c), before[1]);
        let stats = engine.update_container(&mut store, c, &axb, None).unwrap();
        assert_eq!(stats.created, 1);
        assert_eq!(top(&store, c).len(), 3);
        assert_eq!(top(&store, c)[0], before[0]);
        assert_eq!(top(&store, c)[2], before[1]);
    }
}
