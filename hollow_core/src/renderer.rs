// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The public renderer: containers, rendering, and snapshots.
//!
//! [`Renderer`] owns an [`InstanceStore`] (the host), a [`Reconciler`] (the
//! engine), and a [`TraceSink`]. Every entry point validates its container
//! argument first and its children argument second, and returns a
//! [`RenderError`] before touching the instance tree if either is malformed.
//!
//! ```
//! use hollow_core::renderer::Renderer;
//! use hollow_core::value::{Value, props};
//!
//! let mut renderer = Renderer::new();
//! let root = renderer.create_container();
//! let tree = Value::element("box", props([("id", 1.into())]), [Value::text("hi")]);
//! renderer.render_to_container(root, &tree, None).unwrap();
//! assert_eq!(renderer.container_to_elements(root).unwrap(), vec![tree]);
//! ```

use alloc::vec::Vec;

use crate::error::{HostError, RenderError};
use crate::host::{DeferredWork, HostConfig, Unbounded};
use crate::instance::{CommitChanges, ContainerId, InstanceId, InstanceStore};
use crate::reconcile::{Callback, Reconciler};
use crate::serialize;
use crate::trace::{
    CommitEvent, ContainerEvent, ContainerEventKind, DeferredEvent, DeferredEventKind, NoopSink,
    TraceSink, Tracer,
};
#[cfg(feature = "trace-rich")]
use crate::trace::{HostOp, HostOpEvent};
use crate::validate;
use crate::value::{Props, Value};

/// Renders declarative values into an in-memory instance tree.
#[derive(Debug)]
pub struct Renderer<S: TraceSink = NoopSink> {
    store: InstanceStore,
    engine: Reconciler<InstanceId, ContainerId>,
    sink: S,
    commits: u64,
    changes: CommitChanges,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Creates a renderer that discards trace events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(NoopSink)
    }
}

impl<S: TraceSink> Renderer<S> {
    /// Creates a renderer that reports to `sink`.
    #[must_use]
    pub fn with_sink(sink: S) -> Self {
        Self {
            store: InstanceStore::new(),
            engine: Reconciler::new(),
            sink,
            commits: 0,
            changes: CommitChanges::default(),
        }
    }

    /// Returns the trace sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the trace sink mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the renderer and returns its trace sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Returns the instance store for read-only inspection.
    #[must_use]
    pub fn store(&self) -> &InstanceStore {
        &self.store
    }

    /// Allocates an empty container and registers it as a root.
    pub fn create_container(&mut self) -> ContainerId {
        let container = self.store.create_container();
        self.engine.create_container(container);
        Tracer::new(&mut self.sink).container(&ContainerEvent {
            container,
            kind: ContainerEventKind::Created,
        });
        container
    }

    /// Reconciles `children` into `container` synchronously, then invokes
    /// `callback`.
    ///
    /// `children` must be an element or a (nested) list of elements.
    pub fn render_to_container(
        &mut self,
        container: ContainerId,
        children: &Value,
        callback: Option<Callback>,
    ) -> Result<(), RenderError> {
        self.check_container(container)?;
        if !validate::is_element_or_elements(children) {
            return Err(RenderError::InvalidChildren);
        }
        self.render(container, children, callback, ContainerEventKind::Render)
    }

    /// Empties `container` by rendering nothing into it.
    ///
    /// The container itself stays valid and can be rendered into again.
    pub fn unmount_at_container(&mut self, container: ContainerId) -> Result<(), RenderError> {
        self.check_container(container)?;
        self.render(container, &Value::Null, None, ContainerEventKind::Unmount)
    }

    /// Converts the current top-level sequence of `container` into values.
    pub fn container_to_elements(&self, container: ContainerId) -> Result<Vec<Value>, RenderError> {
        self.check_container(container)?;
        Ok(serialize::container_to_elements(&self.store, container))
    }

    /// Queues a render of `children` into `container` for the next
    /// [`flush_deferred`](Self::flush_deferred).
    ///
    /// Arguments are validated now; nothing is reconciled until the flush.
    pub fn schedule_render(
        &mut self,
        container: ContainerId,
        children: Value,
        callback: Option<Callback>,
    ) -> Result<(), RenderError> {
        self.check_container(container)?;
        if !validate::is_element_or_elements(&children) {
            return Err(RenderError::InvalidChildren);
        }
        let Self {
            store,
            engine,
            sink,
            ..
        } = self;
        let mut host = TracingHost::new(store, sink);
        engine.schedule_update(&mut host, container, children, callback);
        Ok(())
    }

    /// Runs all scheduled deferred work with an unbounded deadline.
    ///
    /// Returns the number of updates committed.
    pub fn flush_deferred(&mut self) -> Result<usize, RenderError> {
        let mut applied = 0;
        while let Some(work) = self.store.next_deferred() {
            let Self {
                store,
                engine,
                sink,
                commits,
                changes,
            } = self;
            let mut host = TracingHost::new(store, sink);
            let pending = host.pending();
            host.tracer.deferred(&DeferredEvent {
                seq: work.sequence(),
                pending,
                kind: DeferredEventKind::Run,
            });
            let result = engine.perform_deferred_work(&mut host, work, &Unbounded);
            if let Ok(committed) = &result {
                for (container, stats) in committed {
                    host.tracer
                        .commit(&CommitEvent::new(*commits, *container, stats));
                    *commits += 1;
                    applied += 1;
                }
            }
            store.take_changes_into(changes);
            result?;
        }
        Ok(applied)
    }

    /// Takes the instance-level change record of the most recent commit (or
    /// deferred batch).
    ///
    /// Each commit replaces the record, so it never outgrows one commit.
    /// Returns an empty record if nothing was committed since the last call.
    pub fn take_changes(&mut self) -> CommitChanges {
        core::mem::take(&mut self.changes)
    }

    fn check_container(&self, container: ContainerId) -> Result<(), RenderError> {
        if validate::is_container(&self.store, container) {
            Ok(())
        } else {
            Err(RenderError::InvalidContainer(container))
        }
    }

    fn render(
        &mut self,
        container: ContainerId,
        children: &Value,
        callback: Option<Callback>,
        kind: ContainerEventKind,
    ) -> Result<(), RenderError> {
        let Self {
            store,
            engine,
            sink,
            commits,
            changes,
        } = self;
        let mut host = TracingHost::new(store, sink);
        host.tracer.container(&ContainerEvent { container, kind });
        let result = engine.update_container(&mut host, container, children, callback);
        if let Ok(stats) = &result {
            host.tracer
                .commit(&CommitEvent::new(*commits, container, stats));
            *commits += 1;
        }
        store.take_changes_into(changes);
        result?;
        Ok(())
    }
}

/// An [`InstanceStore`] that reports host operations to a [`Tracer`].
struct TracingHost<'a> {
    store: &'a mut InstanceStore,
    tracer: Tracer<'a>,
}

impl<'a> TracingHost<'a> {
    fn new(store: &'a mut InstanceStore, sink: &'a mut dyn TraceSink) -> Self {
        Self {
            store,
            tracer: Tracer::new(sink),
        }
    }

    fn pending(&self) -> u32 {
        u32::try_from(self.store.pending_deferred()).unwrap_or(u32::MAX)
    }

    #[cfg(feature = "trace-rich")]
    fn op(&mut self, op: HostOp, parent: Option<crate::instance::ParentId>, instance: InstanceId) {
        self.tracer.host_op(&HostOpEvent {
            op,
            parent,
            instance,
        });
    }
}

impl HostConfig for TracingHost<'_> {
    type Instance = InstanceId;
    type Container = ContainerId;
    type UpdatePayload = Props;
    type HostContext = ();

    fn create_instance(&mut self, ty: &str, props: &Props, _context: &()) -> InstanceId {
        let id = self.store.create_instance(ty, props);
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::CreateInstance, None, id);
        id
    }

    fn create_text_instance(&mut self, text: &str, _context: &()) -> InstanceId {
        let id = self.store.create_text_instance(text);
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::CreateText, None, id);
        id
    }

    fn get_public_instance(&self, instance: InstanceId) -> InstanceId {
        self.store.get_public_instance(instance)
    }

    fn prepare_update(
        &self,
        instance: InstanceId,
        ty: &str,
        old_props: &Props,
        new_props: &Props,
    ) -> Option<Props> {
        Some(self.store.prepare_update(instance, ty, old_props, new_props))
    }

    fn commit_update(
        &mut self,
        instance: InstanceId,
        payload: Props,
        _ty: &str,
        _old_props: &Props,
        _new_props: &Props,
    ) {
        self.store.commit_update(instance, payload);
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::CommitUpdate, None, instance);
    }

    fn commit_text_update(&mut self, instance: InstanceId, old_text: &str, new_text: &str) {
        self.store.commit_text_update(instance, old_text, new_text);
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::CommitText, None, instance);
    }

    fn append_child(&mut self, parent: InstanceId, child: InstanceId) {
        HostConfig::append_child(&mut *self.store, parent, child);
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::AppendChild, Some(parent.into()), child);
    }

    fn append_child_to_container(&mut self, container: ContainerId, child: InstanceId) {
        self.store.append_child_to_container(container, child);
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::AppendChild, Some(container.into()), child);
    }

    fn insert_before(
        &mut self,
        parent: InstanceId,
        child: InstanceId,
        before: InstanceId,
    ) -> Result<(), HostError> {
        HostConfig::insert_before(&mut *self.store, parent, child, before)?;
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::InsertBefore, Some(parent.into()), child);
        Ok(())
    }

    fn insert_in_container_before(
        &mut self,
        container: ContainerId,
        child: InstanceId,
        before: InstanceId,
    ) -> Result<(), HostError> {
        self.store
            .insert_in_container_before(container, child, before)?;
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::InsertBefore, Some(container.into()), child);
        Ok(())
    }

    fn remove_child(&mut self, parent: InstanceId, child: InstanceId) -> Result<(), HostError> {
        HostConfig::remove_child(&mut *self.store, parent, child)?;
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::RemoveChild, Some(parent.into()), child);
        Ok(())
    }

    fn remove_child_from_container(
        &mut self,
        container: ContainerId,
        child: InstanceId,
    ) -> Result<(), HostError> {
        self.store.remove_child_from_container(container, child)?;
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::RemoveChild, Some(container.into()), child);
        Ok(())
    }

    fn detach_deleted_instance(&mut self, instance: InstanceId) {
        self.store.destroy(instance);
        #[cfg(feature = "trace-rich")]
        self.op(HostOp::DetachDeleted, None, instance);
    }

    fn schedule_deferred_callback(&mut self, work: DeferredWork) {
        self.store.schedule_deferred(work);
        let pending = self.pending();
        self.tracer.deferred(&DeferredEvent {
            seq: work.sequence(),
            pending,
            kind: DeferredEventKind::Scheduled,
        });
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    use super::*;
    use crate::instance::{Instance, ParentId};
    use crate::value::{CHILDREN, props};

    fn sample_tree() -> Value {
        Value::element(
            "panel",
            props([("title", "main".into()), ("width", 320.into())]),
            [
                Value::text("header"),
                Value::element(
                    "row",
                    props([("gap", 2.5.into())]),
                    [Value::text("a"), Value::element("leaf", Props::new(), [])],
                ),
            ],
        )
    }

    fn ids(renderer: &Renderer, container: ContainerId) -> Vec<InstanceId> {
        renderer
            .store()
            .children(ParentId::Container(container))
            .to_vec()
    }

    #[test]
    fn render_then_serialize_round_trips() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        let tree = sample_tree();
        renderer.render_to_container(c, &tree, None).unwrap();
        let out = renderer.container_to_elements(c).unwrap();
        assert_eq!(out, vec![tree]);

        // Rendering the snapshot elsewhere reproduces the same snapshot.
        let c2 = renderer.create_container();
        renderer
            .render_to_container(c2, &Value::List(out.clone()), None)
            .unwrap();
        assert_eq!(renderer.container_to_elements(c2).unwrap(), out);
    }

    #[test]
    fn stored_props_never_contain_children() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        renderer.render_to_container(c, &sample_tree(), None).unwrap();
        for slot in renderer.store().instances.iter().flatten() {
            if let Instance::Composite(node) = slot {
                assert!(!node.props().contains_key(CHILDREN));
            }
        }
    }

    #[test]
    fn invalid_container_is_rejected_before_children() {
        let mut renderer = Renderer::new();
        let bogus = ContainerId(7);
        let err = renderer
            .render_to_container(bogus, &Value::Int(1), None)
            .unwrap_err();
        assert_eq!(err, RenderError::InvalidContainer(bogus));
        assert_eq!(
            renderer.unmount_at_container(bogus),
            Err(RenderError::InvalidContainer(bogus))
        );
        assert_eq!(
            renderer.container_to_elements(bogus),
            Err(RenderError::InvalidContainer(bogus))
        );
    }

    #[test]
    fn invalid_children_leave_the_tree_untouched() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        renderer.render_to_container(c, &sample_tree(), None).unwrap();
        let before = renderer.container_to_elements(c).unwrap();

        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        let bad = Value::List(vec![Value::text("ok"), Value::Int(3)]);
        let err = renderer
            .render_to_container(c, &bad, Some(Box::new(move || flag.set(true))))
            .unwrap_err();
        assert_eq!(err, RenderError::InvalidChildren);
        assert!(!called.get());
        assert_eq!(renderer.container_to_elements(c).unwrap(), before);
    }

    #[test]
    fn callback_runs_once_after_render() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        renderer
            .render_to_container(
                c,
                &Value::text("x"),
                Some(Box::new(move || counter.set(counter.get() + 1))),
            )
            .unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn unmount_empties_but_keeps_container() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        renderer.render_to_container(c, &sample_tree(), None).unwrap();
        let root = ids(&renderer, c)[0];

        renderer.unmount_at_container(c).unwrap();
        assert!(renderer.container_to_elements(c).unwrap().is_empty());
        assert!(!renderer.store().is_alive(root));
        assert_eq!(renderer.store().live_count(), 0);

        renderer.render_to_container(c, &Value::text("again"), None).unwrap();
        assert_eq!(
            renderer.container_to_elements(c).unwrap(),
            vec![Value::text("again")]
        );
    }

    #[test]
    fn rerender_reuses_instances() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        renderer.render_to_container(c, &sample_tree(), None).unwrap();
        let before = ids(&renderer, c);
        let _ = renderer.take_changes();

        let next = Value::element(
            "panel",
            props([("title", "renamed".into()), ("width", 320.into())]),
            [Value::text("header")],
        );
        renderer.render_to_container(c, &next, None).unwrap();
        assert_eq!(ids(&renderer, c), before);
        assert_eq!(renderer.container_to_elements(c).unwrap(), vec![next]);

        let changes = renderer.take_changes();
        assert_eq!(changes.props, vec![before[0].index()]);
        assert!(changes.children.contains(&before[0].index()));
        assert!(!changes.removed.is_empty());
        assert!(changes.added.is_empty());
    }

    #[test]
    fn change_record_is_bounded_to_one_commit() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        let list = Value::List(
            ["1", "2", "3"]
                .into_iter()
                .map(|key| Value::keyed("item", key, Props::new(), [Value::text(key)]))
                .collect(),
        );
        for _ in 0..50 {
            renderer.render_to_container(c, &list, None).unwrap();
            renderer.unmount_at_container(c).unwrap();
            assert!(renderer.store().pending_added.is_empty());
            assert!(renderer.store().pending_removed.is_empty());
        }

        // Only the final unmount is on record.
        let changes = renderer.take_changes();
        assert!(changes.added.is_empty());
        assert_eq!(changes.removed.len(), 6);
        assert!(renderer.take_changes().is_empty());
    }

    #[test]
    fn number_children_argument_is_rejected() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        renderer.render_to_container(c, &sample_tree(), None).unwrap();
        let before = renderer.container_to_elements(c).unwrap();
        let live = renderer.store().live_count();

        let err = renderer
            .render_to_container(c, &Value::Int(1), None)
            .unwrap_err();
        assert_eq!(err, RenderError::InvalidChildren);
        assert_eq!(renderer.container_to_elements(c).unwrap(), before);
        assert_eq!(renderer.store().live_count(), live);
    }

    #[test]
    fn numbers_render_as_text() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        let tree = Value::element("count", Props::new(), [Value::Int(42)]);
        renderer.render_to_container(c, &tree, None).unwrap();
        assert_eq!(
            renderer.container_to_elements(c).unwrap(),
            vec![Value::element("count", Props::new(), [Value::text("42")])]
        );
    }

    #[test]
    fn scheduled_render_applies_on_flush() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        renderer
            .schedule_render(c, Value::text("later"), Some(Box::new(move || flag.set(true))))
            .unwrap();
        assert!(renderer.container_to_elements(c).unwrap().is_empty());
        assert!(!called.get());

        assert_eq!(renderer.flush_deferred().unwrap(), 1);
        assert!(called.get());
        assert_eq!(
            renderer.container_to_elements(c).unwrap(),
            vec![Value::text("later")]
        );
        assert_eq!(renderer.flush_deferred().unwrap(), 0);
    }

    #[test]
    fn schedule_render_validates_eagerly() {
        let mut renderer = Renderer::new();
        let c = renderer.create_container();
        assert_eq!(
            renderer.schedule_render(c, Value::Bool(true), None),
            Err(RenderError::InvalidChildren)
        );
        assert_eq!(renderer.flush_deferred().unwrap(), 0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn sink_receives_lifecycle_events() {
        #[derive(Default)]
        struct Log {
            containers: Vec<ContainerEventKind>,
            commits: Vec<CommitEvent>,
            deferred: Vec<DeferredEventKind>,
        }

        impl TraceSink for Log {
            fn on_container(&mut self, e: &ContainerEvent) {
                self.containers.push(e.kind);
            }
            fn on_commit(&mut self, e: &CommitEvent) {
                self.commits.push(*e);
            }
            fn on_deferred(&mut self, e: &DeferredEvent) {
                self.deferred.push(e.kind);
            }
        }

        let mut renderer = Renderer::with_sink(Log::default());
        let c = renderer.create_container();
        renderer.render_to_container(c, &sample_tree(), None).unwrap();
        renderer.schedule_render(c, Value::Null, None).unwrap();
        renderer.flush_deferred().unwrap();

        let log = renderer.into_sink();
        assert_eq!(
            log.containers,
            [ContainerEventKind::Created, ContainerEventKind::Render]
        );
        assert_eq!(
            log.deferred,
            [DeferredEventKind::Scheduled, DeferredEventKind::Run]
        );
        assert_eq!(log.commits.len(), 2);
        assert_eq!(log.commits[0].commit_index, 0);
        assert_eq!(log.commits[0].created, 5);
        assert_eq!(log.commits[1].commit_index, 1);
        assert_eq!(log.commits[1].removed, 1);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn host_ops_are_traced() {
        #[derive(Default)]
        struct Ops(Vec<HostOp>);

        impl TraceSink for Ops {
            fn on_host_op(&mut self, e: &HostOpEvent) {
                self.0.push(e.op);
            }
        }

        let mut renderer = Renderer::with_sink(Ops::default());
        let c = renderer.create_container();
        let tree = Value::element("box", Props::new(), [Value::text("t")]);
        renderer.render_to_container(c, &tree, None).unwrap();
        renderer.unmount_at_container(c).unwrap();
        assert_eq!(
            renderer.sink().0,
            [
                HostOp::CreateText,
                HostOp::CreateInstance,
                HostOp::AppendChild,
                HostOp::AppendChild,
                HostOp::RemoveChild,
                HostOp::DetachDeleted,
            ]
        );
    }
}
