// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for rendering.
//!
//! This module provides a [`TraceSink`] trait with one method per event that
//! the [`Renderer`](crate::renderer::Renderer) emits. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) — gates [`HostOpEvent`], emitted once per
//!   host operation, plus the corresponding `TraceSink` method.

use crate::instance::ContainerId;
#[cfg(feature = "trace-rich")]
use crate::instance::{InstanceId, ParentId};
use crate::reconcile::CommitStats;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What happened to a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerEventKind {
    /// The container was allocated.
    Created,
    /// A synchronous render was requested.
    Render,
    /// The container was emptied.
    Unmount,
}

/// What happened to a batch of deferred work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeferredEventKind {
    /// The engine asked the host to run the batch later.
    Scheduled,
    /// The host handed the batch back to the engine.
    Run,
}

/// Which host operation was performed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostOp {
    /// A composite instance was created.
    CreateInstance,
    /// A text instance was created.
    CreateText,
    /// A child was moved to the end of a sequence.
    AppendChild,
    /// A child was placed before a sibling.
    InsertBefore,
    /// A child was removed from a sequence.
    RemoveChild,
    /// Properties were replaced.
    CommitUpdate,
    /// Text was replaced.
    CommitText,
    /// A removed subtree was freed.
    DetachDeleted,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted by container lifecycle entry points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerEvent {
    /// Which container.
    pub container: ContainerId,
    /// What happened.
    pub kind: ContainerEventKind,
}

/// Emitted after a reconciliation pass was committed to a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitEvent {
    /// Monotonic commit counter.
    pub commit_index: u64,
    /// Which container was committed.
    pub container: ContainerId,
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

impl CommitEvent {
    /// Creates a `CommitEvent` from the stats of one commit.
    #[must_use]
    pub fn new(commit_index: u64, container: ContainerId, stats: &CommitStats) -> Self {
        Self {
            commit_index,
            container,
            created: stats.created,
            placed: stats.placed,
            removed: stats.removed,
            updated: stats.updated,
            text_updated: stats.text_updated,
        }
    }
}

/// Emitted when deferred work is scheduled or run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeferredEvent {
    /// Sequence number of the batch.
    pub seq: u64,
    /// Number of batches still queued after this event.
    pub pending: u32,
    /// What happened.
    pub kind: DeferredEventKind,
}

/// A single host operation.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostOpEvent {
    /// Which operation.
    pub op: HostOp,
    /// The parent sequence involved, for structural operations.
    pub parent: Option<ParentId>,
    /// The instance the operation applied to.
    pub instance: InstanceId,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a renderer.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called by container lifecycle entry points.
    fn on_container(&mut self, e: &ContainerEvent) {
        _ = e;
    }

    /// Called after each commit.
    fn on_commit(&mut self, e: &CommitEvent) {
        _ = e;
    }

    /// Called when deferred work is scheduled or run.
    fn on_deferred(&mut self, e: &DeferredEvent) {
        _ = e;
    }

    /// Called for each host operation (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_host_op(&mut self, e: &HostOpEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`ContainerEvent`].
    #[inline]
    pub fn container(&mut self, e: &ContainerEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_container(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CommitEvent`].
    #[inline]
    pub fn commit(&mut self, e: &CommitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_commit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DeferredEvent`].
    #[inline]
    pub fn deferred(&mut self, e: &DeferredEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_deferred(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`HostOpEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn host_op(&mut self, e: &HostOpEvent) {
        if let Some(s) = &mut self.sink {
            s.on_host_op(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_event_from_stats() {
        let stats = CommitStats {
            created: 3,
            placed: 2,
            removed: 1,
            updated: 4,
            text_updated: 5,
        };
        let evt = CommitEvent::new(9, ContainerId(2), &stats);
        assert_eq!(evt.commit_index, 9);
        assert_eq!(evt.container, ContainerId(2));
        assert_eq!(evt.created, 3);
        assert_eq!(evt.placed, 2);
        assert_eq!(evt.removed, 1);
        assert_eq!(evt.updated, 4);
        assert_eq!(evt.text_updated, 5);
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        let mut tracer = Tracer::new(&mut sink);
        tracer.container(&ContainerEvent {
            container: ContainerId(0),
            kind: ContainerEventKind::Created,
        });
        tracer.deferred(&DeferredEvent {
            seq: 0,
            pending: 0,
            kind: DeferredEventKind::Run,
        });
    }

    #[test]
    fn tracer_none_compiles() {
        let mut tracer = Tracer::none();
        tracer.commit(&CommitEvent::new(0, ContainerId(0), &CommitStats::default()));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        #[derive(Default)]
        struct Counter {
            containers: u32,
            commits: u32,
            deferred: u32,
        }

        impl TraceSink for Counter {
            fn on_container(&mut self, _e: &ContainerEvent) {
                self.containers += 1;
            }
            fn on_commit(&mut self, _e: &CommitEvent) {
                self.commits += 1;
            }
            fn on_deferred(&mut self, _e: &DeferredEvent) {
                self.deferred += 1;
            }
        }

        let mut counter = Counter::default();
        {
            let mut tracer = Tracer::new(&mut counter);
            tracer.container(&ContainerEvent {
                container: ContainerId(0),
                kind: ContainerEventKind::Render,
            });
            tracer.commit(&CommitEvent::new(0, ContainerId(0), &CommitStats::default()));
            tracer.commit(&CommitEvent::new(1, ContainerId(0), &CommitStats::default()));
            tracer.deferred(&DeferredEvent {
                seq: 1,
                pending: 0,
                kind: DeferredEventKind::Scheduled,
            });
        }
        assert_eq!(counter.containers, 1);
        assert_eq!(counter.commits, 2);
        assert_eq!(counter.deferred, 1);
    }
}
