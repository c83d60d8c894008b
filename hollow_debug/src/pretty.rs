// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use hollow_core::instance::ParentId;
use hollow_core::trace::{
    CommitEvent, ContainerEvent, ContainerEventKind, DeferredEvent, DeferredEventKind, HostOp,
    HostOpEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    host_ops: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("host_ops", &self.host_ops)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            host_ops: true,
        }
    }

    /// Sets whether per-operation `[op]` lines are written.
    #[must_use]
    pub fn with_host_ops(mut self, host_ops: bool) -> Self {
        self.host_ops = host_ops;
        self
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn container_kind_name(kind: ContainerEventKind) -> &'static str {
    match kind {
        ContainerEventKind::Created => "created",
        ContainerEventKind::Render => "render",
        ContainerEventKind::Unmount => "unmount",
    }
}

fn host_op_name(op: HostOp) -> &'static str {
    match op {
        HostOp::CreateInstance => "create",
        HostOp::CreateText => "create-text",
        HostOp::AppendChild => "append",
        HostOp::InsertBefore => "insert-before",
        HostOp::RemoveChild => "remove",
        HostOp::CommitUpdate => "update",
        HostOp::CommitText => "update-text",
        HostOp::DetachDeleted => "detach",
    }
}

fn parent_label(parent: ParentId) -> String {
    match parent {
        ParentId::Instance(id) => format!("#{}", id.index()),
        ParentId::Container(c) => format!("container {}", c.index()),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_container(&mut self, e: &ContainerEvent) {
        let _ = writeln!(
            self.writer,
            "[container] {} {}",
            e.container.index(),
            container_kind_name(e.kind),
        );
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        let _ = writeln!(
            self.writer,
            "[commit] #{} container={} created={} placed={} removed={} updated={} text={}",
            e.commit_index,
            e.container.index(),
            e.created,
            e.placed,
            e.removed,
            e.updated,
            e.text_updated,
        );
    }

    fn on_deferred(&mut self, e: &DeferredEvent) {
        let kind = match e.kind {
            DeferredEventKind::Scheduled => "scheduled",
            DeferredEventKind::Run => "run",
        };
        let _ = writeln!(
            self.writer,
            "[deferred] {kind} seq={} pending={}",
            e.seq, e.pending,
        );
    }

    fn on_host_op(&mut self, e: &HostOpEvent) {
        if !self.host_ops {
            return;
        }
        let _ = match e.parent {
            Some(parent) => writeln!(
                self.writer,
                "[op] {} #{} in {}",
                host_op_name(e.op),
                e.instance.index(),
                parent_label(parent),
            ),
            None => writeln!(
                self.writer,
                "[op] {} #{}",
                host_op_name(e.op),
                e.instance.index(),
            ),
        };
    }
}
