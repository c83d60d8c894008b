// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`], and [`replay`] feeds them into another
//! sink.

use hollow_core::instance::{ContainerId, InstanceId, ParentId};
use hollow_core::trace::{
    CommitEvent, ContainerEvent, ContainerEventKind, DeferredEvent, DeferredEventKind, HostOp,
    HostOpEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_CONTAINER: u8 = 1;
const TAG_COMMIT: u8 = 2;
const TAG_DEFERRED: u8 = 3;
const TAG_HOST_OP: u8 = 4;

const PARENT_NONE: u8 = 0;
const PARENT_INSTANCE: u8 = 1;
const PARENT_CONTAINER: u8 = 2;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_instance(&mut self, id: InstanceId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    /// Parents are written as a tag plus a fixed 8-byte payload.
    fn write_parent(&mut self, parent: Option<ParentId>) {
        match parent {
            None => {
                self.write_u8(PARENT_NONE);
                self.write_u64(0);
            }
            Some(ParentId::Instance(id)) => {
                self.write_u8(PARENT_INSTANCE);
                self.write_instance(id);
            }
            Some(ParentId::Container(c)) => {
                self.write_u8(PARENT_CONTAINER);
                self.write_u32(c.index());
                self.write_u32(0);
            }
        }
    }
}

fn host_op_code(op: HostOp) -> u8 {
    match op {
        HostOp::CreateInstance => 0,
        HostOp::CreateText => 1,
        HostOp::AppendChild => 2,
        HostOp::InsertBefore => 3,
        HostOp::RemoveChild => 4,
        HostOp::CommitUpdate => 5,
        HostOp::CommitText => 6,
        HostOp::DetachDeleted => 7,
    }
}

impl TraceSink for RecorderSink {
    fn on_container(&mut self, e: &ContainerEvent) {
        self.write_u8(TAG_CONTAINER);
        self.write_u32(e.container.index());
        self.write_u8(match e.kind {
            ContainerEventKind::Created => 0,
            ContainerEventKind::Render => 1,
            ContainerEventKind::Unmount => 2,
        });
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.write_u8(TAG_COMMIT);
        self.write_u64(e.commit_index);
        self.write_u32(e.container.index());
        self.write_u32(e.created);
        self.write_u32(e.placed);
        self.write_u32(e.removed);
        self.write_u32(e.updated);
        self.write_u32(e.text_updated);
    }

    fn on_deferred(&mut self, e: &DeferredEvent) {
        self.write_u8(TAG_DEFERRED);
        self.write_u64(e.seq);
        self.write_u32(e.pending);
        self.write_u8(match e.kind {
            DeferredEventKind::Scheduled => 0,
            DeferredEventKind::Run => 1,
        });
    }

    fn on_host_op(&mut self, e: &HostOpEvent) {
        self.write_u8(TAG_HOST_OP);
        self.write_u8(host_op_code(e.op));
        self.write_parent(e.parent);
        self.write_instance(e.instance);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`ContainerEvent`].
    Container(ContainerEvent),
    /// A [`CommitEvent`].
    Commit(CommitEvent),
    /// A [`DeferredEvent`].
    Deferred(DeferredEvent),
    /// A [`HostOpEvent`].
    HostOp(HostOpEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Feeds every event of a recording into `sink`, in recorded order.
///
/// Returns the number of events replayed.
pub fn replay(bytes: &[u8], sink: &mut dyn TraceSink) -> usize {
    let mut count = 0;
    for event in decode(bytes) {
        match event {
            RecordedEvent::Container(e) => sink.on_container(&e),
            RecordedEvent::Commit(e) => sink.on_commit(&e),
            RecordedEvent::Deferred(e) => sink.on_deferred(&e),
            RecordedEvent::HostOp(e) => sink.on_host_op(&e),
        }
        count += 1;
    }
    count
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_instance(&mut self) -> Option<InstanceId> {
        let idx = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(InstanceId::from_raw(idx, generation))
    }

    fn read_parent(&mut self) -> Option<Option<ParentId>> {
        let tag = self.read_u8()?;
        let a = self.read_u32()?;
        let b = self.read_u32()?;
        Some(match tag {
            PARENT_INSTANCE => Some(ParentId::Instance(InstanceId::from_raw(a, b))),
            PARENT_CONTAINER => Some(ParentId::Container(ContainerId::from_raw(a))),
            _ => None,
        })
    }

    fn read_host_op(&mut self) -> Option<HostOp> {
        Some(match self.read_u8()? {
            0 => HostOp::CreateInstance,
            1 => HostOp::CreateText,
            2 => HostOp::AppendChild,
            3 => HostOp::InsertBefore,
            4 => HostOp::RemoveChild,
            5 => HostOp::CommitUpdate,
            6 => HostOp::CommitText,
            7 => HostOp::DetachDeleted,
            _ => return None,
        })
    }

    fn decode_container(&mut self) -> Option<RecordedEvent> {
        let container = ContainerId::from_raw(self.read_u32()?);
        let kind = match self.read_u8()? {
            0 => ContainerEventKind::Created,
            1 => ContainerEventKind::Render,
            _ => ContainerEventKind::Unmount,
        };
        Some(RecordedEvent::Container(ContainerEvent { container, kind }))
    }

    fn decode_commit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Commit(CommitEvent {
            commit_index: self.read_u64()?,
            container: ContainerId::from_raw(self.read_u32()?),
            created: self.read_u32()?,
            placed: self.read_u32()?,
            removed: self.read_u32()?,
            updated: self.read_u32()?,
            text_updated: self.read_u32()?,
        }))
    }

    fn decode_deferred(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Deferred(DeferredEvent {
            seq: self.read_u64()?,
            pending: self.read_u32()?,
            kind: match self.read_u8()? {
                0 => DeferredEventKind::Scheduled,
                _ => DeferredEventKind::Run,
            },
        }))
    }

    fn decode_host_op(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::HostOp(HostOpEvent {
            op: self.read_host_op()?,
            parent: self.read_parent()?,
            instance: self.read_instance()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_CONTAINER => self.decode_container(),
            TAG_COMMIT => self.decode_commit(),
            TAG_DEFERRED => self.decode_deferred(),
            TAG_HOST_OP => self.decode_host_op(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
