// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter for recorded events.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes a JSON array with one object per event to the given writer.
//! Every object carries a `"seq"` (position in the recording) and an
//! `"event"` name; the remaining fields depend on the event.

use std::io::{self, Write};

use serde_json::{Value, json};

use hollow_core::instance::ParentId;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes)
        .enumerate()
        .map(|(seq, recorded)| event_json(seq, &recorded))
        .collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn event_json(seq: usize, recorded: &RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::Container(e) => json!({
            "seq": seq,
            "event": "Container",
            "container": e.container.index(),
            "kind": format!("{:?}", e.kind),
        }),
        RecordedEvent::Commit(e) => json!({
            "seq": seq,
            "event": "Commit",
            "commit_index": e.commit_index,
            "container": e.container.index(),
            "args": {
                "created": e.created,
                "placed": e.placed,
                "removed": e.removed,
                "updated": e.updated,
                "text_updated": e.text_updated,
            }
        }),
        RecordedEvent::Deferred(e) => json!({
            "seq": seq,
            "event": "Deferred",
            "kind": format!("{:?}", e.kind),
            "batch": e.seq,
            "pending": e.pending,
        }),
        RecordedEvent::HostOp(e) => json!({
            "seq": seq,
            "event": "HostOp",
            "op": format!("{:?}", e.op),
            "instance": e.instance.index(),
            "generation": e.instance.generation(),
            "parent": e.parent.map(parent_json),
        }),
    }
}

fn parent_json(parent: ParentId) -> Value {
    match parent {
        ParentId::Instance(id) => json!({ "instance": id.index() }),
        ParentId::Container(c) => json!({ "container": c.index() }),
    }
}
