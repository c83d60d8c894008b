// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renders a keyed to-do list through a few updates while recording trace
//! events.
//!
//! The recording is replayed into a
//! [`PrettyPrintSink`](hollow_debug::pretty::PrettyPrintSink) on stdout,
//! exported to `trace.json`, and the final tree is printed as an outline.

use std::fs::File;
use std::io::BufWriter;

use hollow_core::renderer::Renderer;
use hollow_core::value::{Value, props};

use hollow_debug::pretty::PrettyPrintSink;
use hollow_debug::recorder::{RecorderSink, replay};
use hollow_debug::snapshot;

fn todo_list(items: &[(&str, &str, bool)]) -> Value {
    Value::element(
        "list",
        props([("title", "todo".into())]),
        [Value::List(
            items
                .iter()
                .map(|&(key, label, done)| {
                    Value::keyed("item", key, props([("done", done.into())]), [Value::text(label)])
                })
                .collect(),
        )],
    )
}

fn main() {
    let mut renderer = Renderer::with_sink(RecorderSink::new());
    let root = renderer.create_container();

    // 1. Initial render.
    let first = todo_list(&[
        ("a", "write parser", false),
        ("b", "write tests", false),
        ("c", "ship", false),
    ]);
    renderer
        .render_to_container(root, &first, Some(Box::new(|| println!("initial render committed"))))
        .expect("initial render");

    // 2. Reorder by key and tick one item off.
    let second = todo_list(&[
        ("c", "ship", false),
        ("a", "write parser", true),
        ("b", "write tests", false),
    ]);
    renderer
        .render_to_container(root, &second, None)
        .expect("reorder");

    // 3. Deferred update: nothing changes until the flush.
    let third = todo_list(&[("c", "ship", true)]);
    renderer
        .schedule_render(root, third, None)
        .expect("schedule");
    let applied = renderer.flush_deferred().expect("flush");
    println!("flushed {applied} deferred update(s)");

    let changes = renderer.take_changes();
    println!(
        "changes: {} added, {} removed, {} prop commits, {} child-sequence edits",
        changes.added.len(),
        changes.removed.len(),
        changes.props.len(),
        changes.children.len(),
    );

    // -- outline -----------------------------------------------------------
    let values = renderer
        .container_to_elements(root)
        .expect("valid container");
    snapshot::write_outline(&values, &mut std::io::stdout()).expect("failed to write outline");

    // 4. Unmount; the container stays usable.
    renderer.unmount_at_container(root).expect("unmount");

    // -- replay + export ---------------------------------------------------
    let bytes = renderer.into_sink().into_bytes();
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let count = replay(&bytes, &mut pretty);

    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    hollow_debug::json::export(&bytes, &mut writer).expect("failed to write trace JSON");

    println!("Wrote {path} ({count} events)");
}
