// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host for a tree-reconciliation engine.
//!
//! `hollow_core` lets a reconciler render declarative element trees into a
//! plain, non-visual instance tree that can be inspected and serialized back
//! into elements. It is `no_std` compatible (with `alloc`) and stores
//! instances in an arena with generational handles.
//!
//! # Architecture
//!
//! ```text
//!   Value (elements) ──► Renderer::render_to_container()
//!                              │ validate
//!                              ▼
//!                        Reconciler (render phase: diff fibers)
//!                              │ commit phase
//!                              ▼
//!                        HostConfig ops ──► InstanceStore
//!                                                │
//!                 ┌──────────────────────────────┤
//!                 ▼                              ▼
//!   serialize::container_to_elements()   InstanceStore::take_changes()
//! ```
//!
//! **[`value`]** — Dynamic declarative values and the element factory.
//!
//! **[`instance`]** — Arena of composite and text instances plus containers,
//! with the append / insert-before / remove algorithms and the property
//! update pipeline.
//!
//! **[`host`]** — The [`HostConfig`](host::HostConfig) trait a reconciler
//! drives, implemented by [`InstanceStore`](instance::InstanceStore), plus
//! deferred-work scheduling with an unbounded deadline.
//!
//! **[`reconcile`]** — Reference keyed reconciler generic over any host.
//!
//! **[`renderer`]** — Public entry points: create, render, unmount, snapshot.
//!
//! **[`validate`]** / **[`serialize`]** — Argument checks and conversion of
//! live instances back into values.
//!
//! **[`dirty`]** — Dirty-tracking channels via `understory_dirty`.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-operation
//!   host events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod error;
pub mod host;
pub mod instance;
pub mod reconcile;
pub mod renderer;
pub mod serialize;
pub mod trace;
pub mod validate;
pub mod value;
