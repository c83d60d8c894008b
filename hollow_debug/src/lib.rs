// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for hollow diagnostics.
//!
//! This crate provides [`TraceSink`](hollow_core::trace::TraceSink)
//! implementations for development and post-mortem analysis, plus helpers for
//! inspecting rendered trees:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — compact binary recording with
//!   [`recorder::decode`] for playback and [`recorder::replay`] to feed a
//!   recording into another sink.
//! - [`json::export`] — writes recorded events as a JSON array.
//! - [`snapshot`] — converts serialized trees into JSON or an indented
//!   outline.

pub mod json;
pub mod pretty;
pub mod recorder;
pub mod snapshot;
