// Copyright 2026 the Hollow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render phase: diff new children against committed fibers.
//!
//! The render phase creates fresh instances (bottom-up, attaching their initial
//! children immediately) but never touches attached nodes. Every mutation of
//! the live tree is recorded in [`Effects`] and applied by the commit phase.
//!
//! Placement follows the last-placed-index rule: walking the new children in
//! order, a reused fiber whose old index is below the highest old index seen so
//! far must move; everything else stays. Placements are recorded from the last
//! child to the first, each anchored before its next sibling, so every anchor
//! is already in its final position when the placement is applied.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use super::fiber::{Child, Fiber, flatten};
use crate::host::HostConfig;
use crate::value::{CHILDREN, Props, Value};

/// The sequence that owns a child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ParentRef<I, C> {
    Instance(I),
    Container(C),
}

#[derive(Debug)]
pub(crate) struct Placement<I, C> {
    pub(crate) parent: ParentRef<I, C>,
    pub(crate) instance: I,
    pub(crate) before: Option<I>,
}

#[derive(Debug)]
pub(crate) struct Update<I, P> {
    pub(crate) instance: I,
    pub(crate) payload: P,
    pub(crate) ty: String,
    pub(crate) old_props: Props,
    pub(crate) new_props: Props,
}

#[derive(Debug)]
pub(crate) struct TextUpdate<I> {
    pub(crate) instance: I,
    pub(crate) old: String,
    pub(crate) new: String,
}

#[derive(Debug)]
pub(crate) struct Mount<I> {
    pub(crate) instance: I,
    pub(crate) ty: String,
    pub(crate) props: Props,
}

/// Mutations recorded by the render phase, grouped by commit step.
#[derive(Debug)]
pub(crate) struct Effects<I, C, P> {
    pub(crate) deletions: Vec<(ParentRef<I, C>, I)>,
    pub(crate) resets: Vec<I>,
    pub(crate) placements: Vec<Placement<I, C>>,
    pub(crate) updates: Vec<Update<I, P>>,
    pub(crate) text_updates: Vec<TextUpdate<I>>,
    pub(crate) mounts: Vec<Mount<I>>,
    /// Roots of freshly mounted subtrees, detached until placed.
    pub(crate) fresh: Vec<I>,
    pub(crate) created: u32,
}

impl<I, C, P> Effects<I, C, P> {
    pub(crate) fn new() -> Self {
        Self {
            deletions: Vec::new(),
            resets: Vec::new(),
            placements: Vec::new(),
            updates: Vec::new(),
            text_updates: Vec::new(),
            mounts: Vec::new(),
            fresh: Vec::new(),
            created: 0,
        }
    }
}

pub(crate) type HostEffects<H> = Effects<
    <H as HostConfig>::Instance,
    <H as HostConfig>::Container,
    <H as HostConfig>::UpdatePayload,
>;

type HostParent<H> = ParentRef<<H as HostConfig>::Instance, <H as HostConfig>::Container>;

/// Diffs `children` against the committed fibers `old` of one parent and
/// returns the new fibers.
pub(crate) fn reconcile_children<H: HostConfig>(
    host: &mut H,
    parent: HostParent<H>,
    old: Vec<Fiber<H::Instance>>,
    children: &Value,
    context: &H::HostContext,
    effects: &mut HostEffects<H>,
) -> Vec<Fiber<H::Instance>> {
    let new_children = flatten(children);

    let mut old_slots = Vec::with_capacity(old.len());
    let mut by_key = BTreeMap::new();
    for (index, fiber) in old.into_iter().enumerate() {
        by_key.entry(fiber.key().clone()).or_insert(index);
        old_slots.push(Some(fiber));
    }

    let mut fibers = Vec::with_capacity(new_children.len());
    let mut needs_placement = Vec::with_capacity(new_children.len());
    let mut last_placed = 0;

    for child in new_children {
        let matched = by_key
            .remove(child.key())
            .and_then(|index| old_slots[index].take().map(|fiber| (index, fiber)));
        let (fiber, place) = match matched {
            Some((old_index, fiber)) => match try_update(host, fiber, child, context, effects) {
                Ok(fiber) if old_index < last_placed => (fiber, true),
                Ok(fiber) => {
                    last_placed = old_index;
                    (fiber, false)
                }
                Err((stale, child)) => {
                    effects.deletions.push((parent, stale.instance()));
                    (mount_fresh(host, child, context, effects), true)
                }
            },
            None => (mount_fresh(host, child, context, effects), true),
        };
        fibers.push(fiber);
        needs_placement.push(place);
    }

    for stale in old_slots.into_iter().flatten() {
        effects.deletions.push((parent, stale.instance()));
    }

    for index in (0..fibers.len()).rev() {
        if needs_placement[index] {
            effects.placements.push(Placement {
                parent,
                instance: fibers[index].instance(),
                before: fibers.get(index + 1).map(Fiber::instance),
            });
        }
    }

    fibers
}

fn mount_fresh<H: HostConfig>(
    host: &mut H,
    child: Child<'_>,
    context: &H::HostContext,
    effects: &mut HostEffects<H>,
) -> Fiber<H::Instance> {
    let fiber = mount(host, child, context, effects);
    effects.fresh.push(fiber.instance());
    fiber
}

/// Creates a detached instance tree for `child`.
fn mount<H: HostConfig>(
    host: &mut H,
    child: Child<'_>,
    context: &H::HostContext,
    effects: &mut HostEffects<H>,
) -> Fiber<H::Instance> {
    effects.created += 1;
    match child {
        Child::Text { key, text } => {
            let instance = host.create_text_instance(&text, context);
            Fiber::Text {
                key,
                text,
                instance,
            }
        }
        Child::Element { key, node } => {
            let text_content = host.should_set_text_content(&node.ty, &node.props);
            let mut children = Vec::new();
            if !text_content {
                let child_context = host.get_child_host_context(context, &node.ty);
                for grandchild in flatten(node.children()) {
                    children.push(mount(host, grandchild, &child_context, effects));
                }
            }

            let instance = host.create_instance(&node.ty, &node.props, context);
            for fiber in &children {
                host.append_initial_child(instance, fiber.instance());
            }
            if host.finalize_initial_children(instance, &node.ty, &node.props) {
                effects.mounts.push(Mount {
                    instance,
                    ty: node.ty.clone(),
                    props: node.props.clone(),
                });
            }

            Fiber::Host {
                key,
                ty: node.ty.clone(),
                props: node.props.clone(),
                instance,
                children,
                text_content,
            }
        }
    }
}

/// Reuses `fiber` for `child` if both are of the same kind and type.
///
/// On mismatch both are handed back so the caller can delete and remount.
fn try_update<'a, H: HostConfig>(
    host: &mut H,
    fiber: Fiber<H::Instance>,
    child: Child<'a>,
    context: &H::HostContext,
    effects: &mut HostEffects<H>,
) -> Result<Fiber<H::Instance>, (Fiber<H::Instance>, Child<'a>)> {
    match (fiber, child) {
        (Fiber::Text { instance, text: old, .. }, Child::Text { key, text }) => {
            if old != text {
                effects.text_updates.push(TextUpdate {
                    instance,
                    old,
                    new: text.clone(),
                });
            }
            Ok(Fiber::Text {
                key,
                text,
                instance,
            })
        }
        (
            Fiber::Host {
                ty,
                props: old_props,
                instance,
                children,
                text_content,
                ..
            },
            Child::Element { key, node },
        ) if ty == node.ty => {
            if props_changed(&old_props, &node.props)
                && let Some(payload) = host.prepare_update(instance, &ty, &old_props, &node.props)
            {
                effects.updates.push(Update {
                    instance,
                    payload,
                    ty: ty.clone(),
                    old_props,
                    new_props: node.props.clone(),
                });
            }

            let now_text_content = host.should_set_text_content(&ty, &node.props);
            if text_content && !now_text_content {
                effects.resets.push(instance);
            }

            let parent = ParentRef::Instance(instance);
            let children = if now_text_content {
                for stale in children {
                    effects.deletions.push((parent, stale.instance()));
                }
                Vec::new()
            } else {
                let child_context = host.get_child_host_context(context, &ty);
                reconcile_children(
                    host,
                    parent,
                    children,
                    node.children(),
                    &child_context,
                    effects,
                )
            };

            Ok(Fiber::Host {
                key,
                ty,
                props: node.props.clone(),
                instance,
                children,
                text_content: now_text_content,
            })
        }
        (fiber, child) => Err((fiber, child)),
    }
}

/// Compares two property mappings, ignoring children.
fn props_changed(old: &Props, new: &Props) -> bool {
    let not_children = |(key, _): &(&String, &Value)| key.as_str() != CHILDREN;
    old.iter().filter(not_children).ne(new.iter().filter(not_children))
}
