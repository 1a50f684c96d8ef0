// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal in-memory widget tree used by the unit tests.
//!
//! Every widget is positioned in window coordinates, so `window_position` is
//! simply the stored position. Slots are never reused, which keeps destroyed
//! ids stale forever.

use alloc::vec::Vec;
use core::time::Duration;

use kurbo::{Point, Rect, Size};

use crate::tree::{Placement, WidgetTree};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Wid(usize);

#[derive(Debug)]
struct Node {
    parent: Option<Wid>,
    children: Vec<Wid>,
    placement: Placement,
}

#[derive(Debug)]
pub(crate) struct TestTree {
    nodes: Vec<Option<Node>>,
    overlay: Wid,
    pub(crate) animations: Vec<(Wid, Point, Duration)>,
    pub(crate) spacers_created: usize,
}

impl TestTree {
    pub(crate) fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            overlay: Wid(0),
            animations: Vec::new(),
            spacers_created: 0,
        };
        tree.overlay = tree.spawn(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        tree
    }

    /// Create a detached widget covering `rect`.
    pub(crate) fn spawn(&mut self, rect: Rect) -> Wid {
        let id = Wid(self.nodes.len());
        self.nodes.push(Some(Node {
            parent: None,
            children: Vec::new(),
            placement: Placement {
                pos: rect.origin(),
                size: rect.size(),
                ..Placement::default()
            },
        }));
        id
    }

    /// Create a widget covering `rect` and append it under `parent`.
    pub(crate) fn spawn_in(&mut self, parent: Wid, rect: Rect) -> Wid {
        let id = self.spawn(rect);
        let len = self.node(parent).children.len();
        self.insert_child(parent, id, len);
        id
    }

    pub(crate) fn destroy(&mut self, widget: Wid) {
        if let Some(parent) = self.parent(widget) {
            self.remove_child(parent, widget);
        }
        let children = self.node(widget).children.clone();
        for child in children {
            self.node_mut(child).parent = None;
        }
        self.nodes[widget.0] = None;
    }

    pub(crate) fn set_pos(&mut self, widget: Wid, pos: Point) {
        self.node_mut(widget).placement.pos = pos;
    }

    fn node(&self, widget: Wid) -> &Node {
        self.nodes[widget.0].as_ref().expect("widget is alive")
    }

    fn node_mut(&mut self, widget: Wid) -> &mut Node {
        self.nodes[widget.0].as_mut().expect("widget is alive")
    }
}

impl WidgetTree for TestTree {
    type Id = Wid;

    fn overlay(&self) -> Wid {
        self.overlay
    }

    fn is_alive(&self, widget: Wid) -> bool {
        self.nodes.get(widget.0).is_some_and(Option::is_some)
    }

    fn parent(&self, widget: Wid) -> Option<Wid> {
        self.node(widget).parent
    }

    fn children(&self, widget: Wid) -> Vec<Wid> {
        self.node(widget).children.clone()
    }

    fn insert_child(&mut self, parent: Wid, child: Wid, index: usize) {
        assert!(
            self.node(child).parent.is_none(),
            "child must be detached before insertion"
        );
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    fn remove_child(&mut self, parent: Wid, child: Wid) {
        self.node_mut(parent).children.retain(|&c| c != child);
        self.node_mut(child).parent = None;
    }

    fn placement(&self, widget: Wid) -> Placement {
        self.node(widget).placement.clone()
    }

    fn set_placement(&mut self, widget: Wid, placement: Placement) {
        self.node_mut(widget).placement = placement;
    }

    fn window_position(&self, widget: Wid) -> Point {
        self.node(widget).placement.pos
    }

    fn collides(&self, widget: Wid, point: Point) -> bool {
        let placement = &self.node(widget).placement;
        let rect = Rect::from_origin_size(placement.pos, placement.size);
        point.x >= rect.x0 && point.x < rect.x1 && point.y >= rect.y0 && point.y < rect.y1
    }

    fn create_spacer(&mut self) -> Wid {
        self.spacers_created += 1;
        self.spawn(Rect::from_origin_size(Point::ZERO, Size::new(50.0, 50.0)))
    }

    fn animate_position(&mut self, widget: Wid, to: Point, duration: Duration) {
        self.animations.push((widget, to, duration));
        self.set_pos(widget, to);
    }
}
