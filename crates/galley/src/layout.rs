//! Traversing a composed box tree.
//!
//! A renderer consumes a layout by walking the box tree and receiving
//! each box together with its position. The coordinate system has x
//! growing to the right and y growing towards the bottom of the page;
//! a box's position is the location of its reference point, on the
//! baseline at the left edge.
//!
//! Two traversals are provided: [read] visits every box, while
//! [read_partial] lets the visitor stop the walk early by returning
//! [Visit::Done]. Both visit a container box before its contents.

use crate::glue::Glue;
use crate::node::Node;

/// A position in the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pos {
    pub x: f32,
    pub y: f32,
}

impl Pos {
    pub fn new(x: f32, y: f32) -> Pos {
        Pos { x, y }
    }
}

/// Outcome of a partial visitor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Done,
}

/// Visits every box of the tree, with the root's baseline at
/// `y = height(root)`.
pub fn read<F: FnMut(&Node, Pos)>(visitor: F, root: &Node) {
    read_at(visitor, root, Pos::new(0.0, root.height()));
}

/// Visits every box of the tree, with the root at the given position.
pub fn read_at<F: FnMut(&Node, Pos)>(mut visitor: F, root: &Node, pos: Pos) {
    read_node(&mut visitor, root, pos);
}

/// Like [read], but the traversal halts as soon as the visitor returns
/// [Visit::Done].
pub fn read_partial<F: FnMut(&Node, Pos) -> Visit>(visitor: F, root: &Node) -> Visit {
    read_partial_at(visitor, root, Pos::new(0.0, root.height()))
}

/// Like [read_at], but the traversal halts as soon as the visitor
/// returns [Visit::Done].
pub fn read_partial_at<F: FnMut(&Node, Pos) -> Visit>(
    mut visitor: F,
    root: &Node,
    pos: Pos,
) -> Visit {
    read_node_partial(&mut visitor, root, pos)
}

/// The distance the layout cursor advances over a glue, given the
/// enclosing box's glue setting.
fn glue_advance(ratio: f32, order: crate::glue::GlueOrder, glue: &Glue) -> f32 {
    let mut advance = glue.space;
    if ratio < 0.0 {
        if order == glue.shrink_order && glue.shrink != 0.0 && ratio.is_finite() {
            advance += ratio * glue.shrink;
        }
    } else if order == glue.stretch_order && glue.stretch != 0.0 && ratio.is_finite() {
        advance += ratio * glue.stretch;
    }
    advance
}

fn read_node<F: FnMut(&Node, Pos)>(visitor: &mut F, node: &Node, pos: Pos) {
    match node {
        Node::HBox(b) => {
            visitor(node, pos);
            let mut x = pos.x;
            for child in &b.list {
                if child.is_box() {
                    let child_pos = Pos::new(x, pos.y + child.shift_amount());
                    read_node(visitor, child, child_pos);
                    x += child.width();
                } else if let Node::Kern(k) = child {
                    x += k.space;
                } else if let Node::Glue(g) = child {
                    x += glue_advance(b.glue_ratio, b.glue_order, g);
                }
            }
        }
        Node::VBox(b) => {
            visitor(node, pos);
            let mut y = pos.y - b.height;
            for child in &b.list {
                if child.is_box() {
                    y += child.height();
                    let child_pos = Pos::new(pos.x + child.shift_amount(), y);
                    read_node(visitor, child, child_pos);
                    y += child.depth();
                } else if let Node::Kern(k) = child {
                    y += k.space;
                } else if let Node::Glue(g) = child {
                    y += glue_advance(b.glue_ratio, b.glue_order, g);
                }
            }
        }
        Node::Char(_) | Node::Rule(_) => visitor(node, pos),
        _ => {}
    }
}

fn read_node_partial<F: FnMut(&Node, Pos) -> Visit>(
    visitor: &mut F,
    node: &Node,
    pos: Pos,
) -> Visit {
    match node {
        Node::HBox(b) => {
            if let Visit::Done = visitor(node, pos) {
                return Visit::Done;
            }
            let mut x = pos.x;
            for child in &b.list {
                if child.is_box() {
                    let child_pos = Pos::new(x, pos.y + child.shift_amount());
                    if let Visit::Done = read_node_partial(visitor, child, child_pos) {
                        return Visit::Done;
                    }
                    x += child.width();
                } else if let Node::Kern(k) = child {
                    x += k.space;
                } else if let Node::Glue(g) = child {
                    x += glue_advance(b.glue_ratio, b.glue_order, g);
                }
            }
            Visit::Continue
        }
        Node::VBox(b) => {
            if let Visit::Done = visitor(node, pos) {
                return Visit::Done;
            }
            let mut y = pos.y - b.height;
            for child in &b.list {
                if child.is_box() {
                    y += child.height();
                    let child_pos = Pos::new(pos.x + child.shift_amount(), y);
                    if let Visit::Done = read_node_partial(visitor, child, child_pos) {
                        return Visit::Done;
                    }
                    y += child.depth();
                } else if let Node::Kern(k) = child {
                    y += k.space;
                } else if let Node::Glue(g) = child {
                    y += glue_advance(b.glue_ratio, b.glue_order, g);
                }
            }
            Visit::Continue
        }
        Node::Char(_) | Node::Rule(_) => visitor(node, pos),
        _ => Visit::Continue,
    }
}
