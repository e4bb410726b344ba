//! Packing node lists into boxes.
//!
//! Packing computes the natural dimensions of a list, then solves the
//! glue-setting equation so that the box reaches its target size:
//! `target = natural + ratio * total(order)`, where `order` is the
//! highest order of infinity with a non-zero total on the active side.

use crate::glue::{GlueOrder, GlueTotals};
use crate::node::{HBox, Node, Rule, VBox};

/// Natural dimensions and elasticity of a node list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ListDims {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub stretch: GlueTotals,
    pub shrink: GlueTotals,
}

/// Measures a horizontal list.
///
/// The width is the sum of box widths, kerns and nominal glue widths.
/// The height and depth are the extremes over the boxes, adjusted by
/// their shift amounts. Running rule dimensions measure as zero.
pub fn hlist_dims(list: &[Node]) -> ListDims {
    let mut dims = ListDims::default();
    for node in list {
        dims.width += node.width();
        if node.is_box() {
            let shift = node.shift_amount();
            dims.height = dims.height.max(node.height() - shift);
            dims.depth = dims.depth.max(node.depth() + shift);
        }
        if let Node::Glue(g) = node {
            g.accumulate(&mut dims.shrink, &mut dims.stretch);
        }
    }
    dims
}

/// Measures a vertical list.
///
/// The width is the widest box, adjusted by shift amounts. The depth is
/// the depth of the final box, if the list ends with one; everything
/// else contributes to the height.
pub fn vlist_dims(list: &[Node]) -> ListDims {
    let mut dims = ListDims::default();
    let mut extent = 0.0;
    for node in list {
        if node.is_box() {
            let shift = node.shift_amount();
            dims.width = dims.width.max(node.width() + shift);
            extent += node.height() + node.depth();
        } else {
            extent += node.width();
        }
        if let Node::Glue(g) = node {
            g.accumulate(&mut dims.shrink, &mut dims.stretch);
        }
    }
    dims.depth = match list.last() {
        Some(last) if last.is_box() => last.depth(),
        _ => 0.0,
    };
    dims.height = extent - dims.depth;
    dims
}

/// Outcome of solving the glue-setting equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlueSetting {
    pub ratio: f32,
    pub order: GlueOrder,
}

/// Solves for the ratio by which glue of the active order must stretch
/// or shrink so that `natural` becomes `target`.
///
/// When the list has no elasticity on the required side the ratio is
/// infinite; the resulting box is over- or underfull and callers may
/// inspect [HBox::is_overfull].
pub fn set_glue(
    natural: f32,
    target: f32,
    stretch: &GlueTotals,
    shrink: &GlueTotals,
) -> GlueSetting {
    if target > natural {
        let order = stretch.order();
        let total = stretch.get(order);
        if total > 0.0 {
            GlueSetting {
                ratio: (target - natural) / total,
                order,
            }
        } else {
            GlueSetting {
                ratio: f32::INFINITY,
                order: GlueOrder::Normal,
            }
        }
    } else if target < natural {
        let order = shrink.order();
        let total = shrink.get(order);
        if total > 0.0 {
            GlueSetting {
                ratio: (target - natural) / total,
                order,
            }
        } else {
            GlueSetting {
                ratio: f32::NEG_INFINITY,
                order: GlueOrder::Normal,
            }
        }
    } else {
        GlueSetting {
            ratio: 0.0,
            order: GlueOrder::Normal,
        }
    }
}

/// Packs a horizontal list into a box of the given width.
pub fn hbox_to_width(mut list: Vec<Node>, target: f32) -> HBox {
    let dims = hlist_dims(&list);
    let setting = set_glue(dims.width, target, &dims.stretch, &dims.shrink);
    solve_running_rules(&mut list, None, Some((dims.height, dims.depth)));
    HBox {
        width: target,
        height: dims.height,
        depth: dims.depth,
        shift_amount: 0.0,
        list,
        glue_ratio: setting.ratio,
        glue_order: setting.order,
    }
}

/// Packs a horizontal list at its natural width.
pub fn hbox_natural(mut list: Vec<Node>) -> HBox {
    let dims = hlist_dims(&list);
    solve_running_rules(&mut list, None, Some((dims.height, dims.depth)));
    HBox {
        width: dims.width,
        height: dims.height,
        depth: dims.depth,
        shift_amount: 0.0,
        list,
        glue_ratio: 0.0,
        glue_order: GlueOrder::Normal,
    }
}

/// Packs a vertical list into a box of the given height.
pub fn vbox_to_height(mut list: Vec<Node>, target: f32) -> VBox {
    let dims = vlist_dims(&list);
    let setting = set_glue(dims.height, target, &dims.stretch, &dims.shrink);
    solve_running_rules(&mut list, Some(dims.width), None);
    VBox {
        width: dims.width,
        height: target,
        depth: dims.depth,
        shift_amount: 0.0,
        list,
        glue_ratio: setting.ratio,
        glue_order: setting.order,
    }
}

/// Packs a vertical list at its natural height.
pub fn vbox_natural(mut list: Vec<Node>) -> VBox {
    let dims = vlist_dims(&list);
    solve_running_rules(&mut list, Some(dims.width), None);
    VBox {
        width: dims.width,
        height: dims.height,
        depth: dims.depth,
        shift_amount: 0.0,
        list,
        glue_ratio: 0.0,
        glue_order: GlueOrder::Normal,
    }
}

/// Replaces running rule dimensions with the enclosing box's dimensions.
fn solve_running_rules(list: &mut [Node], width: Option<f32>, height_depth: Option<(f32, f32)>) {
    for node in list {
        if let Node::Rule(rule) = node {
            if let Some(w) = width {
                if Rule::is_running(rule.width) {
                    rule.width = w;
                }
            }
            if let Some((h, d)) = height_depth {
                if Rule::is_running(rule.height) {
                    rule.height = h;
                }
                if Rule::is_running(rule.depth) {
                    rule.depth = d;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Font;
    use crate::glue::Glue;
    use crate::node::{CharBox, Kern, Penalty};

    fn char_box(width: f32) -> Node {
        Node::Char(CharBox {
            char: 'x',
            font: Font(0),
            width,
            height: 7.0,
            depth: 3.0,
            italic_correction: 0.0,
        })
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn natural_width_sums_boxes_glue_and_kerns() {
        let list = vec![
            char_box(10.0),
            Node::Glue(Glue::new(5.0, 2.0, 1.0)),
            Node::Kern(Kern::new(2.0)),
            char_box(10.0),
            Node::Penalty(Penalty::new(0)),
        ];
        let dims = hlist_dims(&list);
        assert_close(dims.width, 27.0);
        assert_close(dims.height, 7.0);
        assert_close(dims.depth, 3.0);
        assert_close(dims.stretch.normal, 2.0);
        assert_close(dims.shrink.normal, 1.0);
    }

    #[test]
    fn stretching_solves_the_glue_equation() {
        let list = vec![
            char_box(10.0),
            Node::Glue(Glue::new(5.0, 3.0, 2.0)),
            char_box(10.0),
        ];
        let b = hbox_to_width(list, 30.0);
        // natural width 25, stretch 3
        assert_close(b.glue_ratio, 5.0 / 3.0);
        assert_eq!(b.glue_order, GlueOrder::Normal);
        assert_close(25.0 + b.glue_ratio * 3.0, b.width);
        assert!(!b.is_overfull());
    }

    #[test]
    fn shrinking_produces_a_negative_ratio() {
        let list = vec![
            char_box(10.0),
            Node::Glue(Glue::new(5.0, 3.0, 2.0)),
            char_box(10.0),
        ];
        let b = hbox_to_width(list, 24.0);
        assert_close(b.glue_ratio, -0.5);
        assert_close(25.0 + b.glue_ratio * 2.0, b.width);
    }

    #[test]
    fn overfull_box_when_shrink_is_exhausted() {
        let list = vec![
            char_box(10.0),
            Node::Glue(Glue::new(5.0, 3.0, 2.0)),
            char_box(10.0),
        ];
        let b = hbox_to_width(list, 20.0);
        // needs 5pt of shrink but only 2pt exist
        assert!(b.glue_ratio < -1.0);
        assert!(b.is_overfull());
    }

    #[test]
    fn infinite_glue_monopolizes_the_set() {
        let list = vec![
            char_box(10.0),
            Node::Glue(Glue::new(0.0, 4.0, 0.0)),
            Node::Glue(Glue::with_orders(
                0.0,
                1.0,
                GlueOrder::Fil,
                0.0,
                GlueOrder::Normal,
            )),
            char_box(10.0),
        ];
        let b = hbox_to_width(list, 50.0);
        assert_eq!(b.glue_order, GlueOrder::Fil);
        assert_close(b.glue_ratio, 30.0);
    }

    #[test]
    fn rigid_list_with_no_stretch_is_underfull() {
        let list = vec![char_box(10.0), Node::Kern(Kern::new(5.0)), char_box(10.0)];
        let b = hbox_to_width(list, 40.0);
        assert!(b.glue_ratio.is_infinite());
        assert!(b.is_overfull());
    }

    #[test]
    fn running_rule_dimensions_are_solved_by_the_container() {
        let list = vec![
            char_box(10.0),
            Node::Rule(crate::node::Rule {
                width: 0.4,
                ..crate::node::Rule::new()
            }),
        ];
        let b = hbox_natural(list);
        match &b.list[1] {
            Node::Rule(r) => {
                assert_close(r.height, 7.0);
                assert_close(r.depth, 3.0);
                assert_close(r.width, 0.4);
            }
            _ => panic!("expected a rule"),
        }
    }

    #[test]
    fn vlist_depth_comes_from_the_last_box() {
        let line = |h, d| {
            Node::HBox(HBox {
                width: 20.0,
                height: h,
                depth: d,
                ..HBox::new_null_box()
            })
        };
        let list = vec![line(7.0, 3.0), Node::Glue(Glue::fixed(2.0)), line(6.0, 4.0)];
        let dims = vlist_dims(&list);
        assert_close(dims.depth, 4.0);
        assert_close(dims.height, 7.0 + 3.0 + 2.0 + 6.0);
        assert_close(dims.width, 20.0);
    }
}
