//! Breaking a paragraph into lines.
//!
//! The paragraph builder implements the optimal-fit algorithm: it keeps
//! a set of active breakpoints, extends each of them with every legal
//! break position whose glue ratio is acceptable, scores the resulting
//! lines with demerits, and finally walks back the cheapest chain of
//! breakpoints. Each active breakpoint remembers the running totals of
//! width, stretch and shrink at its position, so the measure of a
//! candidate line is a pair of subtractions.
//!
//! Breaks are legal at a glue following a box and at any penalty below
//! the infinite threshold. A penalty at or below [Penalty::EJECT]
//! forces a break and deactivates every breakpoint that cannot reach
//! it.

use crate::glue::{Glue, GlueOrder, GlueTotals};
use crate::node::{HBox, Kern, Node, Penalty};
use crate::pack;

/// Glue ratio reported when a line has no elasticity on the required
/// side. It is far beyond any sane tolerance, so such lines are never
/// feasible.
const INFINITE_RATIO: f32 = Penalty::INFINITE as f32;

/// One row of a parshape: an explicit indent and length for a line.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParshapeLine {
    pub indent: f32,
    pub length: f32,
}

/// Per-line geometry of a non-rectangular paragraph. The last row
/// applies to every line past the end of the table.
pub type Parshape = Vec<ParshapeLine>;

/// Coarse classification of a line's glue ratio.
///
/// Adjacent lines whose classes differ by more than one step are
/// visually jarring and are penalized with `adjdemerits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitnessClass {
    Tight,
    Decent,
    Loose,
    VeryLoose,
}

impl FitnessClass {
    pub fn of_ratio(ratio: f32) -> FitnessClass {
        if ratio < -0.5 {
            FitnessClass::Tight
        } else if ratio <= 0.5 {
            FitnessClass::Decent
        } else if ratio <= 1.0 {
            FitnessClass::Loose
        } else {
            FitnessClass::VeryLoose
        }
    }

    /// Classification from the ratio and the badness it produced.
    pub fn of_badness(ratio: f32, badness: i64) -> FitnessClass {
        if badness >= 13 {
            if ratio < 0.0 {
                FitnessClass::Tight
            } else if badness < 100 {
                FitnessClass::Loose
            } else {
                FitnessClass::VeryLoose
            }
        } else {
            FitnessClass::Decent
        }
    }

    pub fn compatible(a: FitnessClass, b: FitnessClass) -> bool {
        (a.index() as i32 - b.index() as i32).abs() <= 1
    }

    fn index(self) -> usize {
        match self {
            FitnessClass::Tight => 0,
            FitnessClass::Decent => 1,
            FitnessClass::Loose => 2,
            FitnessClass::VeryLoose => 3,
        }
    }

    fn from_index(i: usize) -> FitnessClass {
        match i {
            0 => FitnessClass::Tight,
            1 => FitnessClass::Decent,
            2 => FitnessClass::Loose,
            _ => FitnessClass::VeryLoose,
        }
    }
}

/// Running totals of width and elasticity over a prefix of the list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub width: f32,
    pub stretch: GlueTotals,
    pub shrink: GlueTotals,
}

/// A feasible breakpoint.
///
/// Breakpoints form a tree through their `previous` indices into the
/// arena built during the pass; the chosen chain is read back from the
/// cheapest final breakpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    /// Index into the horizontal list of the node broken at.
    pub position: usize,
    /// Total demerits of the chain ending here.
    pub demerits: i64,
    /// Number of lines produced so far; this breakpoint ends line
    /// `line - 1`.
    pub line: usize,
    pub fitness: FitnessClass,
    /// Totals at this position, with the discardables that a break here
    /// would drop already counted.
    pub totals: Totals,
    /// Arena index of the breakpoint starting the line this one ends.
    pub previous: Option<usize>,
}

/// Error returned when no chain of acceptable lines exists.
///
/// The paragraph and the list are left untouched; callers typically
/// retry with a larger tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoFeasibleBreakpoints;

impl std::fmt::Display for NoFeasibleBreakpoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no feasible breakpoints: every line exceeds the tolerance")
    }
}

impl std::error::Error for NoFeasibleBreakpoints {}

/// Badness of a line set with the given glue ratio: `100 |r|^3`,
/// saturated at 10 000.
pub fn compute_badness(ratio: f32) -> i64 {
    let b = (100.0 * (ratio.abs() as f64).powi(3)) as i64;
    b.min(10_000)
}

/// Demerits of a single line from the line penalty, the line's badness
/// and the penalty at its breakpoint.
pub fn compute_demerits(linepenalty: i64, badness: i64, penalty: i32) -> i64 {
    let base = (linepenalty + badness) * (linepenalty + badness);
    let p = penalty as i64;
    if penalty >= 0 && penalty < Penalty::INFINITE {
        base + p * p
    } else if penalty > Penalty::EJECT && penalty < 0 {
        base - p * p
    } else {
        base
    }
}

fn is_forced_break(node: &Node) -> bool {
    matches!(node, Node::Penalty(p) if p.value <= Penalty::EJECT)
}

fn is_forbidden_break(node: &Node) -> bool {
    matches!(node, Node::Penalty(p) if p.value >= Penalty::INFINITE)
}

#[derive(Clone, Copy)]
struct Candidate {
    previous: usize,
    demerits: i64,
}

/// Configuration of a paragraph and the entry points for breaking one.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// Target line width.
    pub hsize: f32,
    /// Largest acceptable glue ratio.
    pub tolerance: f32,
    /// Added to every line's badness before squaring.
    pub linepenalty: i64,
    /// Added when adjacent lines differ by more than one fitness class.
    pub adjdemerits: i64,
    pub hangindent: f32,
    pub hangafter: i32,
    /// Overrides `hangindent` when non-empty.
    pub parshape: Parshape,
    pub leftskip: Glue,
    pub rightskip: Glue,
    pub baselineskip: Glue,
    pub lineskip: Glue,
    pub lineskiplimit: f32,
    pub parfillskip: Glue,
    /// Depth of the material preceding this paragraph.
    pub prevdepth: f32,
}

impl Paragraph {
    pub fn new(hsize: f32) -> Paragraph {
        Paragraph {
            hsize,
            tolerance: 200.0,
            linepenalty: 10,
            adjdemerits: 10_000,
            hangindent: 0.0,
            hangafter: 1,
            parshape: Vec::new(),
            leftskip: Glue::fixed(0.0),
            rightskip: Glue::fixed(0.0),
            baselineskip: Glue::fixed(12.0),
            lineskip: Glue::fixed(3.0),
            lineskiplimit: 2.0,
            parfillskip: Glue::with_orders(0.0, 1.0, GlueOrder::Fil, 0.0, GlueOrder::Normal),
            prevdepth: 0.0,
        }
    }

    pub fn hangindent_applies_to_line(&self, n: usize) -> bool {
        let n = n as i32;
        (self.hangafter < 0 && n < -self.hangafter) || (self.hangafter >= 0 && self.hangafter <= n)
    }

    /// The length of line `n`, taking the parshape and hanging
    /// indentation into account.
    pub fn line_length(&self, n: usize) -> f32 {
        if !self.parshape.is_empty() {
            return self.parshape[n.min(self.parshape.len() - 1)].length;
        }
        if self.hangindent != 0.0 && self.hangindent_applies_to_line(n) {
            return self.hsize - self.hangindent.abs();
        }
        self.hsize
    }

    /// Terminates a horizontal list so that it can be broken: a
    /// forbidden break, the paragraph-filling glue, and a forced break.
    pub fn prepare(&self, hlist: &mut Vec<Node>) {
        if hlist.is_empty() {
            return;
        }
        if matches!(hlist.last(), Some(Node::Glue(_))) {
            hlist.pop();
        }
        hlist.push(Node::Penalty(Penalty::infinite()));
        hlist.push(Node::Glue(self.parfillskip));
        hlist.push(Node::Penalty(Penalty::eject()));
    }

    /// Breaks the list into lines and assembles them into a vertical
    /// list with interline glue.
    pub fn create(&self, hlist: &[Node]) -> Result<Vec<Node>, NoFeasibleBreakpoints> {
        if hlist.is_empty() {
            return Ok(Vec::new());
        }
        let breakpoints = self.compute_breakpoints(hlist)?;
        Ok(self.create_with_breakpoints(hlist, &breakpoints))
    }

    /// Like [Paragraph::create] with a precomputed breakpoint chain.
    pub fn create_with_breakpoints(&self, hlist: &[Node], breakpoints: &[Breakpoint]) -> Vec<Node> {
        let mut result = Vec::new();
        let mut prevdepth = self.prevdepth;
        let mut begin = 0;
        let mut chain = breakpoints.iter().skip(1).peekable();
        while let Some(bp) = chain.next() {
            let line = self.create_line(bp.line - 1, &hlist[begin..bp.position]);
            VListBuilder::push_back(
                &mut result,
                line,
                &mut prevdepth,
                &self.baselineskip,
                &self.lineskip,
                self.lineskiplimit,
            );
            begin = bp.position;
            if chain.peek().is_some() {
                while begin < hlist.len() && hlist[begin].is_discardable() {
                    begin += 1;
                }
            }
        }
        result
    }

    /// The chain of breakpoints with the least total demerits.
    ///
    /// The first element is the start of the list; element `k`
    /// terminates line `k - 1`.
    pub fn compute_breakpoints(
        &self,
        hlist: &[Node],
    ) -> Result<Vec<Breakpoint>, NoFeasibleBreakpoints> {
        let (arena, active) = self.compute_feasible_breakpoints(hlist);
        let best = active
            .iter()
            .copied()
            .min_by_key(|&i| arena[i].demerits)
            .ok_or(NoFeasibleBreakpoints)?;
        let mut chain = Vec::new();
        let mut cursor = Some(best);
        while let Some(i) = cursor {
            chain.push(arena[i].clone());
            cursor = arena[i].previous;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Runs the pass over the list, returning the breakpoint arena and
    /// the breakpoints still active at the end.
    fn compute_feasible_breakpoints(&self, hlist: &[Node]) -> (Vec<Breakpoint>, Vec<usize>) {
        let mut arena = vec![Breakpoint {
            position: 0,
            demerits: 0,
            line: 0,
            fitness: FitnessClass::Tight,
            totals: Totals::default(),
            previous: None,
        }];
        let mut active = vec![0];
        let mut sum = Totals::default();
        let mut prev_is_box = false;
        for (position, node) in hlist.iter().enumerate() {
            match node {
                n if n.is_box() => {
                    sum.width += n.width();
                }
                Node::Glue(g) => {
                    if prev_is_box {
                        self.try_break(&mut arena, &mut active, hlist, position, &sum);
                    }
                    sum.width += g.space;
                    g.accumulate(&mut sum.shrink, &mut sum.stretch);
                }
                Node::Kern(k) => {
                    sum.width += k.space;
                }
                n @ Node::Penalty(_) if !is_forbidden_break(n) => {
                    self.try_break(&mut arena, &mut active, hlist, position, &sum);
                }
                _ => {}
            }
            prev_is_box = node.is_box();
        }
        (arena, active)
    }

    /// Attempts a break at `position` against every active breakpoint.
    ///
    /// Active breakpoints are grouped by line number; within each group
    /// only the best candidate per fitness class survives as a new
    /// breakpoint. Breakpoints that the current position can no longer
    /// reach (ratio below -1), and all of them at a forced break, are
    /// deactivated first; the deactivated breakpoint may still be the
    /// predecessor of a candidate computed in the same step.
    fn try_break(
        &self,
        arena: &mut Vec<Breakpoint>,
        active: &mut Vec<usize>,
        hlist: &[Node],
        position: usize,
        sum: &Totals,
    ) {
        let node = &hlist[position];
        let forced = is_forced_break(node);
        let penalty_value = match node {
            Node::Penalty(p) => p.value,
            _ => 0,
        };
        let mut new_active: Vec<usize> = Vec::with_capacity(active.len());
        let mut idx = 0;
        while idx < active.len() {
            let current_line = arena[active[idx]].line;
            let mut candidates: [Option<Candidate>; 4] = [None; 4];
            while idx < active.len() && arena[active[idx]].line == current_line {
                let b = active[idx];
                let ratio = self.compute_glue_ratio(sum, &arena[b], current_line);
                if !(ratio < -1.0 || forced) {
                    new_active.push(b);
                }
                if ratio >= -1.0 && ratio <= self.tolerance {
                    let badness = compute_badness(ratio);
                    let mut d = compute_demerits(self.linepenalty, badness, penalty_value);
                    let fc = FitnessClass::of_ratio(ratio);
                    if !FitnessClass::compatible(fc, arena[b].fitness) {
                        d += self.adjdemerits;
                    }
                    d += arena[b].demerits;
                    let slot = &mut candidates[fc.index()];
                    if slot.map_or(true, |c| d < c.demerits) {
                        *slot = Some(Candidate {
                            previous: b,
                            demerits: d,
                        });
                    }
                }
                idx += 1;
            }
            let local_sum = self.squeeze_discardables(*sum, hlist, position);
            for (i, candidate) in candidates.iter().enumerate() {
                if let Some(c) = candidate {
                    arena.push(Breakpoint {
                        position,
                        demerits: c.demerits,
                        line: current_line + 1,
                        fitness: FitnessClass::from_index(i),
                        totals: local_sum,
                        previous: Some(c.previous),
                    });
                    new_active.push(arena.len() - 1);
                }
            }
        }
        *active = new_active;
    }

    /// The glue ratio of the line running from `b` to the position the
    /// caller accumulated `sum` for.
    fn compute_glue_ratio(&self, sum: &Totals, b: &Breakpoint, current_line: usize) -> f32 {
        let mut width = sum.width - b.totals.width;
        width -= self.leftskip.space + self.rightskip.space;
        let line_length = self.line_length(current_line);
        if width < line_length {
            let diff = sum.stretch + skip_totals(&self.leftskip, &self.rightskip).0 - b.totals.stretch;
            if diff.order() != GlueOrder::Normal {
                return 0.0;
            }
            if diff.normal > 0.0 {
                (line_length - width) / diff.normal
            } else {
                INFINITE_RATIO
            }
        } else if width > line_length {
            let diff = sum.shrink + skip_totals(&self.leftskip, &self.rightskip).1 - b.totals.shrink;
            if diff.order() != GlueOrder::Normal {
                return 0.0;
            }
            if diff.normal > 0.0 {
                (line_length - width) / diff.normal
            } else {
                INFINITE_RATIO
            }
        } else {
            0.0
        }
    }

    /// Totals from a break position forward to the next box or forced
    /// break. Discardables at the start of a line are dropped, so a new
    /// breakpoint's totals must already include them.
    fn squeeze_discardables(&self, mut sum: Totals, hlist: &[Node], from: usize) -> Totals {
        for (i, node) in hlist.iter().enumerate().skip(from) {
            match node {
                Node::Glue(g) => {
                    sum.width += g.space;
                    g.accumulate(&mut sum.shrink, &mut sum.stretch);
                }
                Node::Kern(k) => {
                    sum.width += k.space;
                }
                n if n.is_box() => break,
                n if i != from && is_forced_break(n) => break,
                _ => {}
            }
        }
        sum
    }

    /// Builds the hbox for line `linenum` from a slice of the list,
    /// adding the margin skips and any indentation kerns.
    fn create_line(&self, linenum: usize, slice: &[Node]) -> HBox {
        let mut list: Vec<Node> = Vec::with_capacity(slice.len() + 3);
        if !self.parshape.is_empty() {
            let row = self.parshape[linenum.min(self.parshape.len() - 1)];
            list.push(Node::Kern(Kern::new(row.indent)));
            list.push(Node::Glue(self.leftskip));
            list.extend_from_slice(slice);
            list.push(Node::Glue(self.rightskip));
            pack::hbox_to_width(list, self.line_length(linenum))
        } else if self.hangindent != 0.0 && self.hangindent_applies_to_line(linenum) {
            if self.hangindent > 0.0 {
                list.push(Node::Kern(Kern::new(self.hangindent)));
            }
            list.push(Node::Glue(self.leftskip));
            list.extend_from_slice(slice);
            list.push(Node::Glue(self.rightskip));
            if self.hangindent < 0.0 {
                list.push(Node::Kern(Kern::new(self.hangindent.abs())));
            }
            pack::hbox_to_width(list, self.line_length(linenum) + self.hangindent.abs())
        } else {
            list.push(Node::Glue(self.leftskip));
            list.extend_from_slice(slice);
            list.push(Node::Glue(self.rightskip));
            pack::hbox_to_width(list, self.line_length(linenum))
        }
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Paragraph::new(0.0)
    }
}

fn skip_totals(leftskip: &Glue, rightskip: &Glue) -> (GlueTotals, GlueTotals) {
    let mut stretch = GlueTotals::default();
    let mut shrink = GlueTotals::default();
    leftskip.accumulate(&mut shrink, &mut stretch);
    rightskip.accumulate(&mut shrink, &mut stretch);
    (stretch, shrink)
}

/// Appends lines to a vertical list, inserting the interline glue
/// demanded by the baselineskip policy.
pub struct VListBuilder;

impl VListBuilder {
    /// Pushes `line` onto `result` behind its interline glue.
    ///
    /// When the gap between the previous baseline and this line's top
    /// would be at least `lineskiplimit`, the glue tops up the
    /// baseline-to-baseline distance to `baselineskip`; otherwise
    /// `lineskip` separates the boxes directly.
    pub fn push_back(
        result: &mut Vec<Node>,
        line: HBox,
        prevdepth: &mut f32,
        baselineskip: &Glue,
        lineskip: &Glue,
        lineskiplimit: f32,
    ) {
        let needed = baselineskip.space - *prevdepth - line.height;
        if needed >= lineskiplimit {
            result.push(Node::Glue(Glue {
                space: needed,
                ..*baselineskip
            }));
        } else {
            result.push(Node::Glue(*lineskip));
        }
        *prevdepth = line.depth;
        result.push(Node::HBox(line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Font;
    use crate::node::CharBox;

    fn char_box(width: f32) -> Node {
        Node::Char(CharBox {
            char: 'm',
            font: Font(0),
            width,
            height: 7.0,
            depth: 3.0,
            italic_correction: 0.0,
        })
    }

    fn word_list(chars: usize, glue: Glue) -> Vec<Node> {
        let mut list = Vec::new();
        for i in 0..chars {
            if i > 0 {
                list.push(Node::Glue(glue));
            }
            list.push(char_box(10.0));
        }
        list
    }

    fn lines_of(vlist: &[Node]) -> Vec<&HBox> {
        vlist
            .iter()
            .filter_map(|n| match n {
                Node::HBox(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_list_produces_an_empty_vertical_list() {
        let paragraph = Paragraph::new(100.0);
        assert_eq!(paragraph.create(&[]).unwrap(), Vec::new());
    }

    #[test]
    fn prepare_terminates_the_list() {
        let paragraph = Paragraph::new(100.0);
        let mut hlist = vec![char_box(10.0), Node::Glue(Glue::new(5.0, 2.0, 1.0))];
        paragraph.prepare(&mut hlist);
        // trailing glue dropped, then: forbidden break, parfillskip, forced break
        assert_eq!(hlist.len(), 4);
        assert!(matches!(&hlist[1], Node::Penalty(p) if p.value >= Penalty::INFINITE));
        assert!(matches!(&hlist[2], Node::Glue(g) if g.stretch_order == GlueOrder::Fil));
        assert!(matches!(&hlist[3], Node::Penalty(p) if p.value <= Penalty::EJECT));
    }

    #[test]
    fn single_forced_break_produces_exactly_one_line() {
        let paragraph = Paragraph::new(10.0);
        let hlist = vec![char_box(10.0), Node::Penalty(Penalty::eject())];
        let vlist = paragraph.create(&hlist).unwrap();
        let lines = lines_of(&vlist);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 10.0);
    }

    #[test]
    fn unbreakable_list_with_zero_tolerance_is_infeasible() {
        let mut paragraph = Paragraph::new(10.0);
        paragraph.tolerance = 0.0;
        let hlist = vec![
            char_box(10.0),
            char_box(10.0),
            char_box(10.0),
            Node::Penalty(Penalty::eject()),
        ];
        assert_eq!(
            paragraph.compute_breakpoints(&hlist),
            Err(NoFeasibleBreakpoints)
        );
    }

    #[test]
    fn fifty_character_paragraph_breaks_into_even_lines() {
        let paragraph = Paragraph::new(200.0);
        let mut hlist = word_list(50, Glue::new(5.0, 2.0, 1.0));
        paragraph.prepare(&mut hlist);

        let breakpoints = paragraph.compute_breakpoints(&hlist).unwrap();
        assert_eq!(breakpoints[0].position, 0);
        assert_eq!(breakpoints[0].line, 0);
        for (k, bp) in breakpoints.iter().enumerate() {
            assert_eq!(bp.line, k);
        }
        // demerits accumulate monotonically along the chosen chain
        for pair in breakpoints.windows(2) {
            assert!(pair[1].demerits >= pair[0].demerits);
        }
        // the final breakpoint is the terminating forced break
        assert_eq!(breakpoints.last().unwrap().position, hlist.len() - 1);

        let vlist = paragraph.create_with_breakpoints(&hlist, &breakpoints);
        let lines = lines_of(&vlist);
        assert_eq!(lines.len(), breakpoints.len() - 1);
        assert!((3..=5).contains(&lines.len()), "got {} lines", lines.len());
        for line in &lines {
            assert_eq!(line.width, 200.0);
            assert!(!line.is_overfull());
            assert!(line.glue_ratio >= -1.0);
            assert!(line.glue_ratio <= paragraph.tolerance);
        }
    }

    #[test]
    fn breaking_is_idempotent_on_its_own_lines() {
        let paragraph = Paragraph::new(200.0);
        let mut hlist = word_list(50, Glue::new(5.0, 2.0, 1.0));
        paragraph.prepare(&mut hlist);
        let vlist = paragraph.create(&hlist).unwrap();
        for line in lines_of(&vlist) {
            // re-measuring a produced line reproduces its glue setting
            let dims = pack::hlist_dims(&line.list);
            let setting = pack::set_glue(dims.width, line.width, &dims.stretch, &dims.shrink);
            assert!((setting.ratio - line.glue_ratio).abs() < 1e-4);
            assert_eq!(setting.order, line.glue_order);
        }
    }

    #[test]
    fn hanging_indentation_applies_per_hangafter() {
        let mut paragraph = Paragraph::new(100.0);
        paragraph.hangindent = 20.0;
        paragraph.hangafter = 0;
        // hangafter = 0: every line hangs
        for n in 0..4 {
            assert_eq!(paragraph.line_length(n), 80.0);
        }
        paragraph.hangafter = 2;
        assert_eq!(paragraph.line_length(0), 100.0);
        assert_eq!(paragraph.line_length(1), 100.0);
        assert_eq!(paragraph.line_length(2), 80.0);
        paragraph.hangafter = -1;
        assert_eq!(paragraph.line_length(0), 80.0);
        assert_eq!(paragraph.line_length(1), 100.0);
    }

    #[test]
    fn parshape_overrides_the_line_length() {
        let mut paragraph = Paragraph::new(100.0);
        paragraph.parshape = vec![
            ParshapeLine {
                indent: 10.0,
                length: 50.0,
            },
            ParshapeLine {
                indent: 0.0,
                length: 90.0,
            },
        ];
        assert_eq!(paragraph.line_length(0), 50.0);
        assert_eq!(paragraph.line_length(1), 90.0);
        // rows past the end repeat the last row
        assert_eq!(paragraph.line_length(7), 90.0);
    }

    #[test]
    fn hanging_lines_carry_an_indentation_kern() {
        let mut paragraph = Paragraph::new(60.0);
        paragraph.hangindent = 15.0;
        paragraph.hangafter = 0;
        let mut hlist = word_list(4, Glue::new(5.0, 3.0, 1.0));
        paragraph.prepare(&mut hlist);
        let vlist = paragraph.create(&hlist).unwrap();
        let lines = lines_of(&vlist);
        assert!(!lines.is_empty());
        for line in lines {
            assert!(matches!(&line.list[0], Node::Kern(k) if k.space == 15.0));
            // the kern widens the target back to the full measure
            assert_eq!(line.width, 60.0);
        }
    }

    #[test]
    fn badness_saturates() {
        assert_eq!(compute_badness(0.0), 0);
        assert_eq!(compute_badness(1.0), 100);
        assert_eq!(compute_badness(-1.0), 100);
        assert_eq!(compute_badness(0.5), 12);
        assert_eq!(compute_badness(100.0), 10_000);
    }

    #[test]
    fn demerits_fold_in_the_break_penalty() {
        assert_eq!(compute_demerits(10, 0, 0), 100);
        assert_eq!(compute_demerits(10, 20, 0), 900);
        assert_eq!(compute_demerits(10, 0, 50), 100 + 2500);
        assert_eq!(compute_demerits(10, 0, -50), 100 - 2500);
        // forced and forbidden penalties do not contribute
        assert_eq!(compute_demerits(10, 0, Penalty::EJECT), 100);
        assert_eq!(compute_demerits(10, 0, Penalty::INFINITE), 100);
    }

    #[test]
    fn fitness_classes() {
        assert_eq!(FitnessClass::of_ratio(-0.8), FitnessClass::Tight);
        assert_eq!(FitnessClass::of_ratio(0.0), FitnessClass::Decent);
        assert_eq!(FitnessClass::of_ratio(0.9), FitnessClass::Loose);
        assert_eq!(FitnessClass::of_ratio(3.0), FitnessClass::VeryLoose);
        assert!(FitnessClass::compatible(
            FitnessClass::Decent,
            FitnessClass::Loose
        ));
        assert!(!FitnessClass::compatible(
            FitnessClass::Tight,
            FitnessClass::Loose
        ));
        assert_eq!(
            FitnessClass::of_badness(-0.6, 21),
            FitnessClass::Tight
        );
        assert_eq!(FitnessClass::of_badness(0.7, 34), FitnessClass::Loose);
        assert_eq!(FitnessClass::of_badness(2.0, 800), FitnessClass::VeryLoose);
        assert_eq!(FitnessClass::of_badness(0.1, 0), FitnessClass::Decent);
    }

    #[test]
    fn interline_glue_tops_up_to_the_baselineskip() {
        let mut result = Vec::new();
        let mut prevdepth = 3.0;
        let line = HBox {
            height: 7.0,
            depth: 2.0,
            ..HBox::new_null_box()
        };
        VListBuilder::push_back(
            &mut result,
            line,
            &mut prevdepth,
            &Glue::fixed(12.0),
            &Glue::fixed(3.0),
            2.0,
        );
        // 12 - 3 - 7 = 2 >= lineskiplimit
        assert!(matches!(&result[0], Node::Glue(g) if g.space == 2.0));
        assert_eq!(prevdepth, 2.0);

        // a tall line leaves less than the limit: fall back to lineskip
        let tall = HBox {
            height: 11.0,
            depth: 1.0,
            ..HBox::new_null_box()
        };
        VListBuilder::push_back(
            &mut result,
            tall,
            &mut prevdepth,
            &Glue::fixed(12.0),
            &Glue::fixed(3.0),
            2.0,
        );
        assert!(matches!(&result[2], Node::Glue(g) if g.space == 3.0));
        assert_eq!(prevdepth, 1.0);
    }
}
