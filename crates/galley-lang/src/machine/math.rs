//! Math mode.
//!
//! Math typesetting proper is out of scope; this mode collects atoms
//! into a list and, when the closing math shift arrives, renders them
//! as a horizontal box that is embedded into the enclosing mode.

use galley::node::Node;

/// Accumulates a math list between math shift characters.
pub struct MathMode {
    pub(crate) list: Vec<Node>,
    /// Whether the mode was opened from vertical mode (display math).
    pub(crate) display: bool,
}

impl MathMode {
    pub fn new(display: bool) -> MathMode {
        MathMode {
            list: Vec::new(),
            display,
        }
    }
}
