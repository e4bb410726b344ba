//! The outer vertical mode.

use galley::node::Node;
use std::collections::HashMap;

/// Commands recognized while accumulating the vertical list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalCommand {
    /// Between paragraphs `\par` does nothing.
    Par,
    /// Starts an empty paragraph.
    Leavevmode,
    /// Inserts a vertical kern.
    Kern,
    /// Finishes the job.
    End,
}

/// Accumulates the outer vertical list.
pub struct VerticalMode {
    pub(crate) vlist: Vec<Node>,
    commands: HashMap<&'static str, VerticalCommand>,
}

impl VerticalMode {
    pub fn new() -> VerticalMode {
        VerticalMode {
            vlist: Vec::new(),
            commands: HashMap::from([
                ("par", VerticalCommand::Par),
                ("leavevmode", VerticalCommand::Leavevmode),
                ("kern", VerticalCommand::Kern),
                ("end", VerticalCommand::End),
            ]),
        }
    }

    pub(crate) fn command(&self, name: &str) -> Option<VerticalCommand> {
        self.commands.get(name).copied()
    }
}

impl Default for VerticalMode {
    fn default() -> Self {
        VerticalMode::new()
    }
}
