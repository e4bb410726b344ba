//! The paragraph-building horizontal mode.

use galley::node::Node;
use std::collections::HashMap;

/// Commands recognized while accumulating a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalCommand {
    /// Ends the paragraph and hands it to the line breaker.
    Par,
    /// Inserts a horizontal kern.
    Kern,
    /// Does nothing; the paragraph has already started.
    Leavevmode,
    /// Ends the paragraph, then the job.
    End,
}

/// Accumulates a paragraph's horizontal list.
pub struct HorizontalMode {
    pub(crate) hlist: Vec<Node>,
    /// The previous character, for ligature and kerning queries.
    /// Cleared by anything that is not a character.
    pub(crate) last_char: Option<char>,
    commands: HashMap<&'static str, HorizontalCommand>,
}

impl HorizontalMode {
    pub fn new() -> HorizontalMode {
        HorizontalMode {
            hlist: Vec::new(),
            last_char: None,
            commands: HashMap::from([
                ("par", HorizontalCommand::Par),
                ("kern", HorizontalCommand::Kern),
                ("leavevmode", HorizontalCommand::Leavevmode),
                ("end", HorizontalCommand::End),
            ]),
        }
    }

    pub(crate) fn command(&self, name: &str) -> Option<HorizontalCommand> {
        self.commands.get(name).copied()
    }
}

impl Default for HorizontalMode {
    fn default() -> Self {
        HorizontalMode::new()
    }
}
