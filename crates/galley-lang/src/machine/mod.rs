//! The typesetting machine.
//!
//! The machine owns the whole pipeline: characters go through the
//! lexer, tokens through the preprocessor, and the expanded stream is
//! consumed one token at a time by the current mode. Modes form a
//! stack: the outer vertical mode accumulates the document's vertical
//! list; a paragraph opens a horizontal mode on top of it and, at
//! `\par`, hands its list to the line breaker and appends the produced
//! lines to the enclosing vertical list; math shifts open a math mode
//! whose result is embedded as a box into the mode below.
//!
//! Each mode resolves control sequences through its own command map;
//! a control sequence no mode knows is ignored.

mod horizontal;
mod math;
mod vertical;

pub use horizontal::{HorizontalCommand, HorizontalMode};
pub use math::MathMode;
pub use vertical::{VerticalCommand, VerticalMode};

use crate::lexer::Lexer;
use crate::parse::{KernParser, ParseGlueError};
use crate::preprocessor::{Preprocessor, PreprocessorError};
use crate::token::{CatCode, Token};
use galley::font::{Font, FontMetrics, TypesetEngine};
use galley::linebreaks::{NoFeasibleBreakpoints, Paragraph};
use galley::node::{Kern, Node, VBox};
use galley::pack;

/// Error surfaced while driving the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineError {
    Preprocessor(PreprocessorError),
    /// A paragraph could not be broken into acceptable lines.
    Linebreak(NoFeasibleBreakpoints),
    /// The material following `\kern` was not a dimension.
    KernSyntax(ParseGlueError),
    /// The input ended inside math mode.
    UnclosedMath,
}

impl std::fmt::Display for MachineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineError::Preprocessor(e) => e.fmt(f),
            MachineError::Linebreak(e) => e.fmt(f),
            MachineError::KernSyntax(e) => e.fmt(f),
            MachineError::UnclosedMath => write!(f, "the input ended inside math mode"),
        }
    }
}

impl std::error::Error for MachineError {}

impl From<PreprocessorError> for MachineError {
    fn from(e: PreprocessorError) -> Self {
        MachineError::Preprocessor(e)
    }
}

enum Mode {
    Vertical(VerticalMode),
    Horizontal(HorizontalMode),
    Math(MathMode),
}

/// The typesetting machine. See the module documentation.
pub struct TypesettingMachine<E: TypesetEngine + FontMetrics> {
    engine: E,
    lexer: Lexer,
    preprocessor: Preprocessor,
    modes: Vec<Mode>,
    options: Paragraph,
    font: Font,
    prevdepth: f32,
    /// A `\kern` dimension currently being read from character tokens.
    pending_kern: Option<KernParser>,
}

impl<E: TypesetEngine + FontMetrics> TypesettingMachine<E> {
    pub fn new(engine: E, options: Paragraph) -> Self {
        let prevdepth = options.prevdepth;
        TypesettingMachine {
            engine,
            lexer: Lexer::new(),
            preprocessor: Preprocessor::new(),
            modes: vec![Mode::Vertical(VerticalMode::new())],
            options,
            font: Font(0),
            prevdepth,
            pending_kern: None,
        }
    }

    pub fn preprocessor(&mut self) -> &mut Preprocessor {
        &mut self.preprocessor
    }

    /// Feeds input characters and advances the pipeline as far as it
    /// goes.
    pub fn write_str(&mut self, s: &str) -> Result<(), MachineError> {
        self.lexer.write_str(s);
        self.pump()
    }

    pub fn write_char(&mut self, c: char) -> Result<(), MachineError> {
        self.lexer.write(c);
        self.pump()
    }

    /// Finishes the job: closes an open paragraph and packs the
    /// vertical list into a box.
    pub fn finish(mut self) -> Result<VBox, MachineError> {
        self.lexer.end();
        self.pump()?;
        self.finish_pending_kern()?;
        loop {
            match self.modes.last().expect("the mode stack is never empty") {
                Mode::Math(_) => return Err(MachineError::UnclosedMath),
                Mode::Horizontal(_) => self.end_paragraph()?,
                Mode::Vertical(_) => break,
            }
        }
        let root = match self.modes.pop() {
            Some(Mode::Vertical(v)) => v,
            _ => unreachable!("the bottom mode is vertical"),
        };
        Ok(pack::vbox_natural(root.vlist))
    }

    fn pump(&mut self) -> Result<(), MachineError> {
        while let Some(token) = self.lexer.pop() {
            self.preprocessor.write(token)?;
            while self.preprocessor.has_pending_input() {
                self.preprocessor.advance()?;
            }
            // Dispatch before feeding the next token: group tokens in
            // the output change the scopes the preprocessor resolves
            // later definitions against.
            let tokens: Vec<Token> = self.preprocessor.output.drain(..).collect();
            for token in tokens {
                self.advance(token)?;
            }
        }
        Ok(())
    }

    /// Consumes one expanded token in the current mode.
    fn advance(&mut self, token: Token) -> Result<(), MachineError> {
        if self.pending_kern.is_some() {
            return self.continue_kern(token);
        }
        match self.modes.last().expect("the mode stack is never empty") {
            Mode::Vertical(_) => self.vertical_advance(token),
            Mode::Horizontal(_) => self.horizontal_advance(token),
            Mode::Math(_) => self.math_advance(token),
        }
    }

    // -- vertical mode ------------------------------------------------

    fn vertical_advance(&mut self, token: Token) -> Result<(), MachineError> {
        match &token {
            Token::ControlSequence(name) => {
                let mode = match self.modes.last() {
                    Some(Mode::Vertical(v)) => v,
                    _ => unreachable!(),
                };
                match mode.command(name) {
                    Some(VerticalCommand::Par) | Some(VerticalCommand::End) => Ok(()),
                    Some(VerticalCommand::Leavevmode) => {
                        self.begin_paragraph();
                        Ok(())
                    }
                    Some(VerticalCommand::Kern) => {
                        self.pending_kern = Some(KernParser::new(self.engine.units()));
                        Ok(())
                    }
                    None => Ok(()),
                }
            }
            Token::Character(_, cat) => match cat {
                CatCode::Space | CatCode::Invalid => Ok(()),
                CatCode::BeginGroup => {
                    self.preprocessor.begin_group();
                    Ok(())
                }
                CatCode::EndGroup => {
                    self.preprocessor.end_group()?;
                    Ok(())
                }
                CatCode::MathShift => {
                    self.modes.push(Mode::Math(MathMode::new(true)));
                    Ok(())
                }
                _ => {
                    // Printable material begins a paragraph.
                    self.begin_paragraph();
                    self.advance(token)
                }
            },
        }
    }

    fn begin_paragraph(&mut self) {
        self.modes.push(Mode::Horizontal(HorizontalMode::new()));
    }

    // -- horizontal mode ----------------------------------------------

    fn horizontal_advance(&mut self, token: Token) -> Result<(), MachineError> {
        match &token {
            Token::ControlSequence(name) => {
                let mode = match self.modes.last() {
                    Some(Mode::Horizontal(h)) => h,
                    _ => unreachable!(),
                };
                match mode.command(name) {
                    Some(HorizontalCommand::Par) | Some(HorizontalCommand::End) => {
                        self.end_paragraph()
                    }
                    Some(HorizontalCommand::Kern) => {
                        self.pending_kern = Some(KernParser::new(self.engine.units()));
                        Ok(())
                    }
                    Some(HorizontalCommand::Leavevmode) | None => Ok(()),
                }
            }
            Token::Character(c, cat) => match cat {
                CatCode::Space => {
                    let glue = self.engine.space(self.font);
                    let mode = match self.modes.last_mut() {
                        Some(Mode::Horizontal(h)) => h,
                        _ => unreachable!(),
                    };
                    mode.hlist.push(Node::Glue(glue));
                    mode.last_char = None;
                    Ok(())
                }
                CatCode::BeginGroup => {
                    self.preprocessor.begin_group();
                    Ok(())
                }
                CatCode::EndGroup => {
                    self.preprocessor.end_group()?;
                    Ok(())
                }
                CatCode::MathShift => {
                    self.modes.push(Mode::Math(MathMode::new(false)));
                    Ok(())
                }
                CatCode::Invalid => Ok(()),
                _ => {
                    self.typeset_char(*c);
                    Ok(())
                }
            },
        }
    }

    fn typeset_char(&mut self, c: char) {
        let font = self.font;
        let mode = match self.modes.last_mut() {
            Some(Mode::Horizontal(h)) => h,
            _ => unreachable!(),
        };
        if let Some(prev) = mode.last_char {
            if let Some(lig) = self.engine.ligature((prev, c), font) {
                mode.hlist.pop();
                mode.hlist.push(Node::Char(self.engine.typeset(lig, font)));
                mode.last_char = Some(lig);
                return;
            }
            let kern = self.engine.kern((prev, c), font);
            if kern != 0.0 {
                mode.hlist.push(Node::Kern(Kern::new(kern)));
            }
        }
        mode.hlist.push(Node::Char(self.engine.typeset(c, font)));
        mode.last_char = Some(c);
    }

    /// Hands the paragraph to the line breaker and appends the lines
    /// to the enclosing vertical list.
    fn end_paragraph(&mut self) -> Result<(), MachineError> {
        let mode = match self.modes.pop() {
            Some(Mode::Horizontal(h)) => h,
            _ => unreachable!("end_paragraph is only called in horizontal mode"),
        };
        let mut hlist = mode.hlist;
        if hlist.is_empty() {
            return Ok(());
        }
        let mut options = self.options.clone();
        options.prevdepth = self.prevdepth;
        options.prepare(&mut hlist);
        let vlist = options.create(&hlist).map_err(MachineError::Linebreak)?;
        for node in &vlist {
            if let Node::HBox(b) = node {
                self.prevdepth = b.depth;
            }
        }
        match self.modes.last_mut() {
            Some(Mode::Vertical(v)) => v.vlist.extend(vlist),
            _ => unreachable!("a paragraph always sits above the vertical mode"),
        }
        Ok(())
    }

    // -- math mode ----------------------------------------------------

    fn math_advance(&mut self, token: Token) -> Result<(), MachineError> {
        match &token {
            Token::ControlSequence(_) => Ok(()),
            Token::Character(c, cat) => match cat {
                CatCode::MathShift => self.end_math(),
                CatCode::Space | CatCode::Invalid => Ok(()),
                CatCode::BeginGroup => {
                    self.preprocessor.begin_group();
                    Ok(())
                }
                CatCode::EndGroup => {
                    self.preprocessor.end_group()?;
                    Ok(())
                }
                _ => {
                    let char_box = self.engine.typeset(*c, self.font);
                    let italic = char_box.italic_correction;
                    let mode = match self.modes.last_mut() {
                        Some(Mode::Math(m)) => m,
                        _ => unreachable!(),
                    };
                    mode.list.push(Node::Char(char_box));
                    if italic != 0.0 {
                        mode.list.push(Node::Kern(Kern::new(italic)));
                    }
                    Ok(())
                }
            },
        }
    }

    /// Renders the math list as a box and embeds it into the enclosing
    /// mode.
    fn end_math(&mut self) -> Result<(), MachineError> {
        let mode = match self.modes.pop() {
            Some(Mode::Math(m)) => m,
            _ => unreachable!("end_math is only called in math mode"),
        };
        let boxed = Node::HBox(pack::hbox_natural(mode.list));
        match self.modes.last_mut() {
            Some(Mode::Horizontal(h)) => {
                h.hlist.push(boxed);
                h.last_char = None;
            }
            Some(Mode::Vertical(v)) => v.vlist.push(boxed),
            _ => unreachable!("math always sits above another mode"),
        }
        Ok(())
    }

    // -- \kern --------------------------------------------------------

    fn continue_kern(&mut self, token: Token) -> Result<(), MachineError> {
        match &token {
            Token::Character(_, CatCode::Space) => self.finish_pending_kern(),
            Token::Character(c, CatCode::Letter) | Token::Character(c, CatCode::Other) => {
                let parser = self
                    .pending_kern
                    .as_mut()
                    .expect("continue_kern is only called with a pending kern");
                parser.write(*c);
                Ok(())
            }
            _ => {
                // Anything else ends the dimension; reprocess it.
                self.finish_pending_kern()?;
                self.advance(token)
            }
        }
    }

    fn finish_pending_kern(&mut self) -> Result<(), MachineError> {
        let parser = match self.pending_kern.take() {
            Some(p) => p,
            None => return Ok(()),
        };
        let kern = parser.finish().map_err(MachineError::KernSyntax)?;
        match self.modes.last_mut().expect("the mode stack is never empty") {
            Mode::Vertical(v) => v.vlist.push(Node::Kern(kern)),
            Mode::Horizontal(h) => {
                h.hlist.push(Node::Kern(kern));
                h.last_char = None;
            }
            Mode::Math(m) => m.list.push(Node::Kern(kern)),
        }
        Ok(())
    }
}
