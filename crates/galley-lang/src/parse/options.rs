//! Parsing option lists and applying them to a paragraph.

use super::dimen::DimenParser;
use super::glue::GlueParser;
use super::parshape::ParshapeParser;
use galley::dimen::UnitSystem;
use galley::glue::Glue;
use galley::linebreaks::Paragraph;

/// Parses option lists of the form `[key=value, other key, ...]`.
///
/// Keys without a value get an empty one. Whitespace after a `[`, `,`
/// or `=` is skipped; interior spaces are kept.
#[derive(Debug, Default)]
pub struct OptionsParser {
    state: State,
    key: String,
    value: String,
    result: Vec<(String, String)>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Start,
    Key,
    Value,
    Done,
}

impl OptionsParser {
    pub fn new() -> OptionsParser {
        Default::default()
    }

    pub fn write(&mut self, c: char) {
        match self.state {
            State::Start => {
                if c == '[' {
                    self.state = State::Key;
                }
            }
            State::Key => match c {
                '=' => self.state = State::Value,
                ',' => self.flush(),
                ']' => {
                    self.flush();
                    self.state = State::Done;
                }
                ' ' if self.key.is_empty() => {}
                _ => self.key.push(c),
            },
            State::Value => match c {
                ',' => self.flush(),
                ']' => {
                    self.flush();
                    self.state = State::Done;
                }
                ' ' if self.value.is_empty() => {}
                _ => self.value.push(c),
            },
            State::Done => {}
        }
    }

    fn flush(&mut self) {
        let key = std::mem::take(&mut self.key);
        let value = std::mem::take(&mut self.value);
        if !key.is_empty() || !value.is_empty() {
            self.result.push((key, value));
        }
        self.state = State::Key;
    }

    /// Whether the closing `]` has been seen.
    pub fn is_finished(&self) -> bool {
        self.state == State::Done
    }

    pub fn result(&self) -> &[(String, String)] {
        &self.result
    }

    pub fn into_result(self) -> Vec<(String, String)> {
        self.result
    }
}

/// Error produced when applying textual options to a [Paragraph].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphOptionError {
    UnknownOption(String),
    MalformedValue { key: String, value: String },
}

impl std::fmt::Display for ParagraphOptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParagraphOptionError::UnknownOption(key) => write!(f, "unknown option {:?}", key),
            ParagraphOptionError::MalformedValue { key, value } => {
                write!(f, "malformed value {:?} for option {:?}", value, key)
            }
        }
    }
}

impl std::error::Error for ParagraphOptionError {}

/// Applies parsed options to a paragraph configuration.
///
/// Dimension-valued options are resolved against `units`; glue-valued
/// options accept the full `<dimen> plus <dimen> minus <dimen>` syntax.
pub fn apply_paragraph_options(
    paragraph: &mut Paragraph,
    options: &[(String, String)],
    units: &UnitSystem,
) -> Result<(), ParagraphOptionError> {
    for (key, value) in options {
        let malformed = || ParagraphOptionError::MalformedValue {
            key: key.clone(),
            value: value.clone(),
        };
        match key.as_str() {
            "hsize" => paragraph.hsize = parse_length(value, units).ok_or_else(malformed)?,
            "tolerance" => paragraph.tolerance = value.parse().map_err(|_| malformed())?,
            "linepenalty" => paragraph.linepenalty = value.parse().map_err(|_| malformed())?,
            "adjdemerits" => paragraph.adjdemerits = value.parse().map_err(|_| malformed())?,
            "hangindent" => {
                paragraph.hangindent = parse_length(value, units).ok_or_else(malformed)?
            }
            "hangafter" => paragraph.hangafter = value.parse().map_err(|_| malformed())?,
            "parshape" => {
                let mut parser = ParshapeParser::new(*units);
                for c in value.chars() {
                    parser.write(c);
                }
                paragraph.parshape = parser.finish().map_err(|_| malformed())?;
            }
            "leftskip" => paragraph.leftskip = parse_glue(value, units).ok_or_else(malformed)?,
            "rightskip" => paragraph.rightskip = parse_glue(value, units).ok_or_else(malformed)?,
            "parfillskip" => {
                paragraph.parfillskip = parse_glue(value, units).ok_or_else(malformed)?
            }
            "baselineskip" => {
                paragraph.baselineskip = parse_glue(value, units).ok_or_else(malformed)?
            }
            "lineskip" => paragraph.lineskip = parse_glue(value, units).ok_or_else(malformed)?,
            "lineskiplimit" => {
                paragraph.lineskiplimit = parse_length(value, units).ok_or_else(malformed)?
            }
            "prevdepth" => {
                paragraph.prevdepth = parse_length(value, units).ok_or_else(malformed)?
            }
            _ => return Err(ParagraphOptionError::UnknownOption(key.clone())),
        }
    }
    Ok(())
}

fn parse_length(value: &str, units: &UnitSystem) -> Option<f32> {
    let mut parser = DimenParser::new();
    for c in value.chars() {
        parser.write(c);
    }
    parser.finish().ok()?.resolve(units)
}

fn parse_glue(value: &str, units: &UnitSystem) -> Option<Glue> {
    let mut parser = GlueParser::new(*units);
    for c in value.chars() {
        parser.write(c);
    }
    parser.finish().ok()
}
