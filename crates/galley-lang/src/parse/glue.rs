//! Parsing glue and kerns.

use super::dimen::{DimenParser, ParseDimenError};
use galley::dimen::{Dimen, UnitSystem};
use galley::glue::{Glue, GlueOrder};
use galley::node::Kern;

/// Error produced when a glue or kern specification does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseGlueError {
    Dimen(ParseDimenError),
    /// A word that is neither `plus` nor `minus` followed a dimension.
    UnknownKeyword(String),
    /// The nominal width of a glue, and a kern, must be finite.
    InfiniteDimension,
}

impl std::fmt::Display for ParseGlueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseGlueError::Dimen(e) => e.fmt(f),
            ParseGlueError::UnknownKeyword(word) => {
                write!(f, "expected `plus` or `minus`, got {:?}", word)
            }
            ParseGlueError::InfiniteDimension => {
                write!(f, "an infinite unit is only allowed in stretch and shrink")
            }
        }
    }
}

impl std::error::Error for ParseGlueError {}

impl From<ParseDimenError> for ParseGlueError {
    fn from(e: ParseDimenError) -> Self {
        ParseGlueError::Dimen(e)
    }
}

#[derive(Debug)]
enum Phase {
    /// Reading one of the three dimensions. 0 is the nominal space,
    /// 1 the stretch, 2 the shrink.
    Dimen(usize),
    /// Reading the keyword between dimensions.
    Keyword,
}

/// Parses glue specifications of the form
/// `<dimen> [plus <dimen>] [minus <dimen>]`, resolving finite
/// dimensions against a [UnitSystem].
#[derive(Debug)]
pub struct GlueParser {
    units: UnitSystem,
    phase: Phase,
    current: DimenParser,
    keyword: String,
    dimens: [Option<Dimen>; 3],
    error: Option<ParseGlueError>,
}

impl GlueParser {
    pub fn new(units: UnitSystem) -> GlueParser {
        GlueParser {
            units,
            phase: Phase::Dimen(0),
            current: DimenParser::new(),
            keyword: String::new(),
            dimens: [None; 3],
            error: None,
        }
    }

    pub fn write(&mut self, c: char) {
        if self.error.is_some() {
            return;
        }
        match self.phase {
            Phase::Dimen(slot) => {
                if c == ' ' && !self.current.is_empty() {
                    self.end_dimen(slot);
                } else {
                    self.current.write(c);
                }
            }
            Phase::Keyword => {
                if c == ' ' {
                    if !self.keyword.is_empty() {
                        self.end_keyword();
                    }
                } else {
                    self.keyword.push(c);
                }
            }
        }
    }

    fn end_dimen(&mut self, slot: usize) {
        let parser = std::mem::take(&mut self.current);
        match parser.finish() {
            Ok(d) => {
                self.dimens[slot] = Some(d);
                self.phase = Phase::Keyword;
            }
            Err(e) => self.error = Some(e.into()),
        }
    }

    fn end_keyword(&mut self) {
        let keyword = std::mem::take(&mut self.keyword);
        match keyword.as_str() {
            "plus" => self.phase = Phase::Dimen(1),
            "minus" => self.phase = Phase::Dimen(2),
            _ => self.error = Some(ParseGlueError::UnknownKeyword(keyword)),
        }
    }

    pub fn finish(mut self) -> Result<Glue, ParseGlueError> {
        // Flush whatever the input ended in the middle of.
        match self.phase {
            Phase::Dimen(slot) => {
                if !self.current.is_empty() {
                    self.end_dimen(slot);
                }
            }
            Phase::Keyword => {
                if !self.keyword.is_empty() {
                    self.end_keyword();
                    if let (None, Phase::Dimen(_)) = (&self.error, &self.phase) {
                        // `plus`/`minus` with no following dimension
                        self.error = Some(ParseGlueError::Dimen(ParseDimenError::MissingNumber));
                    }
                }
            }
        }
        if let Some(error) = self.error {
            return Err(error);
        }
        let space = match self.dimens[0] {
            Some(d) => d.resolve(&self.units).ok_or(ParseGlueError::InfiniteDimension)?,
            None => return Err(ParseGlueError::Dimen(ParseDimenError::MissingNumber)),
        };
        let (stretch, stretch_order) = elastic_component(self.dimens[1], &self.units);
        let (shrink, shrink_order) = elastic_component(self.dimens[2], &self.units);
        Ok(Glue::with_orders(
            space,
            stretch,
            stretch_order,
            shrink,
            shrink_order,
        ))
    }
}

/// Resolves a stretch or shrink dimension: finite dimensions reduce to
/// points, infinite ones keep their value and carry their order.
fn elastic_component(dimen: Option<Dimen>, units: &UnitSystem) -> (f32, GlueOrder) {
    match dimen {
        None => (0.0, GlueOrder::Normal),
        Some(d) => match d.resolve(units) {
            Some(value) => (value, GlueOrder::Normal),
            None => (d.value(), d.unit().glue_order()),
        },
    }
}

/// Parses a kern: a single finite dimension resolved against a
/// [UnitSystem].
#[derive(Debug)]
pub struct KernParser {
    units: UnitSystem,
    parser: DimenParser,
}

impl KernParser {
    pub fn new(units: UnitSystem) -> KernParser {
        KernParser {
            units,
            parser: DimenParser::new(),
        }
    }

    pub fn write(&mut self, c: char) {
        self.parser.write(c);
    }

    pub fn finish(self) -> Result<Kern, ParseGlueError> {
        let dimen = self.parser.finish()?;
        let space = dimen
            .resolve(&self.units)
            .ok_or(ParseGlueError::InfiniteDimension)?;
        Ok(Kern::new(space))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units() -> UnitSystem {
        UnitSystem {
            pt: 1.0,
            em: 2.0,
            ex: 0.5,
        }
    }

    fn parse_glue(s: &str) -> Result<Glue, ParseGlueError> {
        let mut parser = GlueParser::new(units());
        for c in s.chars() {
            parser.write(c);
        }
        parser.finish()
    }

    fn parse_kern(s: &str) -> Result<Kern, ParseGlueError> {
        let mut parser = KernParser::new(units());
        for c in s.chars() {
            parser.write(c);
        }
        parser.finish()
    }

    #[test]
    fn simple_glue() {
        let g = parse_glue("1em").unwrap();
        assert_eq!(g.space, 2.0);
        assert_eq!(g.stretch, 0.0);
        assert_eq!(g.shrink, 0.0);
    }

    #[test]
    fn glue_with_finite_stretch_and_shrink() {
        let g = parse_glue("1ex plus 2pt minus 3em").unwrap();
        assert_eq!(g.space, 0.5);
        assert_eq!(g.stretch, 2.0);
        assert_eq!(g.shrink, 6.0);
        assert_eq!(g.stretch_order, GlueOrder::Normal);
        assert_eq!(g.shrink_order, GlueOrder::Normal);
    }

    #[test]
    fn glue_with_infinite_stretch_and_shrink() {
        let g = parse_glue("1pc plus 1fil minus 2fill").unwrap();
        assert_eq!(g.space, 12.0);
        assert_eq!(g.stretch, 1.0);
        assert_eq!(g.shrink, 2.0);
        assert_eq!(g.stretch_order, GlueOrder::Fil);
        assert_eq!(g.shrink_order, GlueOrder::Fill);
    }

    #[test]
    fn glue_with_a_trailing_space() {
        let g = parse_glue("1pc ").unwrap();
        assert_eq!(g.space, 12.0);
    }

    #[test]
    fn glue_with_only_a_shrink() {
        let g = parse_glue("3pt minus 1pt").unwrap();
        assert_eq!(g.space, 3.0);
        assert_eq!(g.stretch, 0.0);
        assert_eq!(g.shrink, 1.0);
    }

    #[test]
    fn infinite_space_is_an_error() {
        assert_eq!(
            parse_glue("1fil"),
            Err(ParseGlueError::InfiniteDimension)
        );
    }

    #[test]
    fn unknown_keyword_is_an_error() {
        assert_eq!(
            parse_glue("1pt also 2pt"),
            Err(ParseGlueError::UnknownKeyword("also".into()))
        );
    }

    #[test]
    fn simple_kern() {
        let k = parse_kern("1pc ").unwrap();
        assert_eq!(k.space, 12.0);
    }

    #[test]
    fn decimal_kern() {
        let k = parse_kern("-.125pt ").unwrap();
        assert_eq!(k.space, -0.125);
    }
}
