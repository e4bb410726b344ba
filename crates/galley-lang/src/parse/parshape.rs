//! Parsing paragraph shapes.

use super::dimen::{DimenParser, ParseDimenError};
use galley::dimen::{Dimen, UnitSystem};
use galley::linebreaks::{Parshape, ParshapeLine};

/// Error produced when a parshape specification does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseParshapeError {
    /// The specification must start with `=`.
    MissingEquals,
    /// The row count is missing or not a number.
    MalformedCount,
    /// Fewer than `2 * count` dimensions followed the count.
    MissingDimensions,
    /// Indents and lengths must be finite.
    InfiniteDimension,
    Dimen(ParseDimenError),
}

impl std::fmt::Display for ParseParshapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ParseParshapeError::*;
        match self {
            MissingEquals => write!(f, "a parshape specification starts with `=`"),
            MalformedCount => write!(f, "expected the number of parshape rows"),
            MissingDimensions => write!(f, "expected an indent and a length per row"),
            InfiniteDimension => write!(f, "parshape dimensions must be finite"),
            Dimen(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ParseParshapeError {}

impl From<ParseDimenError> for ParseParshapeError {
    fn from(e: ParseDimenError) -> Self {
        ParseParshapeError::Dimen(e)
    }
}

#[derive(Debug)]
enum Phase {
    Equals,
    Count,
    Dimens,
}

/// Parses `=<n>` followed by `n` pairs of `<indent> <length>`
/// dimensions, e.g. `=1 1pt 10em`.
#[derive(Debug)]
pub struct ParshapeParser {
    units: UnitSystem,
    phase: Phase,
    count_digits: String,
    current: DimenParser,
    dimens: Vec<Dimen>,
    error: Option<ParseParshapeError>,
}

impl ParshapeParser {
    pub fn new(units: UnitSystem) -> ParshapeParser {
        ParshapeParser {
            units,
            phase: Phase::Equals,
            count_digits: String::new(),
            current: DimenParser::new(),
            dimens: Vec::new(),
            error: None,
        }
    }

    pub fn write(&mut self, c: char) {
        if self.error.is_some() {
            return;
        }
        match self.phase {
            Phase::Equals => match c {
                '=' => self.phase = Phase::Count,
                ' ' => {}
                _ => self.error = Some(ParseParshapeError::MissingEquals),
            },
            Phase::Count => match c {
                '0'..='9' => self.count_digits.push(c),
                ' ' if !self.count_digits.is_empty() => self.phase = Phase::Dimens,
                _ => self.error = Some(ParseParshapeError::MalformedCount),
            },
            Phase::Dimens => {
                if c == ' ' && !self.current.is_empty() {
                    self.end_dimen();
                } else {
                    self.current.write(c);
                }
            }
        }
    }

    fn end_dimen(&mut self) {
        let parser = std::mem::take(&mut self.current);
        match parser.finish() {
            Ok(d) => self.dimens.push(d),
            Err(e) => self.error = Some(e.into()),
        }
    }

    pub fn finish(mut self) -> Result<Parshape, ParseParshapeError> {
        if matches!(self.phase, Phase::Dimens) && !self.current.is_empty() {
            self.end_dimen();
        }
        if let Some(error) = self.error {
            return Err(error);
        }
        let count: usize = match self.phase {
            Phase::Equals => return Err(ParseParshapeError::MissingEquals),
            Phase::Count | Phase::Dimens => self
                .count_digits
                .parse()
                .map_err(|_| ParseParshapeError::MalformedCount)?,
        };
        if self.dimens.len() != 2 * count {
            return Err(ParseParshapeError::MissingDimensions);
        }
        let mut parshape = Parshape::with_capacity(count);
        for pair in self.dimens.chunks(2) {
            let indent = pair[0]
                .resolve(&self.units)
                .ok_or(ParseParshapeError::InfiniteDimension)?;
            let length = pair[1]
                .resolve(&self.units)
                .ok_or(ParseParshapeError::InfiniteDimension)?;
            parshape.push(ParshapeLine { indent, length });
        }
        Ok(parshape)
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

    fn parse(s: &str) -> Result<Parshape, ParseParshapeError> {
        let mut parser = ParshapeParser::new(units());
        for c in s.chars() {
            parser.write(c);
        }
        parser.finish()
    }

    #[test]
    fn single_row() {
        let ps = parse("=1 1pt 10em").unwrap();
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].indent, 1.0);
        assert_eq!(ps[0].length, 20.0);
    }

    #[test]
    fn empty_parshape() {
        let ps = parse("=0").unwrap();
        assert!(ps.is_empty());
    }

    #[test]
    fn two_rows() {
        let ps = parse("=2 0pt 10pt 5pt 20pt").unwrap();
        assert_eq!(ps.len(), 2);
        assert_eq!(ps[1].indent, 5.0);
        assert_eq!(ps[1].length, 20.0);
    }

    #[test]
    fn missing_dimension_is_an_error() {
        assert_eq!(
            parse("=2 0pt 10pt"),
            Err(ParseParshapeError::MissingDimensions)
        );
    }

    #[test]
    fn missing_equals_is_an_error() {
        assert_eq!(parse("1 1pt 1pt"), Err(ParseParshapeError::MissingEquals));
    }
}
