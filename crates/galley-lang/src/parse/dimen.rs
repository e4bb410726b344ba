//! Parsing dimensions.

use galley::dimen::{Dimen, Unit};

/// Error produced when a dimension does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDimenError {
    /// No digits appeared before the unit.
    MissingNumber,
    /// The unit keyword is missing or unknown.
    UnknownUnit(String),
    /// A character that can appear in no dimension.
    UnexpectedCharacter(char),
}

impl std::fmt::Display for ParseDimenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseDimenError::MissingNumber => write!(f, "expected a number"),
            ParseDimenError::UnknownUnit(unit) => write!(f, "unknown unit {:?}", unit),
            ParseDimenError::UnexpectedCharacter(c) => {
                write!(f, "unexpected character {:?} in a dimension", c)
            }
        }
    }
}

impl std::error::Error for ParseDimenError {}

/// Parses dimensions of the form `[+-]<decimal><unit>`, e.g. `+20pt`
/// or `-0.5fill`.
#[derive(Debug, Default)]
pub struct DimenParser {
    negative: bool,
    digits: String,
    unit: String,
    done: bool,
    error: Option<ParseDimenError>,
}

impl DimenParser {
    pub fn new() -> DimenParser {
        Default::default()
    }

    /// Whether any input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty() && self.unit.is_empty() && !self.negative
    }

    pub fn write(&mut self, c: char) {
        if self.done || self.error.is_some() {
            return;
        }
        match c {
            '+' if self.digits.is_empty() && self.unit.is_empty() => {}
            '-' if self.digits.is_empty() && self.unit.is_empty() => {
                self.negative = !self.negative;
            }
            '0'..='9' | '.' if self.unit.is_empty() => self.digits.push(c),
            c if c.is_ascii_lowercase() => self.unit.push(c),
            ' ' => {
                if !self.unit.is_empty() {
                    self.done = true;
                }
            }
            c => self.error = Some(ParseDimenError::UnexpectedCharacter(c)),
        }
    }

    pub fn finish(self) -> Result<Dimen, ParseDimenError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.digits.is_empty() || self.digits == "." {
            return Err(ParseDimenError::MissingNumber);
        }
        let mut digits = self.digits;
        if digits.starts_with('.') {
            digits.insert(0, '0');
        }
        let value: f32 = digits
            .parse()
            .map_err(|_| ParseDimenError::MissingNumber)?;
        let unit = Unit::parse(&self.unit)
            .ok_or_else(|| ParseDimenError::UnknownUnit(self.unit.clone()))?;
        let value = if self.negative { -value } else { value };
        Ok(Dimen::new(value, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Dimen, ParseDimenError> {
        let mut parser = DimenParser::new();
        for c in s.chars() {
            parser.write(c);
        }
        parser.finish()
    }

    #[test]
    fn simple_finite_dimen() {
        let d = parse("+20pt").unwrap();
        assert_eq!(d.unit(), Unit::Point);
        assert_eq!(d.value(), 20.0);
    }

    #[test]
    fn finite_dimen_with_a_minus_sign() {
        let d = parse("-20em").unwrap();
        assert_eq!(d.unit(), Unit::Em);
        assert_eq!(d.value(), -20.0);
    }

    #[test]
    fn infinite_decimal_dimen() {
        let d = parse("-0.5fill").unwrap();
        assert!(!d.is_finite());
        assert_eq!(d.unit(), Unit::Fill);
        assert_eq!(d.value(), -0.5);
    }

    #[test]
    fn leading_decimal_point() {
        let d = parse("-.125pt ").unwrap();
        assert_eq!(d.value(), -0.125);
    }

    #[test]
    fn missing_number_is_an_error() {
        assert_eq!(parse("pt"), Err(ParseDimenError::MissingNumber));
    }

    #[test]
    fn unknown_unit_is_an_error() {
        assert_eq!(
            parse("1xyz"),
            Err(ParseDimenError::UnknownUnit("xyz".into()))
        );
    }

    #[test]
    fn garbage_is_an_error() {
        assert_eq!(parse("1p?"), Err(ParseDimenError::UnexpectedCharacter('?')));
    }
}
