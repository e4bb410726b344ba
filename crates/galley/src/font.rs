//! Collaborator traits for font metrics and character typesetting.
//!
//! The engine never reads font files itself. Callers provide a
//! [FontMetrics] implementation for metric queries and a [TypesetEngine]
//! that turns characters into boxes and produces inter-word glue.

use crate::dimen::UnitSystem;
use crate::glue::Glue;
use crate::node::CharBox;

/// Identifier of a loaded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font(pub u32);

/// Pure metric queries against a font. All results are in points.
pub trait FontMetrics {
    fn char_width(&self, c: char, font: Font) -> f32;
    fn char_height(&self, c: char, font: Font) -> f32;
    fn char_depth(&self, c: char, font: Font) -> f32;
    fn italic_correction(&self, c: char, font: Font) -> f32;

    /// The kern to insert between an adjacent pair of characters.
    fn kern(&self, pair: (char, char), font: Font) -> f32 {
        let _ = (pair, font);
        0.0
    }

    /// The ligature replacing an adjacent pair of characters, if any.
    fn ligature(&self, pair: (char, char), font: Font) -> Option<char> {
        let _ = (pair, font);
        None
    }
}

/// Produces the atomic pieces of a horizontal list.
pub trait TypesetEngine {
    /// Typesets a single character in the given font.
    fn typeset(&self, c: char, font: Font) -> CharBox;

    /// The inter-word glue for the given font.
    fn space(&self, font: Font) -> Glue;

    /// The current mapping of em/ex/pt to points.
    fn units(&self) -> UnitSystem;
}
