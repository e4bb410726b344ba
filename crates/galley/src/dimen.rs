//! Units and dimensions.
//!
//! A [Dimen] is a scalar tagged with a [Unit]. The finite units (points,
//! picas, and the font-relative em/ex) reduce to a number of points under
//! a [UnitSystem]; the infinite units (fil, fill, filll) only make sense
//! as the stretch or shrink component of a glue and carry a
//! [GlueOrder](crate::glue::GlueOrder) instead.

use crate::glue::GlueOrder;

/// Unit attached to a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    Point,
    Pica,
    Em,
    Ex,
    Fil,
    Fill,
    Filll,
}

impl Unit {
    /// Parses a unit from its keyword, e.g. `"pc"` to [`Unit::Pica`].
    pub fn parse(s: &str) -> Option<Unit> {
        use Unit::*;
        Some(match s {
            "pt" => Point,
            "pc" => Pica,
            "em" => Em,
            "ex" => Ex,
            "fil" => Fil,
            "fill" => Fill,
            "filll" => Filll,
            _ => return None,
        })
    }

    /// Whether the unit denotes a finite length.
    pub fn is_finite(self) -> bool {
        !matches!(self, Unit::Fil | Unit::Fill | Unit::Filll)
    }

    /// The order of infinity this unit contributes to a glue component.
    pub fn glue_order(self) -> GlueOrder {
        match self {
            Unit::Fil => GlueOrder::Fil,
            Unit::Fill => GlueOrder::Fill,
            Unit::Filll => GlueOrder::Filll,
            _ => GlueOrder::Normal,
        }
    }
}

/// A scalar with a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimen {
    value: f32,
    unit: Unit,
}

impl Dimen {
    pub fn new(value: f32, unit: Unit) -> Dimen {
        Dimen { value, unit }
    }

    pub fn zero() -> Dimen {
        Dimen::new(0.0, Unit::Point)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn is_finite(&self) -> bool {
        self.unit.is_finite()
    }

    /// Reduces a finite dimension to points.
    ///
    /// Returns `None` for the infinite units, which have no length.
    pub fn resolve(&self, units: &UnitSystem) -> Option<f32> {
        let factor = match self.unit {
            Unit::Point => units.pt,
            Unit::Pica => 12.0 * units.pt,
            Unit::Em => units.em,
            Unit::Ex => units.ex,
            Unit::Fil | Unit::Fill | Unit::Filll => return None,
        };
        Some(self.value * factor)
    }
}

/// Conversion factors from the finite units to points.
///
/// The em and ex factors come from the current font; a pica is always
/// twelve points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitSystem {
    pub pt: f32,
    pub em: f32,
    pub ex: f32,
}

impl Default for UnitSystem {
    fn default() -> Self {
        UnitSystem {
            pt: 1.0,
            em: 10.0,
            ex: 4.5,
        }
    }
}
