//! Glue and the glue algebra.
//!
//! Glue is stretchable, shrinkable whitespace. Each of its stretch and
//! shrink components carries an order of infinity: when a list contains
//! glue of some order, glue of any lower order is not stretched or
//! shrunk at all. Accumulating the glue of a list therefore keeps one
//! running total per order; the highest order with a non-zero total is
//! the one that participates in glue setting.

use std::ops::{Add, Sub};

/// Order of infinity of a glue stretch or shrink component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GlueOrder {
    #[default]
    Normal,
    Fil,
    Fill,
    Filll,
}

impl GlueOrder {
    /// Parses an infinite glue order from a keyword.
    pub fn parse(s: &str) -> Option<Self> {
        use GlueOrder::*;
        Some(match s {
            "fil" => Fil,
            "fill" => Fill,
            "filll" => Filll,
            _ => return None,
        })
    }
}

/// A piece of glue.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glue {
    pub space: f32,
    pub stretch: f32,
    pub stretch_order: GlueOrder,
    pub shrink: f32,
    pub shrink_order: GlueOrder,
}

impl Glue {
    /// A rigid glue of the given width.
    pub fn fixed(space: f32) -> Glue {
        Glue {
            space,
            ..Default::default()
        }
    }

    /// A glue with finite stretch and shrink.
    pub fn new(space: f32, stretch: f32, shrink: f32) -> Glue {
        Glue {
            space,
            stretch,
            shrink,
            ..Default::default()
        }
    }

    /// A glue with explicit stretch and shrink orders.
    pub fn with_orders(
        space: f32,
        stretch: f32,
        stretch_order: GlueOrder,
        shrink: f32,
        shrink_order: GlueOrder,
    ) -> Glue {
        Glue {
            space,
            stretch,
            stretch_order,
            shrink,
            shrink_order,
        }
    }

    /// Adds this glue's elasticity to a pair of running totals.
    pub fn accumulate(&self, shrink: &mut GlueTotals, stretch: &mut GlueTotals) {
        stretch.add(self.stretch_order, self.stretch);
        shrink.add(self.shrink_order, self.shrink);
    }
}

/// Per-order totals of one side (stretch or shrink) of a list's glue.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlueTotals {
    pub normal: f32,
    pub fil: f32,
    pub fill: f32,
    pub filll: f32,
}

impl GlueTotals {
    pub fn add(&mut self, order: GlueOrder, amount: f32) {
        *self.get_mut(order) += amount;
    }

    pub fn get(&self, order: GlueOrder) -> f32 {
        match order {
            GlueOrder::Normal => self.normal,
            GlueOrder::Fil => self.fil,
            GlueOrder::Fill => self.fill,
            GlueOrder::Filll => self.filll,
        }
    }

    fn get_mut(&mut self, order: GlueOrder) -> &mut f32 {
        match order {
            GlueOrder::Normal => &mut self.normal,
            GlueOrder::Fil => &mut self.fil,
            GlueOrder::Fill => &mut self.fill,
            GlueOrder::Filll => &mut self.filll,
        }
    }

    /// The highest order with a non-zero total.
    ///
    /// Higher orders dominate: any fil beats the finite total, fill
    /// beats fil, and filll beats fill.
    pub fn order(&self) -> GlueOrder {
        if self.filll != 0.0 {
            GlueOrder::Filll
        } else if self.fill != 0.0 {
            GlueOrder::Fill
        } else if self.fil != 0.0 {
            GlueOrder::Fil
        } else {
            GlueOrder::Normal
        }
    }
}

impl Add for GlueTotals {
    type Output = GlueTotals;
    fn add(self, rhs: GlueTotals) -> GlueTotals {
        GlueTotals {
            normal: self.normal + rhs.normal,
            fil: self.fil + rhs.fil,
            fill: self.fill + rhs.fill,
            filll: self.filll + rhs.filll,
        }
    }
}

impl Sub for GlueTotals {
    type Output = GlueTotals;
    fn sub(self, rhs: GlueTotals) -> GlueTotals {
        GlueTotals {
            normal: self.normal - rhs.normal,
            fil: self.fil - rhs.fil,
            fill: self.fill - rhs.fill,
            filll: self.filll - rhs.filll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulation_keeps_per_order_totals() {
        let mut stretch = GlueTotals::default();
        let mut shrink = GlueTotals::default();
        Glue::new(5.0, 2.0, 1.0).accumulate(&mut shrink, &mut stretch);
        Glue::with_orders(0.0, 1.0, GlueOrder::Fil, 0.0, GlueOrder::Normal)
            .accumulate(&mut shrink, &mut stretch);
        assert_eq!(stretch.normal, 2.0);
        assert_eq!(stretch.fil, 1.0);
        assert_eq!(shrink.normal, 1.0);
    }

    #[test]
    fn higher_orders_dominate() {
        let mut totals = GlueTotals::default();
        assert_eq!(totals.order(), GlueOrder::Normal);
        GlueTotals::add(&mut totals, GlueOrder::Normal, 3.0);
        assert_eq!(totals.order(), GlueOrder::Normal);
        GlueTotals::add(&mut totals, GlueOrder::Fil, 1.0);
        assert_eq!(totals.order(), GlueOrder::Fil);
        GlueTotals::add(&mut totals, GlueOrder::Filll, 0.5);
        assert_eq!(totals.order(), GlueOrder::Filll);
    }

    #[test]
    fn totals_arithmetic() {
        let mut a = GlueTotals::default();
        GlueTotals::add(&mut a, GlueOrder::Normal, 2.0);
        GlueTotals::add(&mut a, GlueOrder::Fil, 1.0);
        let mut b = GlueTotals::default();
        GlueTotals::add(&mut b, GlueOrder::Fil, 1.0);
        let diff = a - b;
        assert_eq!(diff.order(), GlueOrder::Normal);
        assert_eq!(diff.normal, 2.0);
    }
}
