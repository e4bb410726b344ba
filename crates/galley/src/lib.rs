//! # Galley
//!
//! Galley is a paragraph-formation engine in the tradition of Knuth's TeX.
//! It provides the box-and-glue data structures of a typesetting engine,
//! the glue-setting algebra used to fit node lists to a target size,
//! an optimal line breaker, and a traversal that hands positioned leaves
//! to a renderer.
//!
//! The engine is independent of any input language; the `galley-lang`
//! crate builds horizontal lists from a TeX-like token stream and drives
//! this crate to break them into paragraphs.

pub mod dimen;
pub mod font;
pub mod glue;
pub mod layout;
pub mod linebreaks;
pub mod node;
pub mod pack;

pub use dimen::{Dimen, Unit, UnitSystem};
pub use glue::{Glue, GlueOrder, GlueTotals};
pub use node::Node;
