//! # Galley-lang
//!
//! A TeX-like input language for the Galley typesetting engine.
//!
//! The crate provides the front half of the paragraph-formation
//! pipeline: a restartable [lexer](lexer::Lexer) that turns characters
//! into tokens, a [macro preprocessor](preprocessor::Preprocessor) that
//! expands user-defined macros and conditionals, character-driven
//! [parsers](parse) for dimensions, glue and paragraph shapes, and a
//! [typesetting machine](machine::TypesettingMachine) that converts the
//! expanded token stream into horizontal lists and hands finished
//! paragraphs to the engine's line breaker.

pub mod lexer;
pub mod machine;
pub mod parse;
pub mod preprocessor;
pub mod texmacro;
pub mod token;

pub use lexer::Lexer;
pub use preprocessor::Preprocessor;
pub use texmacro::Macro;
pub use token::{CatCode, Token};
