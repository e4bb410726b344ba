//! User defined macros.
//!
//! A macro is a control sequence name, a parameter text and a
//! replacement text. The parameter text alternates literal tokens with
//! parameter references `#1`..`#9`; a reference followed by literal
//! tokens is delimited by them, a reference followed by another
//! reference (or ending the text) consumes a single balanced token.
//! Both texts store their tokens exactly as written; `##` stands for a
//! literal parameter character.

use crate::token::{CatCode, Token};

/// The nine argument buffers of a macro expansion.
pub type Arguments = [Vec<Token>; 9];

/// A user defined macro.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    control_sequence: String,
    parameter_text: Vec<Token>,
    replacement_text: Vec<Token>,
}

impl Macro {
    /// A macro without parameters.
    pub fn new(control_sequence: impl Into<String>, replacement_text: Vec<Token>) -> Macro {
        Macro {
            control_sequence: control_sequence.into(),
            parameter_text: Vec::new(),
            replacement_text,
        }
    }

    pub fn with_parameters(
        control_sequence: impl Into<String>,
        parameter_text: Vec<Token>,
        replacement_text: Vec<Token>,
    ) -> Macro {
        Macro {
            control_sequence: control_sequence.into(),
            parameter_text,
            replacement_text,
        }
    }

    pub fn control_sequence(&self) -> &str {
        &self.control_sequence
    }

    pub fn parameter_text(&self) -> &[Token] {
        &self.parameter_text
    }

    pub fn replacement_text(&self) -> &[Token] {
        &self.replacement_text
    }

    /// The replacement text with every parameter reference replaced by
    /// the corresponding argument.
    pub fn expand(&self, arguments: &Arguments) -> Vec<Token> {
        let mut result = Vec::with_capacity(self.replacement_text.len());
        let mut i = 0;
        while i < self.replacement_text.len() {
            let token = &self.replacement_text[i];
            if token.cat_code() == Some(CatCode::Parameter) {
                match self.replacement_text.get(i + 1) {
                    Some(next) if next.cat_code() == Some(CatCode::Parameter) => {
                        // ## stands for a literal parameter character.
                        result.push(token.clone());
                        i += 2;
                        continue;
                    }
                    Some(next) => {
                        if let Some(index) = parameter_number(next) {
                            result.extend(arguments[index - 1].iter().cloned());
                            i += 2;
                            continue;
                        }
                    }
                    None => {}
                }
            }
            result.push(token.clone());
            i += 1;
        }
        result
    }
}

/// The parameter number referenced by a digit token, if it is one of
/// `1`..`9`.
pub(crate) fn parameter_number(token: &Token) -> Option<usize> {
    match token.char() {
        Some(c @ '1'..='9') => Some(c as usize - '0' as usize),
        _ => None,
    }
}
