//! The lexer.
//!
//! The lexer converts input characters into tokens one character at a
//! time: characters arrive through [Lexer::write] and finished tokens
//! accumulate in an output queue. Because the conversion is driven by
//! the caller, the lexer can be fed from any source and restarted at
//! any point; it buffers nothing beyond the name of the control
//! sequence currently being read.
//!
//! A run of blank input lines produces a `\par` control sequence, one
//! per blank line, the conventional paragraph separator.

use crate::token::{CatCode, Token};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Reading ordinary material.
    Normal,
    /// Reading a control sequence name, started by an escape character.
    ControlSequence,
    /// Discarding a comment, up to the end of the line.
    Comment,
    /// Skipping a run of spaces and line endings. `seen_newline` is
    /// true once one line ending has been consumed; each further line
    /// ending is a blank line and produces `\par`.
    SkippingBlanks { seen_newline: bool },
}

/// The character-driven tokenizer.
pub struct Lexer {
    state: State,
    // Control sequence names are read into a reusable buffer.
    buffer: String,
    output: VecDeque<Token>,
}

impl Lexer {
    pub fn new() -> Lexer {
        Lexer {
            state: State::Normal,
            buffer: String::new(),
            output: VecDeque::new(),
        }
    }

    /// Feeds one character.
    pub fn write(&mut self, c: char) {
        self.process(c);
    }

    /// Feeds every character of a string.
    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.process(c);
        }
    }

    /// Signals the end of the input, flushing a control sequence name
    /// still being read.
    pub fn end(&mut self) {
        if self.state == State::ControlSequence {
            self.emit_control_sequence();
        }
        self.state = State::Normal;
    }

    /// Pops the next finished token.
    pub fn pop(&mut self) -> Option<Token> {
        self.output.pop_front()
    }

    /// Discards all pending state and output.
    pub fn reset(&mut self) {
        self.state = State::Normal;
        self.buffer.clear();
        self.output.clear();
    }

    fn emit_control_sequence(&mut self) {
        let name = std::mem::take(&mut self.buffer);
        self.output.push_back(Token::ControlSequence(name));
    }

    fn process(&mut self, c: char) {
        let cat = CatCode::of(c);
        match self.state {
            State::Normal => self.process_normal(c, cat),
            State::ControlSequence => match cat {
                CatCode::Letter => self.buffer.push(c),
                _ if self.buffer.is_empty() => {
                    // A single non-letter character forms the whole name.
                    self.buffer.push(c);
                    self.emit_control_sequence();
                    self.state = match cat {
                        CatCode::Space => State::SkippingBlanks {
                            seen_newline: false,
                        },
                        _ => State::Normal,
                    };
                }
                CatCode::Space => {
                    // The space terminating a name is consumed.
                    self.emit_control_sequence();
                    self.state = State::SkippingBlanks {
                        seen_newline: false,
                    };
                }
                CatCode::EndOfLine => {
                    self.emit_control_sequence();
                    self.state = State::SkippingBlanks { seen_newline: true };
                }
                _ => {
                    self.emit_control_sequence();
                    self.state = State::Normal;
                    self.process_normal(c, cat);
                }
            },
            State::Comment => {
                if cat == CatCode::EndOfLine {
                    self.state = State::SkippingBlanks { seen_newline: true };
                }
            }
            State::SkippingBlanks { seen_newline } => match cat {
                CatCode::Space => {}
                CatCode::EndOfLine => {
                    if seen_newline {
                        self.output.push_back(Token::cs("par"));
                    } else {
                        self.state = State::SkippingBlanks { seen_newline: true };
                    }
                }
                _ => {
                    self.state = State::Normal;
                    self.process_normal(c, cat);
                }
            },
        }
    }

    fn process_normal(&mut self, c: char, cat: CatCode) {
        match cat {
            CatCode::Escape => {
                self.buffer.clear();
                self.state = State::ControlSequence;
            }
            CatCode::Comment => self.state = State::Comment,
            CatCode::Space => {
                self.output.push_back(Token::Character(' ', CatCode::Space));
                self.state = State::SkippingBlanks {
                    seen_newline: false,
                };
            }
            CatCode::EndOfLine => {
                self.output.push_back(Token::Character(' ', CatCode::Space));
                self.state = State::SkippingBlanks { seen_newline: true };
            }
            CatCode::Ignored => {}
            _ => self.output.push_back(Token::Character(c, cat)),
        }
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Lexer::new()
    }
}

/// Tokenizes an entire string.
pub fn tokenize(s: &str) -> Vec<Token> {
    let mut lexer = Lexer::new();
    lexer.write_str(s);
    lexer.end();
    let mut tokens = Vec::new();
    while let Some(t) = lexer.pop() {
        tokens.push(t);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::CatCode::*;

    #[derive(Debug, PartialEq)]
    enum Tok {
        Cs(&'static str),
        Ch(char, CatCode),
    }
    use Tok::{Ch, Cs};

    fn lex(input: &str) -> Vec<Token> {
        tokenize(input)
    }

    macro_rules! lexer_tests {
        ( $( ( $name: ident, $input: expr, $( $expected: expr, )* ), )+ ) => {
            $(
            #[test]
            fn $name() {
                let got: Vec<Tok> = lex($input)
                    .into_iter()
                    .map(|t| match t {
                        Token::ControlSequence(name) => {
                            Tok::Cs(Box::leak(name.into_boxed_str()))
                        }
                        Token::Character(c, cat) => Tok::Ch(c, cat),
                    })
                    .collect();
                let want = vec![ $( $expected ),* ];
                assert_eq!(got, want);
            }
            )+
        };
    }

    lexer_tests![
        (
            control_sequence_basic,
            r"\a{b}",
            Cs("a"),
            Ch('{', BeginGroup),
            Ch('b', Letter),
            Ch('}', EndGroup),
        ),
        (
            control_sequence_trailing_space_is_eaten,
            r"\ABC {D}",
            Cs("ABC"),
            Ch('{', BeginGroup),
            Ch('D', Letter),
            Ch('}', EndGroup),
        ),
        (
            control_sequence_single_other,
            r"\{{",
            Cs("{"),
            Ch('{', BeginGroup),
        ),
        (
            control_sequence_at_end_of_input,
            r"ab\par",
            Ch('a', Letter),
            Ch('b', Letter),
            Cs("par"),
        ),
        (
            comment_runs_to_end_of_line,
            "A%comment { } $\nB",
            Ch('A', Letter),
            Ch('B', Letter),
        ),
        (
            comment_consumes_the_line_ending,
            "A%\nB",
            Ch('A', Letter),
            Ch('B', Letter),
        ),
        (
            blank_line_after_comment_is_a_par,
            "A%\n\n B",
            Ch('A', Letter),
            Cs("par"),
            Ch('B', Letter),
        ),
        (
            double_space_collapses,
            "A  B",
            Ch('A', Letter),
            Ch(' ', Space),
            Ch('B', Letter),
        ),
        (
            newline_is_a_space,
            "A\nB",
            Ch('A', Letter),
            Ch(' ', Space),
            Ch('B', Letter),
        ),
        (
            blank_line_is_a_par,
            "A\n\nB",
            Ch('A', Letter),
            Ch(' ', Space),
            Cs("par"),
            Ch('B', Letter),
        ),
        (
            every_extra_blank_line_is_a_par,
            "A\n\n\nB",
            Ch('A', Letter),
            Ch(' ', Space),
            Cs("par"),
            Cs("par"),
            Ch('B', Letter),
        ),
        (
            space_then_newline_is_one_space,
            "A \nB",
            Ch('A', Letter),
            Ch(' ', Space),
            Ch('B', Letter),
        ),
        (
            parameter_and_specials,
            r"#1$^_&~",
            Ch('#', Parameter),
            Ch('1', Other),
            Ch('$', MathShift),
            Ch('^', Superscript),
            Ch('_', Subscript),
            Ch('&', AlignmentTab),
            Ch('~', Active),
        ),
        (
            invalid_character_yields_an_invalid_token,
            "a\u{7F}b",
            Ch('a', Letter),
            Ch('\u{7F}', Invalid),
            Ch('b', Letter),
        ),
        (
            ignored_character_is_dropped,
            "a\0b",
            Ch('a', Letter),
            Ch('b', Letter),
        ),
        (
            control_sequence_does_not_span_lines,
            "\\A\nB",
            Cs("A"),
            Ch('B', Letter),
        ),
    ];

    #[test]
    fn restartable_between_writes() {
        let mut lexer = Lexer::new();
        lexer.write_str(r"\al");
        lexer.write_str("pha");
        lexer.write(' ');
        let mut tokens = Vec::new();
        while let Some(t) = lexer.pop() {
            tokens.push(t);
        }
        assert_eq!(tokens, vec![Token::cs("alpha")]);
    }
}
