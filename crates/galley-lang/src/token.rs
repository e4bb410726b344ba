//! Tokens and category codes.

/// The category a character belongs to.
///
/// The category determines how the lexer and the macro machinery treat
/// the character. The lexer-internal categories (escape, end of line,
/// ignored, comment, invalid) never survive into tokens except for
/// [CatCode::Invalid], which marks characters the input should not
/// contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatCode {
    /// Marks the beginning of a control sequence. Example: `\`.
    Escape,
    /// Begins a new group. Example: `{`.
    BeginGroup,
    /// Ends an existing group. Example: `}`.
    EndGroup,
    /// Starts or ends math mode. Example: `$`.
    MathShift,
    /// Aligns table cells. Example: `&`.
    AlignmentTab,
    /// Marks a new line in the input. Example: `\n`.
    EndOfLine,
    /// Marks a parameter reference. Example: `#`.
    Parameter,
    /// Puts the following material in a superscript. Example: `^`.
    Superscript,
    /// Puts the following material in a subscript. Example: `_`.
    Subscript,
    /// A character the lexer drops. Example: ASCII null.
    Ignored,
    /// Whitespace. Example: ` `.
    Space,
    /// A character that can appear in a control sequence name.
    /// Examples: `[a-zA-Z]`.
    Letter,
    /// Any other printable character. Example: `@`.
    #[default]
    Other,
    /// A single character that behaves like a control sequence.
    /// Example: `~`.
    Active,
    /// Starts a comment running to the end of the line. Example: `%`.
    Comment,
    /// An invalid character. Example: ASCII delete.
    Invalid,
}

impl CatCode {
    /// The default category of a character, following the plain TeX
    /// assignments.
    pub fn of(c: char) -> CatCode {
        use CatCode::*;
        match c {
            '\\' => Escape,
            '{' => BeginGroup,
            '}' => EndGroup,
            '$' => MathShift,
            '&' => AlignmentTab,
            '\n' | '\r' => EndOfLine,
            '#' => Parameter,
            '^' => Superscript,
            '_' => Subscript,
            '\0' => Ignored,
            ' ' | '\t' => Space,
            '~' => Active,
            '%' => Comment,
            '\u{7F}' => Invalid,
            _ if c.is_alphabetic() => Letter,
            _ => Other,
        }
    }
}

impl std::fmt::Display for CatCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A token: either a control sequence carrying its name, or a character
/// carrying its category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    ControlSequence(String),
    Character(char, CatCode),
}

impl Token {
    pub fn cs(name: impl Into<String>) -> Token {
        Token::ControlSequence(name.into())
    }

    /// A character token with its default category.
    pub fn character(c: char) -> Token {
        Token::Character(c, CatCode::of(c))
    }

    pub fn is_control_sequence(&self) -> bool {
        matches!(self, Token::ControlSequence(_))
    }

    /// The control sequence name, for control sequence tokens.
    pub fn cs_name(&self) -> Option<&str> {
        match self {
            Token::ControlSequence(name) => Some(name),
            Token::Character(..) => None,
        }
    }

    /// The character, for character tokens.
    pub fn char(&self) -> Option<char> {
        match self {
            Token::ControlSequence(_) => None,
            Token::Character(c, _) => Some(*c),
        }
    }

    pub fn cat_code(&self) -> Option<CatCode> {
        match self {
            Token::ControlSequence(_) => None,
            Token::Character(_, cat) => Some(*cat),
        }
    }

    pub fn is_begin_group(&self) -> bool {
        matches!(self, Token::Character(_, CatCode::BeginGroup))
    }

    pub fn is_end_group(&self) -> bool {
        matches!(self, Token::Character(_, CatCode::EndGroup))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::ControlSequence(name) => write!(f, "\\{}", name),
            Token::Character(c, _) => write!(f, "{}", c),
        }
    }
}

/// Writes a token list the way it would appear in the input, for error
/// messages and test failures.
pub fn write_tokens<'a, T: IntoIterator<Item = &'a Token>>(tokens: T) -> String {
    let mut out = String::new();
    let mut after_cs = false;
    for token in tokens {
        match token {
            Token::ControlSequence(name) => {
                out.push('\\');
                out.push_str(name);
                after_cs = true;
            }
            Token::Character(c, _) => {
                if after_cs && c.is_alphabetic() {
                    out.push(' ');
                }
                out.push(*c);
                after_cs = false;
            }
        }
    }
    out
}
