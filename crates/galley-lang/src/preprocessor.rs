//! The macro preprocessor.
//!
//! The preprocessor sits between the lexer and the typesetting machine.
//! Tokens are fed in through [Preprocessor::write]; tokens that survive
//! expansion accumulate in [Preprocessor::output]. The built-in
//! control sequences `\def`, `\gdef`, `\if`, `\iftrue`, `\iffalse`,
//! `\else`, `\fi`, `\csname`, `\endcsname`, `\expandafter` and
//! `\noexpand` are handled here; every other control sequence is looked
//! up in the macro scopes and either expanded or passed through.
//!
//! The state is a stack of frames, one per construct currently being
//! read. Expansion results are inserted at the head of the input
//! queue, so the most recent expansion is consumed before older pending
//! tokens; macros that expand to macro invocations therefore work
//! without any recursion in the host language.
//!
//! Errors are recoverable: the offending frame is popped, its buffered
//! tokens are discarded, and processing continues. A failed argument
//! match resumes at the token that caused the failure.

use crate::texmacro::{parameter_number, Arguments, Macro};
use crate::token::{CatCode, Token};
use std::collections::{HashMap, VecDeque};

/// Error produced while expanding the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessorError {
    /// `\def` was not followed by a control sequence.
    MissingMacroName,
    /// A parameter reference was `#0`, out of order, or past the number
    /// of parameters.
    InvalidParameterIndex { found: Option<char> },
    /// An end-of-group token appeared in a parameter text.
    UnexpectedEndGroup,
    /// `\else`, `\fi` or `\endcsname` outside of their construct.
    StrayControlSequence(String),
    /// A token did not match the literal parameter text of the macro
    /// being expanded.
    ArgumentMismatch { macro_name: String },
    /// An undelimited argument started with an end-of-group token.
    MalformedArgument { macro_name: String },
    /// A non-expandable control sequence appeared between `\csname` and
    /// `\endcsname`.
    NonExpandableInCsName(String),
    /// `endGroup` was called with no group open.
    NoGroupToEnd,
}

impl std::fmt::Display for PreprocessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use PreprocessorError::*;
        match self {
            MissingMacroName => write!(f, "expected a control sequence after \\def"),
            InvalidParameterIndex { found: Some(c) } => {
                write!(f, "invalid parameter reference #{}", c)
            }
            InvalidParameterIndex { found: None } => {
                write!(f, "expected a digit after the parameter character")
            }
            UnexpectedEndGroup => write!(f, "unexpected end of group in a macro definition"),
            StrayControlSequence(name) => write!(f, "stray \\{}", name),
            ArgumentMismatch { macro_name } => {
                write!(f, "argument does not match the definition of \\{}", macro_name)
            }
            MalformedArgument { macro_name } => {
                write!(f, "malformed argument in a call of \\{}", macro_name)
            }
            NonExpandableInCsName(name) => {
                write!(f, "\\{} cannot be expanded inside \\csname", name)
            }
            NoGroupToEnd => write!(f, "no group to end"),
        }
    }
}

impl std::error::Error for PreprocessorError {}

/// The macros defined in one scope.
#[derive(Debug, Default)]
pub struct Definitions {
    macros: HashMap<String, Macro>,
}

/// A token waiting in the input queue. Inert tokens were marked by
/// `\noexpand` and are emitted without being looked up.
#[derive(Debug, Clone)]
struct Pending {
    token: Token,
    inert: bool,
}

/// State of a `\def` being read.
#[derive(Debug)]
struct MacroDefinition {
    global: bool,
    name: Option<String>,
    parameter_text: Vec<Token>,
    replacement_text: Vec<Token>,
    brace_nesting: i32,
    /// The next parameter reference must use this index.
    parameter_index: u32,
    /// A parameter character waiting for its digit.
    pending_parameter: Option<Token>,
    state: DefinitionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefinitionState {
    Name,
    ParameterText,
    ParameterDigit,
    ReplacementText,
    ReplacementDigit,
}

impl MacroDefinition {
    fn new(global: bool) -> MacroDefinition {
        MacroDefinition {
            global,
            name: None,
            parameter_text: Vec::new(),
            replacement_text: Vec::new(),
            brace_nesting: 0,
            parameter_index: 1,
            pending_parameter: None,
            state: DefinitionState::Name,
        }
    }
}

/// State of a macro invocation whose arguments are being captured.
#[derive(Debug)]
struct MacroExpansion {
    tex_macro: Macro,
    /// Index into the parameter text.
    pattern_index: usize,
    /// Index of the argument currently being read.
    argument_index: usize,
    brace_nesting: i32,
    arguments: Arguments,
    state: ExpansionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExpansionState {
    /// Matching a literal token of the parameter text.
    MatchingParameterText,
    /// Waiting for the single token of an undelimited argument.
    ReadingUndelimitedArgument,
    /// Inside the braced group of an undelimited argument.
    ReadingBracedArgument,
    /// Accumulating a delimited argument until the delimiter matches.
    ReadingDelimitedArgument { delimiter: Vec<Token> },
}

impl MacroExpansion {
    fn new(tex_macro: Macro) -> MacroExpansion {
        MacroExpansion {
            tex_macro,
            pattern_index: 0,
            argument_index: 0,
            brace_nesting: 0,
            arguments: Default::default(),
            state: ExpansionState::MatchingParameterText,
        }
    }
}

/// State of a conditional.
#[derive(Debug)]
struct Branching {
    condition: Condition,
    /// True until `\else` is seen at nesting depth zero.
    inside_if: bool,
    /// Depth of conditionals nested inside this one.
    if_nesting: usize,
    /// The tokens of the branch that was taken.
    taken_branch: Vec<Token>,
}

#[derive(Debug)]
enum Condition {
    /// The truth value is known.
    Known(bool),
    /// `\if`: comparing the character codes of the next two tokens.
    Comparing(Option<Token>),
}

impl Branching {
    fn known(success: bool) -> Branching {
        Branching {
            condition: Condition::Known(success),
            inside_if: true,
            if_nesting: 0,
            taken_branch: Vec::new(),
        }
    }

    fn comparing() -> Branching {
        Branching {
            condition: Condition::Comparing(None),
            inside_if: true,
            if_nesting: 0,
            taken_branch: Vec::new(),
        }
    }
}

/// State of a `\csname` assembly.
#[derive(Debug, Default)]
struct CsName {
    name: String,
}

/// State of an `\expandafter`.
#[derive(Debug)]
struct ExpandAfter {
    /// The token to re-insert in front of the expansion.
    stashed: Option<Token>,
    /// Whether a `\noexpand` followed the stashed token.
    noexpand: bool,
    /// Whether a frame performing the single expansion step is on top
    /// of this one.
    expanding: bool,
}

impl ExpandAfter {
    fn new() -> ExpandAfter {
        ExpandAfter {
            stashed: None,
            noexpand: false,
            expanding: false,
        }
    }
}

#[derive(Debug)]
enum Frame {
    ReadingMacro(MacroDefinition),
    ExpandingMacro(MacroExpansion),
    Branching(Branching),
    FormingCs(CsName),
    ExpandingAfter(ExpandAfter),
}

/// The macro preprocessor.
pub struct Preprocessor {
    input: VecDeque<Pending>,
    /// Tokens that survived expansion, in order.
    pub output: Vec<Token>,
    scopes: Vec<Definitions>,
    frames: Vec<Frame>,
    noexpand_next: bool,
}

impl Preprocessor {
    pub fn new() -> Preprocessor {
        Preprocessor {
            input: VecDeque::new(),
            output: Vec::new(),
            scopes: vec![Definitions::default()],
            frames: Vec::new(),
            noexpand_next: false,
        }
    }

    /// Opens a new scope for definitions.
    pub fn begin_group(&mut self) {
        self.scopes.push(Definitions::default());
    }

    /// Closes the innermost scope, dropping its definitions.
    pub fn end_group(&mut self) -> Result<(), PreprocessorError> {
        if self.scopes.len() <= 1 {
            return Err(PreprocessorError::NoGroupToEnd);
        }
        self.scopes.pop();
        Ok(())
    }

    /// Registers a macro in the innermost scope.
    pub fn define(&mut self, m: Macro) {
        self.scopes
            .last_mut()
            .expect("the global scope always exists")
            .macros
            .insert(m.control_sequence().to_string(), m);
    }

    /// Registers a macro in the global scope.
    pub fn define_global(&mut self, m: Macro) {
        self.scopes
            .first_mut()
            .expect("the global scope always exists")
            .macros
            .insert(m.control_sequence().to_string(), m);
    }

    /// Looks a control sequence up, innermost scope first.
    pub fn find(&self, name: &str) -> Option<&Macro> {
        self.scopes.iter().rev().find_map(|s| s.macros.get(name))
    }

    /// Feeds a token. If no input is pending the token is processed
    /// immediately, otherwise it queues behind the pending tokens.
    pub fn write(&mut self, token: Token) -> Result<(), PreprocessorError> {
        if self.input.is_empty() {
            self.process(token, false)
        } else {
            self.input.push_back(Pending {
                token,
                inert: false,
            });
            Ok(())
        }
    }

    /// Processes one pending token.
    pub fn advance(&mut self) -> Result<(), PreprocessorError> {
        match self.input.pop_front() {
            Some(p) => self.process(p.token, p.inert),
            None => Ok(()),
        }
    }

    /// Whether tokens are waiting to be processed.
    pub fn has_pending_input(&self) -> bool {
        !self.input.is_empty()
    }

    /// Whether the preprocessor is between constructs.
    pub fn is_idle(&self) -> bool {
        self.frames.is_empty()
    }

    /// Inserts tokens at the head of the input, to be consumed before
    /// everything already pending.
    fn insert_front(&mut self, tokens: Vec<Token>) {
        for token in tokens.into_iter().rev() {
            self.input.push_front(Pending {
                token,
                inert: false,
            });
        }
    }

    fn process(&mut self, token: Token, inert: bool) -> Result<(), PreprocessorError> {
        match self.frames.last() {
            None => self.process_idle(token, inert),
            Some(Frame::ReadingMacro(_)) => self.read_macro(token),
            Some(Frame::ExpandingMacro(_)) => self.expand_macro(token),
            Some(Frame::Branching(_)) => self.branch(token),
            Some(Frame::FormingCs(_)) => self.form_cs(token),
            Some(Frame::ExpandingAfter(_)) => self.expand_after(token, inert),
        }
    }

    fn process_idle(&mut self, token: Token, inert: bool) -> Result<(), PreprocessorError> {
        if inert || self.noexpand_next {
            self.noexpand_next = false;
            self.output.push(token);
            return Ok(());
        }
        match &token {
            Token::ControlSequence(name) => {
                let name = name.clone();
                self.process_control_sequence(name, token)
            }
            Token::Character(..) => {
                self.output.push(token);
                Ok(())
            }
        }
    }

    fn process_control_sequence(
        &mut self,
        name: String,
        token: Token,
    ) -> Result<(), PreprocessorError> {
        match name.as_str() {
            "def" => {
                self.frames
                    .push(Frame::ReadingMacro(MacroDefinition::new(false)));
                Ok(())
            }
            "gdef" => {
                self.frames
                    .push(Frame::ReadingMacro(MacroDefinition::new(true)));
                Ok(())
            }
            "if" => {
                self.frames.push(Frame::Branching(Branching::comparing()));
                Ok(())
            }
            "iftrue" => {
                self.frames.push(Frame::Branching(Branching::known(true)));
                Ok(())
            }
            "iffalse" => {
                self.frames.push(Frame::Branching(Branching::known(false)));
                Ok(())
            }
            "csname" => {
                self.frames.push(Frame::FormingCs(CsName::default()));
                Ok(())
            }
            "expandafter" => {
                self.frames.push(Frame::ExpandingAfter(ExpandAfter::new()));
                Ok(())
            }
            "noexpand" => {
                self.noexpand_next = true;
                Ok(())
            }
            "else" | "fi" | "endcsname" => Err(PreprocessorError::StrayControlSequence(name)),
            _ => match self.find(&name) {
                Some(m) => {
                    let expansion = MacroExpansion::new(m.clone());
                    self.frames.push(Frame::ExpandingMacro(expansion));
                    self.update_expansion_state()
                }
                None => {
                    self.output.push(token);
                    Ok(())
                }
            },
        }
    }

    /// Whether the control sequence starts a construct that performs
    /// expansion, so that `\expandafter` can delegate to it.
    fn is_expandable(&self, name: &str) -> bool {
        matches!(
            name,
            "if" | "iftrue" | "iffalse" | "csname" | "expandafter"
        ) || self.find(name).is_some()
    }

    // -- \def ---------------------------------------------------------

    fn read_macro(&mut self, token: Token) -> Result<(), PreprocessorError> {
        let definition = match self.frames.last_mut() {
            Some(Frame::ReadingMacro(d)) => d,
            _ => unreachable!("read_macro is only called with a definition frame"),
        };
        match definition.state {
            DefinitionState::Name => match &token {
                Token::ControlSequence(name) => {
                    definition.name = Some(name.clone());
                    definition.state = DefinitionState::ParameterText;
                    Ok(())
                }
                Token::Character(..) => {
                    self.frames.pop();
                    self.process(token, false)?;
                    Err(PreprocessorError::MissingMacroName)
                }
            },
            DefinitionState::ParameterText => match token.cat_code() {
                Some(CatCode::Parameter) => {
                    definition.pending_parameter = Some(token);
                    definition.state = DefinitionState::ParameterDigit;
                    Ok(())
                }
                Some(CatCode::BeginGroup) => {
                    definition.brace_nesting = 1;
                    definition.state = DefinitionState::ReplacementText;
                    Ok(())
                }
                Some(CatCode::EndGroup) => {
                    self.frames.pop();
                    Err(PreprocessorError::UnexpectedEndGroup)
                }
                _ => {
                    definition.parameter_text.push(token);
                    Ok(())
                }
            },
            DefinitionState::ParameterDigit => {
                let expected = definition.parameter_index;
                match parameter_number(&token) {
                    Some(index) if index as u32 == expected => {
                        let parameter = definition
                            .pending_parameter
                            .take()
                            .expect("a parameter character was read");
                        definition.parameter_text.push(parameter);
                        definition.parameter_text.push(token);
                        definition.parameter_index += 1;
                        definition.state = DefinitionState::ParameterText;
                        Ok(())
                    }
                    _ => {
                        let found = token.char();
                        self.frames.pop();
                        Err(PreprocessorError::InvalidParameterIndex { found })
                    }
                }
            }
            DefinitionState::ReplacementText => match token.cat_code() {
                Some(CatCode::BeginGroup) => {
                    definition.brace_nesting += 1;
                    definition.replacement_text.push(token);
                    Ok(())
                }
                Some(CatCode::EndGroup) => {
                    definition.brace_nesting -= 1;
                    if definition.brace_nesting == 0 {
                        self.finish_definition();
                        Ok(())
                    } else {
                        definition.replacement_text.push(token);
                        Ok(())
                    }
                }
                Some(CatCode::Parameter) => {
                    definition.pending_parameter = Some(token);
                    definition.state = DefinitionState::ReplacementDigit;
                    Ok(())
                }
                _ => {
                    definition.replacement_text.push(token);
                    Ok(())
                }
            },
            DefinitionState::ReplacementDigit => {
                let valid = match token.cat_code() {
                    // ## stands for a literal parameter character.
                    Some(CatCode::Parameter) => true,
                    _ => match parameter_number(&token) {
                        Some(index) => (index as u32) < definition.parameter_index,
                        None => false,
                    },
                };
                if valid {
                    let parameter = definition
                        .pending_parameter
                        .take()
                        .expect("a parameter character was read");
                    definition.replacement_text.push(parameter);
                    definition.replacement_text.push(token);
                    definition.state = DefinitionState::ReplacementText;
                    Ok(())
                } else {
                    let found = token.char();
                    self.frames.pop();
                    Err(PreprocessorError::InvalidParameterIndex { found })
                }
            }
        }
    }

    fn finish_definition(&mut self) {
        let definition = match self.frames.pop() {
            Some(Frame::ReadingMacro(d)) => d,
            _ => unreachable!("finish_definition is only called with a definition frame"),
        };
        let name = definition.name.expect("the name was read first");
        let m = Macro::with_parameters(name, definition.parameter_text, definition.replacement_text);
        if definition.global {
            self.define_global(m);
        } else {
            self.define(m);
        }
    }

    // -- macro invocation ---------------------------------------------

    /// Advances the expansion frame to the next thing it waits for, and
    /// performs the replacement once the whole parameter text matched.
    fn update_expansion_state(&mut self) -> Result<(), PreprocessorError> {
        let expansion = match self.frames.last_mut() {
            Some(Frame::ExpandingMacro(e)) => e,
            _ => unreachable!("update_expansion_state is only called with an expansion frame"),
        };
        let pattern = expansion.tex_macro.parameter_text();
        if expansion.pattern_index >= pattern.len() {
            let expansion = match self.frames.pop() {
                Some(Frame::ExpandingMacro(e)) => e,
                _ => unreachable!(),
            };
            let tokens = expansion.tex_macro.expand(&expansion.arguments);
            self.insert_front(tokens);
            self.frame_finished_expanding();
            return Ok(());
        }
        let token = &pattern[expansion.pattern_index];
        if token.cat_code() == Some(CatCode::Parameter) {
            let reference = pattern
                .get(expansion.pattern_index + 1)
                .and_then(parameter_number);
            let index = match reference {
                Some(i) => i,
                // Definitions read by this preprocessor always pair the
                // parameter character with a digit.
                None => {
                    self.frames.pop();
                    return Err(PreprocessorError::InvalidParameterIndex { found: None });
                }
            };
            expansion.argument_index = index - 1;
            // The delimiter is the run of literal tokens after the
            // reference.
            let mut delimiter = Vec::new();
            let mut i = expansion.pattern_index + 2;
            while i < pattern.len() && pattern[i].cat_code() != Some(CatCode::Parameter) {
                delimiter.push(pattern[i].clone());
                i += 1;
            }
            expansion.brace_nesting = 0;
            expansion.state = if delimiter.is_empty() {
                ExpansionState::ReadingUndelimitedArgument
            } else {
                ExpansionState::ReadingDelimitedArgument { delimiter }
            };
        } else {
            expansion.state = ExpansionState::MatchingParameterText;
        }
        Ok(())
    }

    fn expand_macro(&mut self, token: Token) -> Result<(), PreprocessorError> {
        let expansion = match self.frames.last_mut() {
            Some(Frame::ExpandingMacro(e)) => e,
            _ => unreachable!("expand_macro is only called with an expansion frame"),
        };
        match expansion.state.clone() {
            ExpansionState::MatchingParameterText => {
                let expected = &expansion.tex_macro.parameter_text()[expansion.pattern_index];
                if token == *expected {
                    expansion.pattern_index += 1;
                    self.update_expansion_state()
                } else {
                    let macro_name = expansion.tex_macro.control_sequence().to_string();
                    self.frames.pop();
                    self.process(token, false)?;
                    Err(PreprocessorError::ArgumentMismatch { macro_name })
                }
            }
            ExpansionState::ReadingUndelimitedArgument => match token.cat_code() {
                Some(CatCode::BeginGroup) => {
                    expansion.brace_nesting = 1;
                    expansion.state = ExpansionState::ReadingBracedArgument;
                    Ok(())
                }
                Some(CatCode::EndGroup) => {
                    let macro_name = expansion.tex_macro.control_sequence().to_string();
                    self.frames.pop();
                    self.process(token, false)?;
                    Err(PreprocessorError::MalformedArgument { macro_name })
                }
                _ => {
                    expansion.arguments[expansion.argument_index] = vec![token];
                    expansion.pattern_index += 2;
                    self.update_expansion_state()
                }
            },
            ExpansionState::ReadingBracedArgument => match token.cat_code() {
                Some(CatCode::BeginGroup) => {
                    expansion.brace_nesting += 1;
                    expansion.arguments[expansion.argument_index].push(token);
                    Ok(())
                }
                Some(CatCode::EndGroup) => {
                    expansion.brace_nesting -= 1;
                    if expansion.brace_nesting == 0 {
                        // The outer braces are stripped.
                        expansion.pattern_index += 2;
                        self.update_expansion_state()
                    } else {
                        expansion.arguments[expansion.argument_index].push(token);
                        Ok(())
                    }
                }
                _ => {
                    expansion.arguments[expansion.argument_index].push(token);
                    Ok(())
                }
            },
            ExpansionState::ReadingDelimitedArgument { delimiter } => {
                match token.cat_code() {
                    Some(CatCode::BeginGroup) => expansion.brace_nesting += 1,
                    Some(CatCode::EndGroup) => expansion.brace_nesting -= 1,
                    _ => {}
                }
                let argument = &mut expansion.arguments[expansion.argument_index];
                argument.push(token);
                if expansion.brace_nesting == 0 && ends_with(argument, &delimiter) {
                    argument.truncate(argument.len() - delimiter.len());
                    if is_single_group(argument) {
                        argument.pop();
                        argument.remove(0);
                    }
                    expansion.pattern_index += 2 + delimiter.len();
                    self.update_expansion_state()
                } else {
                    Ok(())
                }
            }
        }
    }

    // -- conditionals -------------------------------------------------

    fn branch(&mut self, token: Token) -> Result<(), PreprocessorError> {
        let branching = match self.frames.last_mut() {
            Some(Frame::Branching(b)) => b,
            _ => unreachable!("branch is only called with a branching frame"),
        };
        match &branching.condition {
            Condition::Comparing(None) => {
                branching.condition = Condition::Comparing(Some(token));
                return Ok(());
            }
            Condition::Comparing(Some(first)) => {
                // \if compares character codes; any two control
                // sequences compare equal.
                let equal = match (first.char(), token.char()) {
                    (Some(a), Some(b)) => a == b,
                    (None, None) => true,
                    _ => false,
                };
                branching.condition = Condition::Known(equal);
                return Ok(());
            }
            Condition::Known(_) => {}
        }
        let success = match &branching.condition {
            Condition::Known(s) => *s,
            Condition::Comparing(_) => unreachable!(),
        };
        match token.cs_name() {
            Some("if") | Some("iftrue") | Some("iffalse") => {
                branching.if_nesting += 1;
                if branching.inside_if == success {
                    branching.taken_branch.push(token);
                }
                Ok(())
            }
            Some("fi") => {
                if branching.if_nesting > 0 {
                    branching.if_nesting -= 1;
                    if branching.inside_if == success {
                        branching.taken_branch.push(token);
                    }
                    Ok(())
                } else {
                    let branching = match self.frames.pop() {
                        Some(Frame::Branching(b)) => b,
                        _ => unreachable!(),
                    };
                    self.insert_front(branching.taken_branch);
                    self.frame_finished_expanding();
                    Ok(())
                }
            }
            Some("else") => {
                if branching.if_nesting > 0 {
                    if branching.inside_if == success {
                        branching.taken_branch.push(token);
                    }
                } else {
                    branching.inside_if = false;
                }
                Ok(())
            }
            _ => {
                if branching.inside_if == success {
                    branching.taken_branch.push(token);
                }
                Ok(())
            }
        }
    }

    // -- \csname ------------------------------------------------------

    fn form_cs(&mut self, token: Token) -> Result<(), PreprocessorError> {
        match &token {
            Token::ControlSequence(name) if name == "endcsname" => {
                let cs_name = match self.frames.pop() {
                    Some(Frame::FormingCs(c)) => c,
                    _ => unreachable!("form_cs is only called with a csname frame"),
                };
                self.insert_front(vec![Token::ControlSequence(cs_name.name)]);
                self.frame_finished_expanding();
                Ok(())
            }
            Token::ControlSequence(name) => {
                // Macros expand; their output flows back into the name.
                match self.find(name) {
                    Some(m) => {
                        let expansion = MacroExpansion::new(m.clone());
                        self.frames.push(Frame::ExpandingMacro(expansion));
                        self.update_expansion_state()
                    }
                    None => {
                        let name = name.clone();
                        self.frames.pop();
                        Err(PreprocessorError::NonExpandableInCsName(name))
                    }
                }
            }
            Token::Character(c, _) => {
                let cs_name = match self.frames.last_mut() {
                    Some(Frame::FormingCs(c)) => c,
                    _ => unreachable!("form_cs is only called with a csname frame"),
                };
                cs_name.name.push(*c);
                Ok(())
            }
        }
    }

    // -- \expandafter -------------------------------------------------

    fn expand_after(&mut self, token: Token, inert: bool) -> Result<(), PreprocessorError> {
        let expand_after = match self.frames.last_mut() {
            Some(Frame::ExpandingAfter(e)) => e,
            _ => unreachable!("expand_after is only called with an expandafter frame"),
        };
        if expand_after.stashed.is_none() {
            expand_after.stashed = Some(token);
            return Ok(());
        }
        if !expand_after.noexpand && token.cs_name() == Some("noexpand") {
            expand_after.noexpand = true;
            return Ok(());
        }
        let noexpand = expand_after.noexpand;
        let name = token.cs_name().map(|s| s.to_string());
        let expandable = match &name {
            Some(n) => !noexpand && !inert && self.is_expandable(n),
            None => false,
        };
        let expand_after = match self.frames.last_mut() {
            Some(Frame::ExpandingAfter(e)) => e,
            _ => unreachable!(),
        };
        if !expandable {
            // One expansion step of a non-expandable token is the token
            // itself; \noexpand additionally marks it inert.
            let inert_result = expand_after.noexpand;
            let stashed = expand_after.stashed.take().expect("stashed above");
            self.frames.pop();
            self.input.push_front(Pending {
                token,
                inert: inert_result,
            });
            self.input.push_front(Pending {
                token: stashed,
                inert: false,
            });
            self.frame_finished_expanding();
            return Ok(());
        }
        // Delegate the single expansion step to the construct's own
        // frame; the stashed token is re-inserted when it finishes.
        expand_after.expanding = true;
        let name = name.expect("expandable tokens are control sequences");
        match name.as_str() {
            "if" => self.frames.push(Frame::Branching(Branching::comparing())),
            "iftrue" => self.frames.push(Frame::Branching(Branching::known(true))),
            "iffalse" => self.frames.push(Frame::Branching(Branching::known(false))),
            "csname" => self.frames.push(Frame::FormingCs(CsName::default())),
            "expandafter" => self.frames.push(Frame::ExpandingAfter(ExpandAfter::new())),
            _ => {
                let m = self.find(&name).expect("is_expandable checked").clone();
                let expansion = MacroExpansion::new(m);
                self.frames.push(Frame::ExpandingMacro(expansion));
                return self.update_expansion_state();
            }
        }
        Ok(())
    }

    /// Called after a frame finished by inserting its result into the
    /// input. If an `\expandafter` was waiting on that frame, its
    /// stashed token is placed in front of the result.
    fn frame_finished_expanding(&mut self) {
        if let Some(Frame::ExpandingAfter(e)) = self.frames.last() {
            if e.expanding && e.stashed.is_some() {
                let mut expand_after = match self.frames.pop() {
                    Some(Frame::ExpandingAfter(e)) => e,
                    _ => unreachable!(),
                };
                let stashed = expand_after.stashed.take().expect("checked above");
                self.input.push_front(Pending {
                    token: stashed,
                    inert: false,
                });
                self.frame_finished_expanding();
            }
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Preprocessor::new()
    }
}

/// Whether `tokens` ends with `suffix`, comparing token values.
fn ends_with(tokens: &[Token], suffix: &[Token]) -> bool {
    tokens.len() >= suffix.len() && tokens[tokens.len() - suffix.len()..] == *suffix
}

/// Whether the list is exactly one brace-balanced group.
fn is_single_group(tokens: &[Token]) -> bool {
    if tokens.len() < 2 || !tokens[0].is_begin_group() || !tokens[tokens.len() - 1].is_end_group() {
        return false;
    }
    let mut depth = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_begin_group() {
            depth += 1;
        } else if token.is_end_group() {
            depth -= 1;
            if depth == 0 && i != tokens.len() - 1 {
                return false;
            }
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    /// Feeds the input through the preprocessor, draining all pending
    /// expansions, and returns the output tokens. Errors abort the
    /// test.
    fn expand(input: &str) -> Vec<Token> {
        let mut pp = Preprocessor::new();
        feed(&mut pp, input).unwrap();
        pp.output
    }

    fn feed(pp: &mut Preprocessor, input: &str) -> Result<(), PreprocessorError> {
        for token in tokenize(input) {
            pp.write(token)?;
            while pp.has_pending_input() {
                pp.advance()?;
            }
        }
        Ok(())
    }

    macro_rules! expansion_tests {
        ( $( ( $name: ident, $input: expr, $want: expr ), )+ ) => {
            $(
            #[test]
            fn $name() {
                assert_eq!(expand($input), tokenize($want));
            }
            )+
        };
    }

    expansion_tests![
        (
            characters_pass_through,
            "hello",
            "hello"
        ),
        (
            unknown_control_sequence_passes_through,
            r"\mystery",
            r"\mystery"
        ),
        (
            parameterless_macro,
            r"\def\a{xy}\a\a",
            "xyxy"
        ),
        (
            macro_arguments_are_reordered,
            r"\def\foo#1#2{[#2,#1]}\foo A{BC}",
            "[BC,A]"
        ),
        (
            macros_expand_recursively,
            r"\def\a{X}\def\b{\a\a}\b",
            "XX"
        ),
        (
            delimited_arguments,
            r"\def\pair#1,#2.{(#1;#2)}\pair ab,cd.",
            "(ab;cd)"
        ),
        (
            delimited_argument_strips_outer_braces,
            r"\def\wrap#1X{<#1>}\wrap{ab}X",
            "<ab>"
        ),
        (
            delimited_argument_keeps_inner_groups,
            r"\def\wrap#1X{<#1>}\wrap{a}{b}X",
            "<{a}{b}>"
        ),
        (
            undelimited_argument_takes_a_group,
            r"\def\id#1{#1}\id{abc}",
            "abc"
        ),
        (
            iftrue_takes_the_first_branch,
            r"\iftrue A\else B\fi",
            "A"
        ),
        (
            iffalse_takes_the_else_branch,
            r"\iffalse A\else B\fi",
            "B"
        ),
        (
            iffalse_without_else_produces_nothing,
            r"\iffalse A\fi B",
            "B"
        ),
        (
            nested_conditionals,
            r"\iftrue A\iffalse B\fi C\else D\fi",
            "AC"
        ),
        (
            if_compares_character_codes,
            r"\if aaT\else F\fi\if abT\else F\fi",
            "TF"
        ),
        (
            csname_forms_a_control_sequence,
            r"\def\hello{H}\csname hello\endcsname",
            "H"
        ),
        (
            csname_name_can_come_from_a_macro,
            r"\def\hello{H}\def\name{hello}\csname\name\endcsname",
            "H"
        ),
        (
            expandafter_expands_the_second_token_once,
            r"\def\a{X}\def\b{\a}\expandafter\c\b",
            r"\c X"
        ),
        (
            expandafter_over_a_character,
            r"\expandafter zy",
            "zy"
        ),
        (
            expandafter_reaches_into_a_conditional,
            r"\expandafter\a\iftrue B\else C\fi",
            r"\a B"
        ),
        (
            noexpand_suppresses_one_expansion,
            r"\def\a{X}\noexpand\a\a",
            r"\a X"
        ),
        (
            macro_replacement_can_contain_a_group,
            r"\def\a{{b}}\a",
            "{b}"
        ),
    ];

    #[test]
    fn definitions_are_scoped() {
        let mut pp = Preprocessor::new();
        feed(&mut pp, r"\def\x{1}\x").unwrap();
        pp.begin_group();
        feed(&mut pp, r"\def\x{2}\x").unwrap();
        pp.end_group().unwrap();
        feed(&mut pp, r"\x").unwrap();
        assert_eq!(pp.output, tokenize("121"));
    }

    #[test]
    fn gdef_defines_in_the_global_scope() {
        let mut pp = Preprocessor::new();
        pp.begin_group();
        feed(&mut pp, r"\gdef\y{Z}").unwrap();
        pp.end_group().unwrap();
        feed(&mut pp, r"\y").unwrap();
        assert_eq!(pp.output, tokenize("Z"));
    }

    #[test]
    fn ending_the_global_scope_is_an_error() {
        let mut pp = Preprocessor::new();
        assert_eq!(pp.end_group(), Err(PreprocessorError::NoGroupToEnd));
    }

    #[test]
    fn literal_mismatch_aborts_the_expansion() {
        let mut pp = Preprocessor::new();
        feed(&mut pp, r"\def\m A{ok}").unwrap();
        let err = feed(&mut pp, r"\m B");
        assert_eq!(
            err,
            Err(PreprocessorError::ArgumentMismatch {
                macro_name: "m".into()
            })
        );
        // processing resumed at the offending token
        assert_eq!(pp.output, tokenize("B"));
        assert!(pp.is_idle());
    }

    #[test]
    fn invalid_parameter_index_aborts_the_definition() {
        let mut pp = Preprocessor::new();
        let err = feed(&mut pp, r"\def\m#2{x}");
        assert_eq!(
            err,
            Err(PreprocessorError::InvalidParameterIndex { found: Some('2') })
        );
        assert!(pp.is_idle());
        // the malformed macro was not defined
        assert!(pp.find("m").is_none());
    }

    #[test]
    fn parameter_zero_is_invalid() {
        let mut pp = Preprocessor::new();
        let err = feed(&mut pp, r"\def\m#0{x}");
        assert_eq!(
            err,
            Err(PreprocessorError::InvalidParameterIndex { found: Some('0') })
        );
    }

    #[test]
    fn stray_fi_is_reported() {
        let mut pp = Preprocessor::new();
        let err = feed(&mut pp, r"\fi");
        assert_eq!(
            err,
            Err(PreprocessorError::StrayControlSequence("fi".into()))
        );
        assert!(pp.is_idle());
    }

    #[test]
    fn non_expandable_in_csname_is_reported() {
        let mut pp = Preprocessor::new();
        let err = feed(&mut pp, r"\csname a\mystery b\endcsname");
        assert_eq!(
            err,
            Err(PreprocessorError::NonExpandableInCsName("mystery".into()))
        );
    }

    #[test]
    fn arguments_round_trip_through_the_parameter_text() {
        // Substituting the captured arguments back into the parameter
        // text reproduces the tokens the invocation consumed.
        let mut pp = Preprocessor::new();
        feed(&mut pp, r"\def\pair#1,#2.{#1,#2.}").unwrap();
        let consumed = "ab,cd.";
        feed(&mut pp, &format!(r"\pair {}", consumed)).unwrap();
        // The replacement text here is exactly the parameter text, so
        // the output is the round-tripped prefix.
        assert_eq!(pp.output, tokenize(consumed));
    }
}
