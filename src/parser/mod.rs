/*
    This module parses .lsys grammar files
*/

pub mod lexer;
pub mod validator;

use std::fmt::Display;

use itertools::Itertools;

use crate::error_handling::{Error, ErrorType, Location};
use crate::grammar::*;
use lexer::{LexError, Lexer, Token};
use validator::{IntermediateRuleTable, ValidationError};

#[derive(Debug, PartialEq)]
pub enum ParseErrorType {
    // The grammar does not open with a `%` alphabet declaration
    ExpectedAlphabet,
    // A letter name was needed (after `%`, a `,`, or `$`) but missing
    ExpectedLetterName,
    // The same letter was declared twice in the alphabet
    DuplicateLetter(String),
    // No `@` axiom declaration follows the alphabet
    ExpectedAxiom,
    // An axiom position held something other than a letter or literal
    ExpectedAxiomItem,
    // An axiom item was not followed by `,` or the closing `@`
    ExpectedAxiomSeparator,
    // The file ended before the closing `@`
    UnterminatedAxiom,
    // The axiom used a letter missing from the alphabet
    UnknownLetterInAxiom(String),
    // A rule was declared for a letter missing from the alphabet
    UnknownLetterInRule(String),
    // A second rule was declared for the same letter
    DuplicateRule(String),
    // No `=` follows the rule's letter
    ExpectedEquals,
    // A replacement case used a letter missing from the alphabet
    UnknownLetterInRuleBody(String),
    // A replacement case held no symbols at all
    EmptyCase,
    // A `:` was not followed by a number
    ExpectedWeight,
    // Something other than `|` or `~` followed a case's weight
    ExpectedCaseEnd,
    // A token that cannot appear inside a replacement case
    UnexpectedRuleToken,
    // The file ended before the closing `~`
    UnterminatedRule,
    // Leftover tokens after the last rule block
    TrailingContent,
}

impl ErrorType for ParseErrorType {}

impl Display for ParseErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorType::ExpectedAlphabet => write!(f, "Expected alphabet declaration `%` at the start of the grammar"),
            ParseErrorType::ExpectedLetterName => write!(f, "Expected a letter name"),
            ParseErrorType::DuplicateLetter(name) => write!(f, "Duplicate letter `{}` in alphabet", name),
            ParseErrorType::ExpectedAxiom => write!(f, "Expected axiom declaration `@` after the alphabet"),
            ParseErrorType::ExpectedAxiomItem => write!(f, "Expected a letter or quoted literal in axiom"),
            ParseErrorType::ExpectedAxiomSeparator => write!(f, "Expected `,` or closing `@` in axiom"),
            ParseErrorType::UnterminatedAxiom => write!(f, "Unterminated axiom"),
            ParseErrorType::UnknownLetterInAxiom(name) => write!(f, "Unknown letter `{}` in axiom", name),
            ParseErrorType::UnknownLetterInRule(name) => write!(f, "Unknown letter `{}` in rule", name),
            ParseErrorType::DuplicateRule(name) => write!(f, "Duplicate rule for letter `{}`", name),
            ParseErrorType::ExpectedEquals => write!(f, "Expected `=` after the rule's letter"),
            ParseErrorType::UnknownLetterInRuleBody(name) => write!(f, "Unknown letter `{}` in rule body", name),
            ParseErrorType::EmptyCase => write!(f, "Empty replacement case"),
            ParseErrorType::ExpectedWeight => write!(f, "Expected a number after `:`"),
            ParseErrorType::ExpectedCaseEnd => write!(f, "Expected `|` or `~` after a case's weight"),
            ParseErrorType::UnexpectedRuleToken => write!(f, "Unexpected token in rule body"),
            ParseErrorType::UnterminatedRule => write!(f, "Unterminated rule"),
            ParseErrorType::TrailingContent => write!(f, "Unexpected trailing content"),
        }
    }
}

pub type ParseError = Error<ParseErrorType>;

// The three failure stages of grammar compilation, unified for the caller
#[derive(Debug, PartialEq)]
pub enum GrammarError {
    Lex(LexError),
    Parse(ParseError),
    Validation(ValidationError),
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::Lex(e) => write!(f, "{}", e),
            GrammarError::Parse(e) => write!(f, "{}", e),
            GrammarError::Validation(e) => write!(f, "{}", e),
        }
    }
}

impl From<LexError> for GrammarError {
    fn from(error: LexError) -> Self {
        GrammarError::Lex(error)
    }
}

impl From<ParseError> for GrammarError {
    fn from(error: ParseError) -> Self {
        GrammarError::Parse(error)
    }
}

pub type GrammarErrors = Vec<GrammarError>;

type PResult<T> = std::result::Result<T, GrammarError>;

// Consumes the lexer's token stream in the three fixed phases:
// alphabet, axiom, rules. Fails on the first syntactic problem.
pub struct Parser<'a> {
    tokens: Lexer<'a>,
    // One-slot pushback for the token that ends the alphabet list
    stashed: Option<Token>,
    line: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            tokens: Lexer::new(source),
            stashed: None,
            line: 1,
        }
    }

    fn bump(&mut self) -> PResult<Option<Token>> {
        if let Some(token) = self.stashed.take() {
            return Ok(Some(token));
        }
        match self.tokens.next() {
            None => {
                self.line = self.tokens.line();
                Ok(None)
            }
            Some(Err(error)) => Err(error.into()),
            Some(Ok((token, line))) => {
                self.line = line;
                Ok(Some(token))
            }
        }
    }

    fn stash(&mut self, token: Token) {
        self.stashed = Some(token);
    }

    fn error(&self, error: ParseErrorType) -> GrammarError {
        GrammarError::Parse(Error {
            location: Location { line: self.line },
            error
        })
    }

    fn parse_alphabet(&mut self) -> PResult<Alphabet> {
        match self.bump()? {
            Some(Token::Percent) => {}
            _ => return Err(self.error(ParseErrorType::ExpectedAlphabet)),
        }

        let mut letters = Alphabet::new();
        loop {
            match self.bump()? {
                Some(Token::Ident(name)) => {
                    if letters.contains(&name) {
                        return Err(self.error(ParseErrorType::DuplicateLetter(name)));
                    }
                    letters.push(name);
                }
                _ => return Err(self.error(ParseErrorType::ExpectedLetterName)),
            }
            match self.bump()? {
                Some(Token::Comma) => {}
                Some(token) => {
                    self.stash(token);
                    break;
                }
                None => break,
            }
        }
        Ok(letters)
    }

    fn parse_axiom(&mut self, alphabet: &Alphabet) -> PResult<Generation> {
        match self.bump()? {
            Some(Token::At) => {}
            _ => return Err(self.error(ParseErrorType::ExpectedAxiom)),
        }

        let mut axiom = Generation::new();
        loop {
            match self.bump()? {
                Some(Token::Str(text)) => axiom.push(Symbol::Literal(text)),
                Some(Token::Ident(name)) => {
                    if !alphabet.contains(&name) {
                        return Err(self.error(ParseErrorType::UnknownLetterInAxiom(name)));
                    }
                    axiom.push(Symbol::Letter(name));
                }
                Some(_) => return Err(self.error(ParseErrorType::ExpectedAxiomItem)),
                None => return Err(self.error(ParseErrorType::UnterminatedAxiom)),
            }
            match self.bump()? {
                Some(Token::Comma) => {}
                Some(Token::At) => break,
                Some(_) => return Err(self.error(ParseErrorType::ExpectedAxiomSeparator)),
                None => return Err(self.error(ParseErrorType::UnterminatedAxiom)),
            }
        }
        Ok(axiom)
    }

    // One replacement case, ending at `|` or `~`. Returns the case and
    // whether the rule's closing `~` was reached.
    fn parse_case(&mut self, alphabet: &Alphabet) -> PResult<(ReplacementCase, bool)> {
        let mut symbols = Vec::new();
        loop {
            let (weight, last) = match self.bump()? {
                Some(Token::Str(text)) => {
                    symbols.push(Symbol::Literal(text));
                    continue;
                }
                Some(Token::Ident(name)) => {
                    if !alphabet.contains(&name) {
                        return Err(self.error(ParseErrorType::UnknownLetterInRuleBody(name)));
                    }
                    symbols.push(Symbol::Letter(name));
                    continue;
                }
                Some(Token::Colon) => {
                    let weight = match self.bump()? {
                        Some(Token::Number(value)) => value,
                        _ => return Err(self.error(ParseErrorType::ExpectedWeight)),
                    };
                    let last = match self.bump()? {
                        Some(Token::Pipe) => false,
                        Some(Token::Tilde) => true,
                        Some(_) => return Err(self.error(ParseErrorType::ExpectedCaseEnd)),
                        None => return Err(self.error(ParseErrorType::UnterminatedRule)),
                    };
                    (Some(weight), last)
                }
                Some(Token::Pipe) => (None, false),
                Some(Token::Tilde) => (None, true),
                Some(_) => return Err(self.error(ParseErrorType::UnexpectedRuleToken)),
                None => return Err(self.error(ParseErrorType::UnterminatedRule)),
            };

            if symbols.is_empty() {
                return Err(self.error(ParseErrorType::EmptyCase));
            }
            return Ok((ReplacementCase { symbols, weight }, last));
        }
    }

    fn parse_rule(&mut self, alphabet: &Alphabet) -> PResult<Rule> {
        let mut cases = Rule::new();
        loop {
            let (case, last) = self.parse_case(alphabet)?;
            cases.push(case);
            if last {
                return Ok(cases);
            }
        }
    }

    fn parse_rules(&mut self, alphabet: &Alphabet) -> PResult<IntermediateRuleTable> {
        let mut rules = IntermediateRuleTable::new();
        loop {
            match self.bump()? {
                None => return Ok(rules),
                Some(Token::Dollar) => {}
                Some(_) => return Err(self.error(ParseErrorType::TrailingContent)),
            }

            let letter = match self.bump()? {
                Some(Token::Ident(name)) => name,
                _ => return Err(self.error(ParseErrorType::ExpectedLetterName)),
            };
            let location = Location { line: self.line };
            if !alphabet.contains(&letter) {
                return Err(self.error(ParseErrorType::UnknownLetterInRule(letter)));
            }
            if rules.contains_key(&letter) {
                return Err(self.error(ParseErrorType::DuplicateRule(letter)));
            }
            if self.bump()? != Some(Token::Equals) {
                return Err(self.error(ParseErrorType::ExpectedEquals));
            }

            let rule = self.parse_rule(alphabet)?;
            rules.insert(letter, (rule, location));
        }
    }

    pub fn parse(mut self) -> PResult<(Alphabet, Generation, IntermediateRuleTable)> {
        let alphabet = self.parse_alphabet()?;
        let axiom = self.parse_axiom(&alphabet)?;
        let rules = self.parse_rules(&alphabet)?;
        Ok((alphabet, axiom, rules))
    }
}

// Compiles grammar text into a frozen Grammar. The lexer and parser stop
// at the first problem; the validator reports everything it finds at once.
pub fn parse_grammar(source: &str) -> std::result::Result<Grammar, GrammarErrors> {
    let (alphabet, axiom, rules) = Parser::new(source).parse().map_err(|error| vec![error])?;

    validator::validate(&alphabet, &axiom, &rules).map_err(|errors| {
        errors.into_iter().map(GrammarError::Validation).collect_vec()
    })?;

    let table = rules.into_iter()
        .map(|(letter, (rule, _))| (letter, rule))
        .collect();

    Ok(Grammar {
        alphabet,
        axiom,
        rules: table,
    })
}
