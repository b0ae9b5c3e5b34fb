use std::fmt::Display;
use std::iter::Peekable;
use std::str::Chars;

use itertools::Itertools;

use crate::error_handling::{Error, ErrorType, Location};

#[derive(Debug, PartialEq)]
pub enum LexErrorType {
    // A quoted literal ran into a line break or the end of the file
    UnterminatedString,
    // A character outside a quoted literal that starts no token
    IllegalCharacter(char),
    // A number with a decimal point but no fractional digits
    MalformedNumber(String),
}

impl ErrorType for LexErrorType {}

impl Display for LexErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErrorType::UnterminatedString => write!(f, "Unterminated quoted literal"),
            LexErrorType::IllegalCharacter(c) => write!(f, "Illegal character `{}`", c),
            LexErrorType::MalformedNumber(text) => write!(f, "Malformed number `{}`", text),
        }
    }
}

pub type LexError = Error<LexErrorType>;
pub type LexResult<T> = std::result::Result<T, LexError>;

#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    Percent,
    At,
    Dollar,
    Equals,
    Pipe,
    Tilde,
    Colon,
    Comma,
    Ident(String),
    Str(String),
    Number(f64),
}

// Turns grammar text into tokens, one pass, on demand. Lines whose first
// non-whitespace character is `#` are dropped whole; `#` anywhere else is
// an illegal character.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    fresh_line: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            fresh_line: true,
        }
    }

    // The line the most recently produced token started on
    pub fn line(&self) -> usize {
        self.line
    }

    fn error(&self, error: LexErrorType) -> LexError {
        Error {
            location: Location { line: self.line },
            error
        }
    }

    fn lex_string(&mut self) -> LexResult<Token> {
        self.chars.next(); // Consume open quote
        let text = self.chars.peeking_take_while(|&c| c != '\"' && c != '\n').collect();

        // Check if there is a close quote and consume it if there is
        if self.chars.next() != Some('\"') {
            return Err(self.error(LexErrorType::UnterminatedString));
        }

        Ok(Token::Str(text))
    }

    fn lex_ident(&mut self) -> Token {
        let text = self.chars
            .peeking_take_while(|&c| c.is_ascii_alphanumeric() || c == '_')
            .collect();
        Token::Ident(text)
    }

    fn lex_number(&mut self) -> LexResult<Token> {
        let mut text: String = self.chars
            .peeking_take_while(|c| c.is_ascii_digit())
            .collect();

        if self.chars.peek() == Some(&'.') {
            self.chars.next();
            text.push('.');
            let fraction: String = self.chars
                .peeking_take_while(|c| c.is_ascii_digit())
                .collect();
            if fraction.is_empty() {
                return Err(self.error(LexErrorType::MalformedNumber(text)));
            }
            text.push_str(&fraction);
        }

        let value = text.parse()
            .map_err(|_| self.error(LexErrorType::MalformedNumber(text)))?;
        Ok(Token::Number(value))
    }

    fn lex_token(&mut self, c: char) -> LexResult<Token> {
        let punctuation = match c {
            '%' => Some(Token::Percent),
            '@' => Some(Token::At),
            '$' => Some(Token::Dollar),
            '=' => Some(Token::Equals),
            '|' => Some(Token::Pipe),
            '~' => Some(Token::Tilde),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            _ => None
        };
        if let Some(token) = punctuation {
            self.chars.next();
            return Ok(token);
        }

        if c == '\"' {
            self.lex_string()
        } else if c.is_ascii_alphabetic() || c == '_' {
            Ok(self.lex_ident())
        } else if c.is_ascii_digit() {
            self.lex_number()
        } else {
            Err(self.error(LexErrorType::IllegalCharacter(c)))
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = LexResult<(Token, usize)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let &c = self.chars.peek()?;
            if c == '\n' {
                self.chars.next();
                self.line += 1;
                self.fresh_line = true;
            } else if c.is_whitespace() {
                self.chars.next();
            } else if c == '#' && self.fresh_line {
                self.chars.peeking_take_while(|&c| c != '\n').for_each(drop);
            } else {
                self.fresh_line = false;
                let line = self.line;
                return Some(self.lex_token(c).map(|token| (token, line)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    fn lex(source: &str) -> LexResult<Vec<Token>> {
        Lexer::new(source).map(|item| item.map(|(token, _)| token)).collect()
    }

    fn ident(text: &str) -> Token {
        Token::Ident(text.to_string())
    }

    fn string(text: &str) -> Token {
        Token::Str(text.to_string())
    }

    #[test]
    fn lex_normal_strings() {
        let sources = vec![
            "\"alpha\" bravo",
            "\"\"",
            "\"dog \"\"cat \"",
            "\"back\\slash\""
        ];
        let answers = vec![
            vec![string("alpha"), ident("bravo")],
            vec![string("")],
            vec![string("dog "), string("cat ")],
            vec![string("back\\slash")]
        ];

        for (source, answer) in zip(sources, answers) {
            assert_eq!(lex(source).unwrap(), answer);
        }
    }

    #[test]
    fn lex_unterminated_string() {
        let sources = vec![
            "\"welcome",
            "\"split\nacross\"",
        ];

        for source in sources {
            assert_eq!(lex(source).unwrap_err().error, LexErrorType::UnterminatedString);
        }
    }

    #[test]
    fn lex_punctuation_run() {
        assert_eq!(lex("% @ $ = | ~ : ,").unwrap(), vec![
            Token::Percent,
            Token::At,
            Token::Dollar,
            Token::Equals,
            Token::Pipe,
            Token::Tilde,
            Token::Colon,
            Token::Comma
        ]);
    }

    #[test]
    fn lex_idents() {
        assert_eq!(lex("NOUN _x a1_b").unwrap(), vec![
            ident("NOUN"),
            ident("_x"),
            ident("a1_b")
        ]);
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(lex("1 25 0.5 3.25").unwrap(), vec![
            Token::Number(1.0),
            Token::Number(25.0),
            Token::Number(0.5),
            Token::Number(3.25)
        ]);
    }

    #[test]
    fn lex_malformed_number() {
        let error = lex("12. ").unwrap_err().error;
        assert_eq!(error, LexErrorType::MalformedNumber("12.".to_string()));
    }

    #[test]
    fn lex_comment_lines() {
        let source = "# whole line ignored\n%A\n  # indented comment\n@A@";
        assert_eq!(lex(source).unwrap(), vec![
            Token::Percent,
            ident("A"),
            Token::At,
            ident("A"),
            Token::At
        ]);
    }

    #[test]
    fn lex_hash_mid_line_is_illegal() {
        let error = lex("%A # not a comment").unwrap_err().error;
        assert_eq!(error, LexErrorType::IllegalCharacter('#'));
    }

    #[test]
    fn lex_illegal_character() {
        let error = lex("%A\n!").unwrap_err();
        assert_eq!(error.error, LexErrorType::IllegalCharacter('!'));
        assert_eq!(error.location.line, 2);
    }

    #[test]
    fn lex_tracks_lines() {
        let lines: Vec<usize> = Lexer::new("%A\n@A@\n\n$A = \"x\" ~")
            .map(|item| item.unwrap().1)
            .collect();
        assert_eq!(lines, vec![1, 1, 2, 2, 2, 4, 4, 4, 4, 4]);
    }
}
