use tracing::debug;

use crate::error::{InterpretError, Position};
use crate::token::{lookup_identifier, Token, TokenKind};

/// Lexer state: tracks the byte offset in the input plus the 1-based
/// line/column of the next unread character.
struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

/// Convert source text into located tokens, ending with an `Eof` token.
///
/// Scanning stops at the first lexical fault; no tokens are returned then.
#[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn tokenize(input: &str) -> Result<Vec<Token>, InterpretError> {
    let mut lexer = Lexer {
        input,
        pos: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token().inspect_err(|err| {
            debug!(%err, "tokenize failed");
        })?;
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            break;
        }
    }

    debug!(count = tokens.len(), "tokenized");
    Ok(tokens)
}

impl<'a> Lexer<'a> {
    // ── Helpers ──────────────────────────────────────────────────────

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    /// Consume one character, keeping line/column in step.
    /// `\r\n` counts as a single line break.
    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        match ch {
            '\n' => self.new_line(),
            '\r' if self.peek_char() != Some('\n') => self.new_line(),
            '\r' => {}
            _ => self.column += 1,
        }
        Some(ch)
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    fn bump_while(&mut self, accept: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek_char() {
            if !accept(ch) {
                break;
            }
            self.bump();
        }
    }

    // ── Whitespace & Comments ───────────────────────────────────────

    fn skip_trivia(&mut self) {
        loop {
            self.bump_while(char::is_whitespace);
            // Line comments: // to end of line
            if self.starts_with("//") {
                self.bump_while(|ch| ch != '\n' && ch != '\r');
            } else {
                break;
            }
        }
    }

    // ── Tokens ──────────────────────────────────────────────────────

    fn next_token(&mut self) -> Result<Token, InterpretError> {
        self.skip_trivia();

        let (line, column) = (self.line, self.column);
        let Some(ch) = self.peek_char() else {
            return Ok(Token::new(TokenKind::Eof, "", line, column));
        };

        let single = |kind: TokenKind| Token::new(kind, ch.to_string(), line, column);

        let token = match ch {
            '+' => single(TokenKind::Plus),
            '-' => single(TokenKind::Minus),
            '/' => single(TokenKind::Slash),
            '%' => single(TokenKind::Mod),
            '(' => single(TokenKind::LeftParenthesis),
            ')' => single(TokenKind::RightParenthesis),
            ';' => single(TokenKind::Semicolon),
            '*' => return Ok(self.one_or_two(TokenKind::Asterisk, '*', TokenKind::Pow)),
            '<' => return Ok(self.one_or_two(TokenKind::LessThan, '=', TokenKind::LessThanEqual)),
            '>' => {
                return Ok(self.one_or_two(
                    TokenKind::GreaterThan,
                    '=',
                    TokenKind::GreaterThanEqual,
                ))
            }
            '=' | '!' => {
                if self.peek_second() != Some('=') {
                    // The second character is missing: point just past the first.
                    return Err(InterpretError::expected_char(
                        format!("'=' is missing after '{}'.", ch),
                        Position::new(line, column + 1),
                    ));
                }
                let kind = if ch == '=' {
                    TokenKind::Equal
                } else {
                    TokenKind::NotEqual
                };
                self.bump();
                self.bump();
                return Ok(Token::new(kind, format!("{}=", ch), line, column));
            }
            '.' => {
                return Err(InterpretError::expected_char(
                    "numbers are expected before and after '.'.",
                    Position::new(line, column + 1),
                ));
            }
            c if c.is_ascii_digit() => return Ok(self.read_number()),
            c if is_identifier_start(c) => return Ok(self.read_identifier()),
            _ => single(TokenKind::Illegal),
        };

        self.bump();
        Ok(token)
    }

    /// Greedy two-character lookahead: `first` then `second` makes `double`,
    /// otherwise the single-character `single`.
    fn one_or_two(&mut self, single: TokenKind, second: char, double: TokenKind) -> Token {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        self.bump();
        let kind = if self.peek_char() == Some(second) {
            self.bump();
            double
        } else {
            single
        };
        Token::new(kind, &self.input[start..self.pos], line, column)
    }

    // ── Numbers ─────────────────────────────────────────────────────

    fn read_number(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let start = self.pos;

        // 0x1F / 0b101 keep their prefix in the literal.
        let radix_digit: Option<fn(char) -> bool> = if self.starts_with("0x") {
            Some(is_hex_digit as fn(char) -> bool)
        } else if self.starts_with("0b") {
            Some(is_binary_digit as fn(char) -> bool)
        } else {
            None
        };
        if let Some(is_digit) = radix_digit {
            if self.remaining().chars().nth(2).is_some_and(is_digit) {
                self.bump();
                self.bump();
                self.bump_while(is_digit);
                return Token::new(TokenKind::Int, &self.input[start..self.pos], line, column);
            }
        }

        self.bump_while(|c| c.is_ascii_digit());

        // A float needs digits on both sides of the dot.
        if self.peek_char() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit())
        {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
            return Token::new(TokenKind::Float, &self.input[start..self.pos], line, column);
        }

        Token::new(TokenKind::Int, &self.input[start..self.pos], line, column)
    }

    // ── Identifiers & Keywords ──────────────────────────────────────

    fn read_identifier(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        self.bump_while(is_identifier_char);
        let literal = &self.input[start..self.pos];
        Token::new(lookup_identifier(literal), literal, line, column)
    }
}

fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

fn is_binary_digit(ch: char) -> bool {
    ch == '0' || ch == '1'
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
