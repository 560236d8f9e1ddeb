//! The scanner that produces tokens from Jack source text.

use super::{Keyword, Span, Token, TokenKind};
use crate::error::{CompileError, Result};

/// Largest value a Jack integer constant may take.
const MAX_INT_CONST: u32 = 32767;

/// A scanner that tokenizes Jack source code.
///
/// Comments (`//` to end of line, `/* */` blocks) and whitespace are
/// consumed silently and never surface as tokens.
pub struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            current_pos: 0,
        }
    }

    /// Byte offset just past the most recently consumed character.
    pub fn pos(&self) -> usize {
        self.current_pos
    }

    /// Returns true if at least one more token remains.
    ///
    /// Consumes leading whitespace and comments, which is not observable.
    pub fn has_next(&mut self) -> bool {
        self.skip_whitespace_and_comments();
        self.chars.peek().is_some()
    }

    /// Scans and classifies the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace_and_comments();

        let Some((start, ch)) = self.advance() else {
            return Ok(None);
        };

        let kind = match ch {
            '"' => self.scan_string(start)?,
            '0'..='9' => self.scan_number(ch, start)?,
            _ if is_ident_start(ch) => self.scan_word(ch),
            _ => TokenKind::Symbol(ch),
        };

        Ok(Some(Token::new(kind, Span::new(start, self.current_pos))))
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        while let Some(ch) = self.peek() {
                            if ch == '\n' {
                                break;
                            }
                            self.advance();
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.advance();
                        // Runs to end of input if the comment is unterminated
                        let mut prev = ' ';
                        while let Some(ch) = self.peek() {
                            self.advance();
                            if prev == '*' && ch == '/' {
                                break;
                            }
                            prev = ch;
                        }
                    }
                    _ => break, // a lone '/' is the division symbol
                },
                _ => break,
            }
        }
    }

    fn scan_string(&mut self, start: usize) -> Result<TokenKind> {
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(CompileError::Lex {
                        message: "unterminated string constant".to_string(),
                        at: start,
                    });
                }
                Some((_, '\n')) => {
                    return Err(CompileError::Lex {
                        message: "newline in string constant".to_string(),
                        at: start,
                    });
                }
                Some((_, '"')) => break,
                Some((_, ch)) => value.push(ch),
            }
        }

        Ok(TokenKind::StrConst(value))
    }

    fn scan_number(&mut self, first: char, start: usize) -> Result<TokenKind> {
        let mut value = u32::from(first) - u32::from('0');

        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            value = value.saturating_mul(10).saturating_add(u32::from(ch) - u32::from('0'));
            self.advance();
        }

        if value > MAX_INT_CONST {
            return Err(CompileError::Lex {
                message: format!("integer constant {} out of range (max {})", value, MAX_INT_CONST),
                at: start,
            });
        }

        Ok(TokenKind::IntConst(value as u16))
    }

    fn scan_word(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);

        while let Some(ch) = self.peek() {
            if is_ident_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match Keyword::from_word(&name) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(name),
        }
    }
}

/// Checks if a character can start an identifier.
fn is_ident_start(ch: char) -> bool {
    ch == '_' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Checks if a character can continue an identifier.
fn is_ident_continue(ch: char) -> bool {
    ch == '_' || unicode_xid::UnicodeXID::is_xid_continue(ch)
}
