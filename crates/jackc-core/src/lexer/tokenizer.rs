//! Cursor over the token stream with one token of pushback.

use super::{Keyword, Scanner, Span, Token, TokenKind};
use crate::error::{CompileError, Result};

/// A token cursor with exactly one token of pushback.
///
/// `advance` consumes and classifies the next token, which then becomes the
/// *current* token read by the `as_*` accessors. `push_back` un-consumes the
/// current token so the next `advance` yields it again. At most one pushback
/// may be outstanding; a second call without an intervening `advance` is a
/// programming error and panics.
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    current: Option<Token>,
    pushed_back: bool,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            scanner: Scanner::new(source),
            current: None,
            pushed_back: false,
        }
    }

    /// Returns true if another token remains to be consumed.
    ///
    /// Non-destructive: only whitespace and comments may be skipped.
    pub fn has_next(&mut self) -> bool {
        self.pushed_back || self.scanner.has_next()
    }

    /// Consumes the next token and makes it current.
    ///
    /// Fails with a lexical error when the input is exhausted or the next
    /// token is malformed.
    pub fn advance(&mut self) -> Result<()> {
        if self.pushed_back {
            self.pushed_back = false;
            return Ok(());
        }
        match self.scanner.next_token()? {
            Some(token) => {
                self.current = Some(token);
                Ok(())
            }
            None => Err(CompileError::Lex {
                message: "unexpected end of input".to_string(),
                at: self.scanner.pos(),
            }),
        }
    }

    /// Un-consumes the current token.
    ///
    /// # Panics
    ///
    /// Panics if called twice without an intervening [`advance`], or before
    /// the first `advance`.
    ///
    /// [`advance`]: Tokenizer::advance
    pub fn push_back(&mut self) {
        assert!(!self.pushed_back, "push_back called twice without advance");
        assert!(self.current.is_some(), "push_back called before advance");
        self.pushed_back = true;
    }

    /// The current token's kind, if any token has been consumed.
    pub fn kind(&self) -> Option<&TokenKind> {
        self.current.as_ref().map(|t| &t.kind)
    }

    /// Span of the current token, or an empty span at the read position.
    pub fn span(&self) -> Span {
        match &self.current {
            Some(token) => token.span,
            None => Span::new(self.scanner.pos(), self.scanner.pos()),
        }
    }

    /// The current token as a keyword.
    pub fn as_keyword(&self) -> Result<Keyword> {
        match self.kind() {
            Some(TokenKind::Keyword(kw)) => Ok(*kw),
            other => Err(mismatch("a keyword", other)),
        }
    }

    /// The current token as a symbol character.
    pub fn as_symbol(&self) -> Result<char> {
        match self.kind() {
            Some(TokenKind::Symbol(ch)) => Ok(*ch),
            other => Err(mismatch("a symbol", other)),
        }
    }

    /// The current token as an identifier.
    pub fn as_identifier(&self) -> Result<&str> {
        match self.kind() {
            Some(TokenKind::Identifier(name)) => Ok(name),
            other => Err(mismatch("an identifier", other)),
        }
    }

    /// The current token as an integer constant.
    pub fn as_int(&self) -> Result<u16> {
        match self.kind() {
            Some(TokenKind::IntConst(n)) => Ok(*n),
            other => Err(mismatch("an integer constant", other)),
        }
    }

    /// The current token as a string constant.
    pub fn as_string(&self) -> Result<&str> {
        match self.kind() {
            Some(TokenKind::StrConst(s)) => Ok(s),
            other => Err(mismatch("a string constant", other)),
        }
    }
}

fn mismatch(expected: &'static str, found: Option<&TokenKind>) -> CompileError {
    CompileError::TypeMismatch {
        expected,
        found: match found {
            Some(kind) => kind.to_string(),
            None => "no token at all".to_string(),
        },
    }
}
