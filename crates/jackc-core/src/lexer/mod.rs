//! Lexical analysis (tokenization) for Jack source code.
//!
//! The lexer transforms Jack source text into a stream of classified
//! tokens consumed on demand by the compilation engine.
//!
//! ## Structure
//!
//! - `scanner.rs` - character-level `Scanner` that classifies raw tokens
//! - `token.rs` - `Token`, `TokenKind`, and `Keyword` definitions
//! - `tokenizer.rs` - `Tokenizer` cursor with one token of pushback
//!
//! ## Usage
//!
//! ```rust
//! use jackc_core::lexer::{Keyword, Tokenizer};
//!
//! let mut tokens = Tokenizer::new("class Main { }");
//! tokens.advance().unwrap();
//! assert_eq!(tokens.as_keyword().unwrap(), Keyword::Class);
//! ```

mod scanner;
mod token;
mod tokenizer;

pub use scanner::Scanner;
pub use token::{Keyword, Span, Token, TokenKind};
pub use tokenizer::Tokenizer;
