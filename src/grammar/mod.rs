//! Apex grammar: lexer, token stream, parser and parse trees.
//!
//! The lexer reads a `CharStream` and makes every decision on lookahead, so
//! wrapping the input in a `CaseInsensitiveStream` is what makes keywords
//! case-insensitive. Lexer and parser both report syntax errors through
//! `ErrorListener`s and start with none attached.

pub mod lexer;
pub mod parser;
pub mod token;
pub mod token_stream;
pub mod tree;

pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Channel, Token, TokenKind};
pub use token_stream::TokenStream;
pub use tree::{Child, ParseTree, Rule};
