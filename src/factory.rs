//! Construction of lexers, token streams and parsers.
//!
//! Everything built here starts without error listeners, so nothing is
//! printed unless the caller attaches a policy. `create_parser` attaches the
//! fail-fast policy on request.

use crate::grammar::{Lexer, Parser, TokenStream};
use crate::listener::{ErrorListener, SyntaxError};
use crate::stream::{CaseInsensitiveStream, CharStream, CodePointStream};

/// Lexer whose keywords match in any letter case.
pub fn create_lexer(text: &str) -> Lexer<CaseInsensitiveStream<CodePointStream>> {
    Lexer::new(CaseInsensitiveStream::from_text(text))
}

/// Lexer over the raw text: only lower-case keywords are recognized.
pub fn create_case_sensitive_lexer(text: &str) -> Lexer<CodePointStream> {
    Lexer::new(CodePointStream::new(text))
}

/// Anything a token stream can be built from.
pub trait TokenSource {
    fn into_token_stream(self) -> Result<TokenStream, SyntaxError>;
}

impl TokenSource for &str {
    fn into_token_stream(self) -> Result<TokenStream, SyntaxError> {
        TokenStream::new(create_lexer(self))
    }
}

impl TokenSource for &String {
    fn into_token_stream(self) -> Result<TokenStream, SyntaxError> {
        self.as_str().into_token_stream()
    }
}

impl<S: CharStream> TokenSource for Lexer<S> {
    fn into_token_stream(self) -> Result<TokenStream, SyntaxError> {
        TokenStream::new(self)
    }
}

impl TokenSource for TokenStream {
    fn into_token_stream(self) -> Result<TokenStream, SyntaxError> {
        Ok(self)
    }
}

/// Token stream from source text or from an existing lexer.
///
/// Fails only when a lexer passed in carries a throwing listener.
pub fn create_token_stream(source: impl TokenSource) -> Result<TokenStream, SyntaxError> {
    source.into_token_stream()
}

/// Parser from source text, a lexer or a token stream. With
/// `throw_on_first_error` the parser carries exactly one listener, the
/// fail-fast one; otherwise none.
pub fn create_parser(
    source: impl TokenSource,
    throw_on_first_error: bool,
) -> Result<Parser, SyntaxError> {
    let mut parser = Parser::new(source.into_token_stream()?);
    parser.remove_error_listeners();
    if throw_on_first_error {
        parser.add_error_listener(ErrorListener::throwing());
    }
    Ok(parser)
}
