//! Buffered token stream between the lexer and the parser.

use super::lexer::Lexer;
use super::token::{Channel, Token, TokenKind};
use crate::listener::SyntaxError;
use crate::stream::CharStream;

/// All tokens of one source, hidden ones included. The parser only sees
/// default-channel tokens.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    visible: Vec<usize>,
}

impl TokenStream {
    /// Drains `lexer` up to and including EOF.
    pub fn new<S: CharStream>(mut lexer: Lexer<S>) -> Result<Self, SyntaxError> {
        let mut tokens = Vec::new();
        let mut visible = Vec::new();
        loop {
            let mut tok = lexer.next_token()?;
            tok.index = tokens.len();
            let eof = tok.kind == TokenKind::Eof;
            if tok.channel == Channel::Default {
                visible.push(tok.index);
            }
            tokens.push(tok);
            if eof {
                break;
            }
        }
        Ok(Self { tokens, visible })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of default-channel tokens, EOF included.
    pub fn on_channel_count(&self) -> usize {
        self.visible.len()
    }

    /// The `i`th default-channel token; EOF past the end.
    pub(crate) fn visible(&self, i: usize) -> &Token {
        let idx = self
            .visible
            .get(i)
            .or(self.visible.last())
            .copied()
            .unwrap_or(0);
        &self.tokens[idx]
    }

    /// Source text reassembled from every token.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.text.as_str())
            .collect()
    }
}
