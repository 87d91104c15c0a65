//! Recursive-descent Apex parser.
//!
//! Each entry point (`compilation_unit`, `trigger_unit`, ...) parses from the
//! current position and returns a `ParseTree`. Syntax errors go through the
//! attached `ErrorListener`s using the ANTLR default-strategy wording. After
//! a report the parser is in recovery mode: further reports are dropped
//! until a token is matched again. A `Throwing` listener turns the first
//! report into an `Err` that unwinds the whole parse.
//!
//! Lookahead is unbounded. Ambiguous forms (local declarations, casts,
//! members inside trigger and anonymous blocks) are decided by scanning
//! ahead with `scan_type` without touching the tree.

mod decls;
mod exprs;
mod recovery;
mod soql;
mod stack;
mod stmts;

use super::token::{Token, TokenKind};
use super::token_stream::TokenStream;
use super::tree::{ParseTree, TreeBuilder};
use crate::listener::{dispatch, ErrorListener, SyntaxError};
use recovery::{TokenSet, EXPR_START, RESUME};
use tracing::{debug, trace};

pub type PResult<T> = Result<T, SyntaxError>;

pub struct Parser {
    tokens: TokenStream,
    /// Index into the default-channel tokens.
    pos: usize,
    listeners: Vec<ErrorListener>,
    syntax_errors: usize,
    recovering: bool,
    tree: TreeBuilder,
}

impl Parser {
    /// Parser with no error listeners attached.
    pub fn new(tokens: TokenStream) -> Self {
        Self {
            tokens,
            pos: 0,
            listeners: Vec::new(),
            syntax_errors: 0,
            recovering: false,
            tree: TreeBuilder::default(),
        }
    }

    pub fn add_error_listener(&mut self, listener: ErrorListener) {
        self.listeners.push(listener);
    }

    pub fn remove_error_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn error_listeners(&self) -> &[ErrorListener] {
        &self.listeners
    }

    /// Detaches every listener, handing back whatever they recorded.
    pub fn take_error_listeners(&mut self) -> Vec<ErrorListener> {
        std::mem::take(&mut self.listeners)
    }

    /// Errors reported so far, including ones no listener saw.
    pub fn syntax_error_count(&self) -> usize {
        self.syntax_errors
    }

    pub fn token_stream(&self) -> &TokenStream {
        &self.tokens
    }

    /// A class, interface or enum declaration followed by EOF.
    pub fn compilation_unit(&mut self) -> PResult<ParseTree> {
        self.run(Self::parse_compilation_unit)
    }

    /// `trigger Name on SObject (events) { ... }` followed by EOF.
    pub fn trigger_unit(&mut self) -> PResult<ParseTree> {
        self.run(Self::parse_trigger_unit)
    }

    /// Statements and member declarations, as in an anonymous script.
    pub fn anonymous_unit(&mut self) -> PResult<ParseTree> {
        self.run(Self::parse_anonymous_unit)
    }

    pub fn statement(&mut self) -> PResult<ParseTree> {
        self.run(Self::parse_statement)
    }

    pub fn expression(&mut self) -> PResult<ParseTree> {
        self.run(Self::parse_expression)
    }

    pub fn literal(&mut self) -> PResult<ParseTree> {
        self.run(Self::parse_literal)
    }

    /// A SOQL query without the surrounding brackets.
    pub fn query(&mut self) -> PResult<ParseTree> {
        self.run(Self::parse_query)
    }

    /// A SOSL query without the surrounding brackets.
    pub fn sosl_query(&mut self) -> PResult<ParseTree> {
        self.run(Self::parse_sosl_query)
    }

    fn run(&mut self, rule: fn(&mut Self) -> PResult<()>) -> PResult<ParseTree> {
        self.tree = TreeBuilder::default();
        self.recovering = false;
        rule(self)?;
        Ok(std::mem::take(&mut self.tree).finish_root())
    }

    // Token access

    fn current(&self) -> &Token {
        self.tokens.visible(self.pos)
    }

    fn nth(&self, n: usize) -> &Token {
        self.tokens.visible(self.pos + n)
    }

    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn nth_kind(&self, n: usize) -> TokenKind {
        self.nth(n).kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn at_set(&self, set: TokenSet) -> bool {
        set.contains(self.kind())
    }

    fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    fn at_ident(&self) -> bool {
        self.current().is_identifier()
    }

    /// Current token spelled `word` (case-folded by the lexer).
    fn at_word(&self, word: &str) -> bool {
        self.current().word == word
    }

    fn nth_word(&self, n: usize, word: &str) -> bool {
        self.nth(n).word == word
    }

    /// Tokens `n` and `n + 1` touch, with no hidden token between them.
    fn adjacent(&self, n: usize) -> bool {
        let a = self.nth(n);
        let b = self.nth(n + 1);
        b.index == a.index + 1
    }

    // Consuming

    /// Matches the current token.
    fn bump(&mut self) {
        let tok = self.current().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        self.recovering = false;
        self.tree.token(tok);
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    /// Skips the current token as part of error recovery.
    fn bump_error(&mut self) {
        let tok = self.current().clone();
        trace!(token = %tok.text, line = tok.line, column = tok.column, "skipping token");
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        self.tree.error(tok);
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            return true;
        }
        false
    }

    /// Skips one token if the last loop iteration consumed nothing.
    fn guard_progress(&mut self, start: usize) {
        if self.pos == start {
            self.bump_error();
        }
    }

    // Error reporting

    fn report(&mut self, line: usize, column: usize, message: String) -> PResult<()> {
        if self.recovering {
            trace!(line, column, %message, "suppressed while recovering");
            return Ok(());
        }
        self.recovering = true;
        self.syntax_errors += 1;
        debug!(line, column, %message, "syntax error");
        dispatch(&mut self.listeners, line, column, &message)
    }

    fn report_at_current(&mut self, message: String) -> PResult<()> {
        let (line, column) = (self.current().line, self.current().column);
        self.report(line, column, message)
    }

    fn no_viable(&mut self) -> PResult<()> {
        let msg = format!(
            "no viable alternative at input {}",
            self.current().error_display()
        );
        self.report_at_current(msg)
    }

    fn mismatch(&mut self, expected: &str) -> PResult<()> {
        let msg = format!(
            "mismatched input {} expecting {}",
            self.current().error_display(),
            expected
        );
        self.report_at_current(msg)
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<bool> {
        // A statement or member can follow a missing terminator.
        let insertable = matches!(kind, TokenKind::Semi | TokenKind::RBrace)
            && (self.current().is_word() || self.at_set(EXPR_START));
        self.expect_matching(|t| t.kind == kind, kind.display(), insertable)
    }

    fn expect_ident(&mut self) -> PResult<bool> {
        self.expect_matching(Token::is_identifier, "Identifier", false)
    }

    /// Any identifier or keyword, as allowed after `.` and in SOQL.
    fn expect_word(&mut self) -> PResult<bool> {
        self.expect_matching(Token::is_word, "Identifier", false)
    }

    fn expect_keyword(&mut self, word: &str) -> PResult<bool> {
        let expected = format!("'{word}'");
        self.expect_matching(|t| t.word == word, &expected, false)
    }

    /// Matches a token with single-token deletion: when the token after the
    /// current one is the expected one, the current token is reported as
    /// extraneous and skipped. Otherwise the token is reported as missing
    /// (when `insertable` or before a structural token) or mismatched, and
    /// nothing is consumed.
    fn expect_matching(
        &mut self,
        pred: impl Fn(&Token) -> bool,
        expected: &str,
        insertable: bool,
    ) -> PResult<bool> {
        if pred(self.current()) {
            self.bump();
            return Ok(true);
        }
        if !self.at_eof() && pred(self.nth(1)) {
            let msg = format!(
                "extraneous input {} expecting {}",
                self.current().error_display(),
                expected
            );
            self.report_at_current(msg)?;
            self.bump_error();
            self.bump();
            return Ok(true);
        }
        let found = self.current().error_display();
        let msg = if insertable || self.at_set(RESUME) {
            format!("missing {expected} at {found}")
        } else {
            format!("mismatched input {found} expecting {expected}")
        };
        self.report_at_current(msg)?;
        Ok(false)
    }

    /// Reports and skips everything left before EOF, then matches EOF.
    fn expect_eof(&mut self) -> PResult<()> {
        if !self.at_eof() {
            let msg = format!(
                "extraneous input {} expecting <EOF>",
                self.current().error_display()
            );
            self.report_at_current(msg)?;
            while !self.at_eof() {
                self.bump_error();
            }
        }
        self.bump();
        Ok(())
    }

    // Speculative scanning

    fn is_type_name(&self, n: usize) -> bool {
        let t = self.nth(n);
        t.is_identifier() || matches!(t.kind, TokenKind::List | TokenKind::Map)
    }

    /// Scans a type starting `n` tokens ahead. Returns the offset just past
    /// it, or `None` when no type starts there.
    fn scan_type(&self, mut n: usize) -> Option<usize> {
        loop {
            if !self.is_type_name(n) {
                return None;
            }
            n += 1;
            if self.nth_kind(n) == TokenKind::Lt {
                n = self.scan_type_arguments(n)?;
            }
            if self.nth_kind(n) == TokenKind::Dot && self.is_type_name(n + 1) {
                n += 1;
                continue;
            }
            break;
        }
        while self.nth_kind(n) == TokenKind::LBrack && self.nth_kind(n + 1) == TokenKind::RBrack {
            n += 2;
        }
        Some(n)
    }

    fn scan_type_arguments(&self, mut n: usize) -> Option<usize> {
        n += 1;
        loop {
            n = self.scan_type(n)?;
            if self.nth_kind(n) == TokenKind::Comma {
                n += 1;
                continue;
            }
            break;
        }
        (self.nth_kind(n) == TokenKind::Gt).then_some(n + 1)
    }

    /// Tokens taken by a modifier `n` ahead; 0 when there is none.
    /// `with`, `without` and `inherited` only count before `sharing`.
    fn modifier_len(&self, n: usize) -> usize {
        match self.nth_kind(n) {
            TokenKind::With | TokenKind::Without | TokenKind::Inherited => {
                if self.nth_kind(n + 1) == TokenKind::Sharing {
                    2
                } else {
                    0
                }
            }
            k if recovery::MODIFIERS.contains(k) => 1,
            _ => 0,
        }
    }

    /// `Type name` followed by `=`, `;` or `,`.
    fn is_local_variable_declaration(&self) -> bool {
        if self.at(TokenKind::Final) {
            return true;
        }
        match self.scan_type(0) {
            Some(n) => {
                self.nth(n).is_identifier()
                    && matches!(
                        self.nth_kind(n + 1),
                        TokenKind::Assign | TokenKind::Semi | TokenKind::Comma
                    )
            }
            None => false,
        }
    }
}
