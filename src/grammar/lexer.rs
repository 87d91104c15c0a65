//! Apex lexer over a `CharStream`.
//!
//! Every decision is taken on `la()`, so keyword recognition follows
//! whatever the stream's lookahead reports. Behind a
//! `CaseInsensitiveStream` the lower-case keyword table matches any
//! spelling; over a raw stream only lower-case keywords are recognized.
//! Token text is always read back through `CharStream::text` and is never
//! folded.

use super::token::{escape_ws, Channel, Token, TokenKind};
use crate::listener::{dispatch, ErrorListener, SyntaxError};
use crate::stream::CharStream;

pub struct Lexer<S> {
    input: S,
    line: usize,
    column: usize,
    listeners: Vec<ErrorListener>,
    syntax_errors: usize,
    done: bool,
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

impl<S: CharStream> Lexer<S> {
    /// Lexer with no error listeners attached.
    pub fn new(input: S) -> Self {
        Self {
            input,
            line: 1,
            column: 1,
            listeners: Vec::new(),
            syntax_errors: 0,
            done: false,
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

    pub fn syntax_error_count(&self) -> usize {
        self.syntax_errors
    }

    pub fn input(&self) -> &S {
        &self.input
    }

    fn la(&self, i: isize) -> Option<char> {
        self.input.la(i)
    }

    fn la_is(&self, i: isize, c: char) -> bool {
        self.la(i) == Some(c)
    }

    fn la_digit(&self, i: isize) -> bool {
        self.la(i).is_some_and(|c| c.is_ascii_digit())
    }

    fn advance(&mut self) {
        match self.la(1) {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => return,
        }
        self.input.consume();
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Next token, hidden ones included. Returns EOF forever once the input
    /// is exhausted.
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        loop {
            let start = self.input.index();
            let (line, column) = (self.line, self.column);
            let Some(c) = self.la(1) else {
                self.done = true;
                return Ok(Token {
                    kind: TokenKind::Eof,
                    text: "<EOF>".to_string(),
                    word: String::new(),
                    channel: Channel::Default,
                    line,
                    column,
                    start,
                    stop: start as isize - 1,
                    index: 0,
                });
            };
            let mut word = String::new();
            let kind = match c {
                ' ' | '\t' | '\r' | '\n' | '\u{000C}' => {
                    while matches!(self.la(1), Some(' ' | '\t' | '\r' | '\n' | '\u{000C}')) {
                        self.advance();
                    }
                    Some(TokenKind::Whitespace)
                }
                '/' if self.la_is(2, '/') => {
                    while self.la(1).is_some_and(|c| c != '\n' && c != '\r') {
                        self.advance();
                    }
                    Some(TokenKind::Comment)
                }
                '/' if self.la_is(2, '*') => self.block_comment(start, line, column)?,
                '\'' => self.string_literal(start, line, column)?,
                c if c.is_ascii_digit() => Some(self.number()),
                '.' if self.la_digit(2) => Some(self.number()),
                c if is_ident_start(c) => {
                    while self.la(1).is_some_and(is_ident_part) {
                        if let Some(c) = self.la(1) {
                            word.push(c);
                        }
                        self.advance();
                    }
                    Some(self.classify_word(&mut word))
                }
                _ => match self.operator() {
                    Some((kind, len)) => {
                        self.advance_n(len);
                        Some(kind)
                    }
                    None => {
                        self.advance();
                        let text = self.input.text(start, self.input.index() - 1);
                        self.recognition_error(line, column, &text)?;
                        None
                    }
                },
            };
            let Some(kind) = kind else { continue };
            let stop = self.input.index() as isize - 1;
            let channel = match kind {
                TokenKind::Whitespace | TokenKind::Comment => Channel::Hidden,
                _ => Channel::Default,
            };
            return Ok(Token {
                kind,
                text: self.input.text(start, stop as usize),
                word,
                channel,
                line,
                column,
                start,
                stop,
                index: 0,
            });
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn classify_word(&mut self, word: &mut String) -> TokenKind {
        // `System.runAs` is a single token
        if word == "system"
            && self.la_is(1, '.')
            && self.la_is(2, 'r')
            && self.la_is(3, 'u')
            && self.la_is(4, 'n')
            && self.la_is(5, 'a')
            && self.la_is(6, 's')
            && !self.la(7).is_some_and(is_ident_part)
        {
            self.advance_n(6);
            word.push_str(".runas");
            return TokenKind::SystemRunAs;
        }
        TokenKind::keyword(word).unwrap_or(TokenKind::Identifier)
    }

    fn block_comment(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Option<TokenKind>, SyntaxError> {
        self.advance_n(2);
        loop {
            match self.la(1) {
                None => {
                    let text = self.input.text(start, self.input.index() - 1);
                    self.recognition_error(line, column, &text)?;
                    return Ok(None);
                }
                Some('*') if self.la_is(2, '/') => {
                    self.advance_n(2);
                    return Ok(Some(TokenKind::Comment));
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn string_literal(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Option<TokenKind>, SyntaxError> {
        let mark = self.input.mark();
        let (save_line, save_col) = (self.line, self.column);
        self.advance();
        loop {
            match self.la(1) {
                Some('\'') => {
                    self.advance();
                    self.input.release(mark);
                    return Ok(Some(TokenKind::StringLiteral));
                }
                Some('\\') if self.la(2).is_some_and(|c| c != '\n' && c != '\r') => {
                    self.advance_n(2)
                }
                Some('\n' | '\r') | None => {
                    // Unterminated: report what was scanned, then restart
                    // right after the opening quote.
                    let text = self.input.text(start, self.input.index().saturating_sub(1));
                    self.input.seek(mark + 1);
                    self.input.release(mark);
                    self.line = save_line;
                    self.column = save_col + 1;
                    self.recognition_error(line, column, &text)?;
                    return Ok(None);
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn digits(&mut self) -> usize {
        let mut n = 0;
        while self.la_digit(1) {
            self.advance();
            n += 1;
        }
        n
    }

    fn number(&mut self) -> TokenKind {
        let int_len = self.digits();
        if int_len == 4
            && self.la_is(1, '-')
            && self.la_digit(2)
            && self.la_digit(3)
            && self.la_is(4, '-')
            && self.la_digit(5)
            && self.la_digit(6)
        {
            self.advance_n(6);
            self.date_time_suffix();
            return TokenKind::DateLiteral;
        }
        let mut decimal = false;
        if self.la_is(1, '.') && self.la_digit(2) {
            self.advance();
            self.digits();
            decimal = true;
        }
        match self.la(1) {
            Some('l') if !decimal && !self.la(2).is_some_and(is_ident_part) => {
                self.advance();
                TokenKind::LongLiteral
            }
            Some('d') if !self.la(2).is_some_and(is_ident_part) => {
                self.advance();
                TokenKind::NumberLiteral
            }
            _ if decimal => TokenKind::NumberLiteral,
            _ => TokenKind::IntegerLiteral,
        }
    }

    /// `Thh:mm:ss[.sss](Z|(+|-)hh:mm)` after a date.
    fn date_time_suffix(&mut self) {
        if !(self.la_is(1, 't') && self.la_digit(2)) {
            return;
        }
        self.advance();
        while self.la(1).is_some_and(|c| c.is_ascii_digit() || c == ':' || c == '.') {
            self.advance();
        }
        match self.la(1) {
            Some('z') => self.advance(),
            Some('+' | '-') if self.la_digit(2) => {
                self.advance();
                while self.la(1).is_some_and(|c| c.is_ascii_digit() || c == ':') {
                    self.advance();
                }
            }
            _ => {}
        }
    }

    /// Longest operator match at the current position.
    fn operator(&self) -> Option<(TokenKind, usize)> {
        use TokenKind::*;
        let c1 = self.la(1)?;
        let c2 = self.la(2);
        let c3 = self.la(3);
        let c4 = self.la(4);
        let op = match (c1, c2, c3, c4) {
            ('>', Some('>'), Some('>'), Some('=')) => (URShiftAssign, 4),
            ('>', Some('>'), Some('='), _) => (RShiftAssign, 3),
            ('<', Some('<'), Some('='), _) => (LShiftAssign, 3),
            ('=', Some('='), Some('='), _) => (TripleEq, 3),
            ('!', Some('='), Some('='), _) => (TripleNe, 3),
            ('=', Some('='), _, _) => (Eq, 2),
            ('=', Some('>'), _, _) => (MapsTo, 2),
            ('!', Some('='), _, _) => (Ne, 2),
            ('<', Some('>'), _, _) => (LessGreater, 2),
            ('<', Some('='), _, _) => (Le, 2),
            ('>', Some('='), _, _) => (Ge, 2),
            ('&', Some('&'), _, _) => (AndAnd, 2),
            ('|', Some('|'), _, _) => (OrOr, 2),
            ('+', Some('+'), _, _) => (Inc, 2),
            ('-', Some('-'), _, _) => (Dec, 2),
            ('+', Some('='), _, _) => (AddAssign, 2),
            ('-', Some('='), _, _) => (SubAssign, 2),
            ('*', Some('='), _, _) => (MulAssign, 2),
            ('/', Some('='), _, _) => (DivAssign, 2),
            ('&', Some('='), _, _) => (AndAssign, 2),
            ('|', Some('='), _, _) => (OrAssign, 2),
            ('^', Some('='), _, _) => (XorAssign, 2),
            ('?', Some('?'), _, _) => (Coalesce, 2),
            ('?', Some('.'), _, _) => (QuestionDot, 2),
            ('(', ..) => (LParen, 1),
            (')', ..) => (RParen, 1),
            ('{', ..) => (LBrace, 1),
            ('}', ..) => (RBrace, 1),
            ('[', ..) => (LBrack, 1),
            (']', ..) => (RBrack, 1),
            (';', ..) => (Semi, 1),
            (',', ..) => (Comma, 1),
            ('.', ..) => (Dot, 1),
            ('@', ..) => (At, 1),
            ('=', ..) => (Assign, 1),
            ('>', ..) => (Gt, 1),
            ('<', ..) => (Lt, 1),
            ('!', ..) => (Bang, 1),
            ('~', ..) => (Tilde, 1),
            ('?', ..) => (Question, 1),
            (':', ..) => (Colon, 1),
            ('+', ..) => (Add, 1),
            ('-', ..) => (Sub, 1),
            ('*', ..) => (Mul, 1),
            ('/', ..) => (Div, 1),
            ('&', ..) => (BitAnd, 1),
            ('|', ..) => (BitOr, 1),
            ('^', ..) => (Caret, 1),
            ('%', ..) => (Mod, 1),
            _ => return None,
        };
        Some(op)
    }

    fn recognition_error(
        &mut self,
        line: usize,
        column: usize,
        text: &str,
    ) -> Result<(), SyntaxError> {
        self.syntax_errors += 1;
        let msg = format!("token recognition error at: '{}'", escape_ws(text));
        dispatch(&mut self.listeners, line, column, &msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{CaseInsensitiveStream, CodePointStream};

    fn kinds<S: CharStream>(mut lexer: Lexer<S>) -> Vec<TokenKind> {
        let mut out = Vec::new();
        loop {
            let t = lexer.next_token().unwrap();
            if t.channel == Channel::Default {
                out.push(t.kind);
            }
            if t.kind == TokenKind::Eof {
                return out;
            }
        }
    }

    #[test]
    fn test_keywords_fold_through_case_insensitive_stream() {
        use TokenKind::*;
        let lexer = Lexer::new(CaseInsensitiveStream::from_text("PuBliC CLASS Foo"));
        assert_eq!(kinds(lexer), vec![Public, Class, Identifier, Eof]);
        let raw = Lexer::new(CodePointStream::new("PuBliC class"));
        assert_eq!(kinds(raw), vec![Identifier, Class, Eof]);
    }

    #[test]
    fn test_token_text_keeps_original_case() {
        let mut lexer = Lexer::new(CaseInsensitiveStream::from_text("  PUBLIC"));
        let ws = lexer.next_token().unwrap();
        assert_eq!(ws.kind, TokenKind::Whitespace);
        let kw = lexer.next_token().unwrap();
        assert_eq!(kw.text, "PUBLIC");
        assert_eq!(kw.word, "public");
        assert_eq!((kw.line, kw.column), (1, 3));
        assert_eq!((kw.start, kw.stop), (2, 7));
    }

    #[test]
    fn test_system_run_as_is_one_token() {
        use TokenKind::*;
        let lexer = Lexer::new(CaseInsensitiveStream::from_text("System.runAs(u) System.debug"));
        assert_eq!(
            kinds(lexer),
            vec![SystemRunAs, LParen, Identifier, RParen, Identifier, Dot, Identifier, Eof]
        );
    }

    #[test]
    fn test_numbers_and_dates() {
        use TokenKind::*;
        let lexer = Lexer::new(CaseInsensitiveStream::from_text(
            "42 42L 3.14 .5 1d 2020-01-31 2020-01-31T10:00:00Z 10-2",
        ));
        assert_eq!(
            kinds(lexer),
            vec![
                IntegerLiteral,
                LongLiteral,
                NumberLiteral,
                NumberLiteral,
                NumberLiteral,
                DateLiteral,
                DateLiteral,
                IntegerLiteral,
                Sub,
                IntegerLiteral,
                Eof
            ]
        );
    }

    #[test]
    fn test_operators_longest_match() {
        use TokenKind::*;
        let lexer = Lexer::new(CodePointStream::new("a >>>= b ?? c?.d => === !== <> >> <"));
        assert_eq!(
            kinds(lexer),
            vec![
                Identifier,
                URShiftAssign,
                Identifier,
                Coalesce,
                Identifier,
                QuestionDot,
                Identifier,
                MapsTo,
                TripleEq,
                TripleNe,
                LessGreater,
                Gt,
                Gt,
                Lt,
                Eof
            ]
        );
    }

    #[test]
    fn test_comments_and_strings() {
        use TokenKind::*;
        let lexer = Lexer::new(CodePointStream::new(
            "// line\n/* block\n */ 'it\\'s' x",
        ));
        assert_eq!(kinds(lexer), vec![StringLiteral, Identifier, Eof]);
    }

    #[test]
    fn test_recognition_errors_are_reported_and_skipped() {
        use TokenKind::*;
        let mut lexer = Lexer::new(CodePointStream::new("a # b\n'open"));
        lexer.add_error_listener(ErrorListener::collecting("x"));
        let mut seen = Vec::new();
        loop {
            let t = lexer.next_token().unwrap();
            if t.channel == Channel::Default {
                seen.push(t.kind);
            }
            if t.kind == Eof {
                break;
            }
        }
        assert_eq!(seen, vec![Identifier, Identifier, Identifier, Eof]);
        let diags = lexer.error_listeners()[0].diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].message, "token recognition error at: '#'");
        assert_eq!((diags[0].line, diags[0].column), (1, 3));
        assert_eq!(diags[1].message, "token recognition error at: ''open'");
        assert_eq!(lexer.syntax_error_count(), 2);
    }

    #[test]
    fn test_throwing_listener_stops_lexing() {
        let mut lexer = Lexer::new(CodePointStream::new("#"));
        lexer.add_error_listener(ErrorListener::throwing());
        let err = lexer.next_token().unwrap_err();
        assert_eq!((err.line, err.column), (1, 1));
    }
}
