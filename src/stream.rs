//! Character streams feeding the lexer.
//!
//! `CharStream` is the lexer's only view of source text. `CodePointStream`
//! is the plain implementation; `CaseInsensitiveStream` wraps another stream
//! and folds ASCII upper-case letters on the lookahead channel only, so a
//! lower-case keyword table matches `PUBLIC`, `Public` and `public` alike
//! while `text()` keeps returning exactly what was written.

use std::fmt;

/// Source of characters addressed by index.
///
/// Lookahead offsets are relative to the current position: `la(1)` is the
/// next character to be consumed, `la(-1)` the last consumed one. `None`
/// marks the end of input (or an offset before the start).
pub trait CharStream {
    fn la(&self, offset: isize) -> Option<char>;
    fn consume(&mut self);
    fn index(&self) -> usize;
    fn seek(&mut self, index: usize);
    /// Returns a marker for `release`. Streams here are fully buffered, so
    /// marking never pins anything.
    fn mark(&mut self) -> usize;
    fn release(&mut self, marker: usize);
    fn size(&self) -> usize;
    /// Text of the inclusive char interval `start..=stop`, clamped to the
    /// buffer. An empty string when `stop < start`.
    fn text(&self, start: usize, stop: usize) -> String;
    fn source_name(&self) -> &str;
}

/// Buffered stream over the code points of a string.
#[derive(Debug, Clone)]
pub struct CodePointStream {
    data: Vec<char>,
    pos: usize,
    name: String,
}

impl CodePointStream {
    pub fn new(text: &str) -> Self {
        Self::with_name(text, "<unknown>")
    }

    pub fn with_name(text: &str, name: impl Into<String>) -> Self {
        Self {
            data: text.chars().collect(),
            pos: 0,
            name: name.into(),
        }
    }
}

impl CharStream for CodePointStream {
    fn la(&self, offset: isize) -> Option<char> {
        let idx = match offset {
            0 => return None,
            o if o > 0 => self.pos.checked_add((o - 1) as usize)?,
            o => self.pos.checked_sub(o.unsigned_abs())?,
        };
        self.data.get(idx).copied()
    }

    fn consume(&mut self) {
        if self.pos < self.data.len() {
            self.pos += 1;
        }
    }

    fn index(&self) -> usize {
        self.pos
    }

    fn seek(&mut self, index: usize) {
        self.pos = index.min(self.data.len());
    }

    fn mark(&mut self) -> usize {
        self.pos
    }

    fn release(&mut self, _marker: usize) {}

    fn size(&self) -> usize {
        self.data.len()
    }

    fn text(&self, start: usize, stop: usize) -> String {
        if self.data.is_empty() || stop < start || start >= self.data.len() {
            return String::new();
        }
        let stop = stop.min(self.data.len() - 1);
        self.data[start..=stop].iter().collect()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CodePointStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.data {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Stream adapter exposing ASCII-lowercased lookahead over another stream.
///
/// Only `la` is folded. Position, marking and text extraction delegate to
/// the wrapped stream untouched.
#[derive(Debug, Clone)]
pub struct CaseInsensitiveStream<S> {
    inner: S,
}

impl<S: CharStream> CaseInsensitiveStream<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl CaseInsensitiveStream<CodePointStream> {
    pub fn from_text(text: &str) -> Self {
        Self::new(CodePointStream::new(text))
    }
}

/// Folds `A`..=`Z` to lower case; every other char passes through.
pub fn to_lower(c: char) -> char {
    if c.is_ascii_uppercase() {
        ((c as u8) + 32) as char
    } else {
        c
    }
}

impl<S: CharStream> CharStream for CaseInsensitiveStream<S> {
    fn la(&self, offset: isize) -> Option<char> {
        self.inner.la(offset).map(to_lower)
    }

    fn consume(&mut self) {
        self.inner.consume();
    }

    fn index(&self) -> usize {
        self.inner.index()
    }

    fn seek(&mut self, index: usize) {
        self.inner.seek(index);
    }

    fn mark(&mut self) -> usize {
        self.inner.mark()
    }

    fn release(&mut self, marker: usize) {
        self.inner.release(marker);
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn text(&self, start: usize, stop: usize) -> String {
        self.inner.text(start, stop)
    }

    fn source_name(&self) -> &str {
        self.inner.source_name()
    }
}

impl<S: fmt::Display> fmt::Display for CaseInsensitiveStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_lower_folds_ascii_letters_only() {
        assert_eq!(to_lower('A'), 'a');
        assert_eq!(to_lower('Z'), 'z');
        assert_eq!(to_lower('a'), 'a');
        assert_eq!(to_lower('1'), '1');
        assert_eq!(to_lower('['), '[');
        assert_eq!(to_lower('@'), '@');
        // Non-ASCII letters are never touched
        assert_eq!(to_lower('É'), 'É');
        assert_eq!(to_lower('Σ'), 'Σ');
    }

    #[test]
    fn test_lookahead_is_folded_but_text_is_original() {
        let mut s = CaseInsensitiveStream::from_text("PuBLiC Ünïcode");
        assert_eq!(s.la(1), Some('p'));
        assert_eq!(s.la(2), Some('u'));
        assert_eq!(s.la(3), Some('b'));
        s.consume();
        s.consume();
        assert_eq!(s.la(-1), Some('u'));
        assert_eq!(s.la(-2), Some('p'));
        assert_eq!(s.text(0, 5), "PuBLiC");
        assert_eq!(s.text(7, 13), "Ünïcode");
        assert_eq!(s.la(6), Some('Ü'));
        assert_eq!(s.to_string(), "PuBLiC Ünïcode");
    }

    #[test]
    fn test_positioning_delegates_to_inner_stream() {
        let mut s = CaseInsensitiveStream::from_text("AB");
        assert_eq!(s.size(), 2);
        let m = s.mark();
        s.consume();
        s.consume();
        s.consume();
        assert_eq!(s.index(), 2);
        assert_eq!(s.la(1), None);
        s.seek(m);
        s.release(m);
        assert_eq!(s.index(), 0);
        assert_eq!(s.la(1), Some('a'));
        assert_eq!(s.la(0), None);
        assert_eq!(s.la(-1), None);
    }

    #[test]
    fn test_text_clamps_out_of_range_intervals() {
        let s = CodePointStream::new("abc");
        assert_eq!(s.text(1, 10), "bc");
        assert_eq!(s.text(2, 1), "");
        assert_eq!(s.text(5, 6), "");
        assert_eq!(CodePointStream::new("").text(0, 0), "");
    }
}
