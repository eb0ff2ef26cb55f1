//! Lexical scanner shared by the comment stripper and the quote-aware splitter.
//!
//! The scanner partitions SQL text into [`Span`]s: runs of plain code, quoted
//! literals, `--` line comments and `/* */` block comments. It is a small
//! explicit state machine driven by the byte under the cursor:
//!
//! - `'` or `"` opens a literal that runs to the matching quote. A doubled
//!   quote (`''` or `""`) is an escape and keeps the literal open.
//! - `--` opens a line comment that stops *before* the next `\n` or `\r`, so the
//!   line terminator stays in the following code span.
//! - `/*` opens a block comment closed by the first `*/` after the opener.
//!   Block comments do not nest.
//! - Anything else is code.
//!
//! Unterminated literals and block comments run to end of input and are flagged
//! with `terminated: false`; the scanner never fails.
//!
//! Spans borrow the input and are lossless: concatenating every span's text
//! reproduces the input byte for byte. All delimiters are ASCII, so every span
//! boundary is a valid UTF-8 char boundary.

use memchr::{memchr, memchr2, memmem};

/// What kind of text a [`Span`] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Plain SQL outside any literal or comment.
    Code,
    /// A quoted literal, including its delimiters.
    Literal { quote: u8, terminated: bool },
    /// A `--` comment, excluding the line terminator.
    LineComment,
    /// A `/* ... */` comment, including both markers when terminated.
    BlockComment { terminated: bool },
}

impl SpanKind {
    pub fn is_comment(&self) -> bool {
        matches!(self, SpanKind::LineComment | SpanKind::BlockComment { .. })
    }
}

/// A borrowed slice of the input in a single scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub kind: SpanKind,
    pub text: &'a str,
}

/// Iterator over the [`Span`]s of a SQL string.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn scan_literal(&self, start: usize) -> (usize, SpanKind) {
        let bytes = self.input.as_bytes();
        let quote = bytes[start];
        let mut i = start + 1;

        loop {
            match memchr(quote, &bytes[i..]) {
                Some(offset) => {
                    let at = i + offset;
                    if bytes.get(at + 1) == Some(&quote) {
                        i = at + 2;
                        continue;
                    }
                    return (
                        at + 1,
                        SpanKind::Literal {
                            quote,
                            terminated: true,
                        },
                    );
                }
                None => {
                    return (
                        bytes.len(),
                        SpanKind::Literal {
                            quote,
                            terminated: false,
                        },
                    );
                }
            }
        }
    }

    fn scan_line_comment(&self, start: usize) -> (usize, SpanKind) {
        let bytes = self.input.as_bytes();
        let body = start + 2;
        let end = memchr2(b'\n', b'\r', &bytes[body..])
            .map(|offset| body + offset)
            .unwrap_or(bytes.len());
        (end, SpanKind::LineComment)
    }

    fn scan_block_comment(&self, start: usize) -> (usize, SpanKind) {
        let bytes = self.input.as_bytes();
        let body = start + 2;
        match memmem::find(&bytes[body..], b"*/") {
            Some(offset) => (
                body + offset + 2,
                SpanKind::BlockComment { terminated: true },
            ),
            None => (
                bytes.len(),
                SpanKind::BlockComment { terminated: false },
            ),
        }
    }

    fn scan_code(&self, start: usize) -> (usize, SpanKind) {
        let bytes = self.input.as_bytes();
        let mut i = start + 1;
        while i < bytes.len() && !opens_span(bytes, i) {
            i += 1;
        }
        (i, SpanKind::Code)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Span<'a>> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        let (end, kind) = match (bytes[start], bytes.get(start + 1)) {
            (b'\'' | b'"', _) => self.scan_literal(start),
            (b'-', Some(b'-')) => self.scan_line_comment(start),
            (b'/', Some(b'*')) => self.scan_block_comment(start),
            _ => self.scan_code(start),
        };

        self.pos = end;
        Some(Span {
            kind,
            text: &self.input[start..end],
        })
    }
}

#[inline]
fn opens_span(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'\'' | b'"' => true,
        b'-' => bytes.get(i + 1) == Some(&b'-'),
        b'/' => bytes.get(i + 1) == Some(&b'*'),
        _ => false,
    }
}
