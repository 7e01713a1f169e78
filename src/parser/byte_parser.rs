//! Low-level byte-by-byte parser for ASCII text.
//!
//! This module provides [ByteParser] for the line-oriented SWC reader and
//! the s-expression tokenizer of the ASC reader. It supports peeking,
//! consuming and comment skipping, and keeps track of the current (1-based)
//! line for diagnostics.

use crate::parser::byte_source::ByteSource;
use crate::parser::in_memory_byte_source::InMemoryByteSource;
use std::path::Path;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser for ASCII text.
///
/// # Features
/// - Works with any [ByteSource]
/// - Line tracking (every consumed `\n` starts a new line)
/// - Inline and full whitespace skipping, line comments
/// - Token and double-quoted string parsing
///
/// # Example
/// ```
/// use neuromorph::parser::ByteParser;
///
/// let mut parser = ByteParser::from_str("# header\n1 1 0.0 0.0 0.0 1.0 -1\n");
/// assert!(parser.skip_line_comment(b'#'));
/// assert_eq!(parser.line(), 2);
/// assert_eq!(parser.parse_token(b""), "1");
/// parser.skip_inline_whitespace();
/// assert_eq!(parser.parse_token(b""), "1");
/// ```
pub struct ByteParser<S: ByteSource> {
    source: S,
    line: usize,
}

impl ByteParser<InMemoryByteSource> {
    /// Creates a parser over a copy of a byte slice.
    pub fn from_bytes(input: &[u8]) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.to_vec()))
    }

    /// Creates a parser over a copy of a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    /// Creates a parser over the content of a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(InMemoryByteSource::from_file(path)?))
    }
}

impl<S: ByteSource> ByteParser<S> {
    /// Creates a new `ByteParser` from a byte source.
    pub fn new(source: S) -> Self {
        Self { source, line: 1 }
    }

    /// Peeks at the current byte without consuming it.
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.source.peek()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next(&mut self) -> Option<u8> {
        let byte = self.source.next_byte()?;
        if byte == b'\n' {
            self.line += 1;
        }
        Some(byte)
    }

    /// Returns the 1-based line of the current position.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Skips spaces, tabs and carriage returns, but not newlines.
    pub fn skip_inline_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
            self.next();
        }
    }

    /// Skips (consumes) all consecutive whitespace characters, newlines included.
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.next();
        }
    }

    /// Consumes the rest of the current line, including the newline.
    pub fn skip_line(&mut self) {
        while let Some(b) = self.next() {
            if b == b'\n' {
                break;
            }
        }
    }

    /// Skips a comment running from `marker` to the end of the line.
    ///
    /// # Returns
    /// `true` if a comment was found and consumed
    pub fn skip_line_comment(&mut self, marker: u8) -> bool {
        if self.peek() == Some(marker) {
            self.skip_line();
            return true;
        }
        false
    }

    /// Skips all whitespace and line comments starting with `marker`.
    pub fn skip_whitespace_and_comments(&mut self, marker: u8) {
        self.skip_whitespace();
        while self.skip_line_comment(marker) {
            self.skip_whitespace();
        }
    }

    /// Parses a token that ends at whitespace, EOF or any of `delimiters`.
    ///
    /// # Returns
    /// The token, empty if the parser is positioned at a terminator
    pub fn parse_token(&mut self, delimiters: &[u8]) -> String {
        let mut token = String::new();
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || delimiters.contains(&b) {
                break;
            }
            token.push(b as char);
            self.next();
        }
        token
    }

    /// Parses a string enclosed in double quotes.
    ///
    /// Assumes the opening quote has not been consumed yet.
    ///
    /// # Returns
    /// The content without quotes, `None` if EOF is reached before the
    /// closing quote
    pub fn parse_quoted_string(&mut self) -> Option<String> {
        self.next(); // opening "
        let mut content = String::new();
        loop {
            match self.next()? {
                b'"' => return Some(content),
                b => content.push(b as char),
            }
        }
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_tracking() {
        let mut parser = ByteParser::from_str("a\nb\r\n\nc");
        assert_eq!(parser.line(), 1);
        parser.skip_line();
        assert_eq!(parser.line(), 2);
        parser.skip_whitespace();
        assert_eq!(parser.peek(), Some(b'b'));
        parser.next();
        parser.skip_whitespace();
        assert_eq!(parser.line(), 4);
        assert_eq!(parser.parse_token(b""), "c");
        assert!(parser.is_eof());
    }

    #[test]
    fn test_tokens() {
        let mut parser = ByteParser::from_str("(CellBody) \"Cell Body\" 1.5)");
        assert_eq!(parser.next(), Some(b'('));
        assert_eq!(parser.parse_token(b"()"), "CellBody");
        assert_eq!(parser.next(), Some(b')'));
        parser.skip_inline_whitespace();
        assert_eq!(parser.parse_quoted_string().as_deref(), Some("Cell Body"));
        parser.skip_inline_whitespace();
        assert_eq!(parser.parse_token(b"()"), "1.5");
        assert_eq!(parser.peek(), Some(b')'));
    }

    #[test]
    fn test_unclosed_quote() {
        let mut parser = ByteParser::from_str("\"never closed");
        assert_eq!(parser.parse_quoted_string(), None);
    }

    #[test]
    fn test_comments() {
        let mut parser = ByteParser::from_str("; one\n  ; two\n(");
        parser.skip_whitespace_and_comments(b';');
        assert_eq!(parser.peek(), Some(b'('));
        assert_eq!(parser.line(), 3);
    }
}
