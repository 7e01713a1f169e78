//! Byte source over a fully loaded buffer.

use crate::parser::byte_source::ByteSource;
use std::fs;
use std::path::Path;

// =#========================================================================#=
// IN MEMORY BYTE SOURCE
// =#========================================================================$=
/// Owns the complete input; morphology files are read in one go.
pub struct InMemoryByteSource {
    bytes: Vec<u8>,
    cursor: usize,
}

impl InMemoryByteSource {
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Loads a whole file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        fs::read(path).map(Self::from_vec)
    }
}

impl ByteSource for InMemoryByteSource {
    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    #[inline(always)]
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek();
        if byte.is_some() {
            self.cursor += 1;
        }
        byte
    }

    fn is_eof(&self) -> bool {
        self.cursor >= self.bytes.len()
    }
}
