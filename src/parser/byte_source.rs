//! Byte source abstraction for the text readers.

// =#========================================================================#=
// BYTE SOURCE (Trait)
// =#========================================================================T=
/// Forward-only stream of bytes consumed by a
/// [ByteParser](crate::parser::ByteParser).
pub trait ByteSource {
    /// The byte under the cursor, `None` at the end of the input.
    fn peek(&self) -> Option<u8>;

    /// Returns the byte under the cursor and moves past it.
    fn next_byte(&mut self) -> Option<u8>;

    /// `true` once every byte has been consumed.
    fn is_eof(&self) -> bool;
}
