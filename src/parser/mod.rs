//! Basic low-level byte parser functionality shared by the text readers.
pub mod byte_parser;
pub mod byte_source;
pub mod in_memory_byte_source;

pub use byte_parser::ByteParser;
pub use byte_source::ByteSource;
pub use in_memory_byte_source::InMemoryByteSource;
