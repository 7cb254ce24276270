#![forbid(unsafe_code)]
//! Reader for PDBx/mmCIF files as ordered category records.
//! Lines are tokenized (with `;` text blocks folded into single values) and
//! assembled into a [`Document`] mapping each category to either one scalar
//! record or the rows of a `loop_` table.

pub mod document;
pub mod error;
pub mod lines;
pub mod parser;
pub mod reader;
pub mod tokenizer;

pub use document::{Category, Document, Row, ScalarRecord};
pub use error::{ParseError, ParseErrorKind, ParseWarning};
pub use lines::{LineIterator, LogicalLine};
pub use parser::{
    ParserOptions, parse_async_reader, parse_file, parse_file_with_options, parse_lines,
    parse_reader, parse_str, parse_str_with_options,
};
pub use reader::Reader;
pub use tokenizer::tokenize;
