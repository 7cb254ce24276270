//! Entry points that feed text from common sources into [`Reader`].
//!
//! Every source is split into lines that keep their `\n` terminator, with
//! `\r\n` normalized to `\n`. Text blocks rely on this: folding drops one
//! trailing character per line.

use std::{
    fs::File,
    io::{BufRead, Read},
    path::Path,
};

use flate2::read::GzDecoder;
use futures::io::{AsyncRead, AsyncReadExt};

use crate::{
    document::Document,
    error::ParseError,
    reader::Reader,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Fail on top-level lines that start no record instead of warning.
    pub deny_unrecognized_lines: bool,
    /// Fill values missing at end of input with `?` instead of failing.
    pub allow_truncated_records: bool,
}

/// Reads a file, decompressing it first when the extension is `.gz`.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document, ParseError> {
    parse_file_with_options(path, ParserOptions::default())
}

pub fn parse_file_with_options(
    path: impl AsRef<Path>,
    options: ParserOptions,
) -> Result<Document, ParseError> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|err| ParseError::from(err).with_path(path_ref))?;
    let mut reader: Box<dyn Read> = if path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
    {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|err| ParseError::from(err).with_path(path_ref))?;
    let text = String::from_utf8(buf).map_err(|err| ParseError::from(err).with_path(path_ref))?;
    parse_str_with_options(&text, options).map_err(|err| err.with_path(path_ref))
}

pub fn parse_reader<R: BufRead>(
    mut reader: R,
    options: ParserOptions,
) -> Result<Document, ParseError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_str_with_options(&buf, options)
}

/// Reads the whole stream asynchronously, then parses it in place.
pub async fn parse_async_reader<R>(
    mut reader: R,
    options: ParserOptions,
) -> Result<Document, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(ParseError::from)?;
    let text = String::from_utf8(buf).map_err(ParseError::from)?;
    parse_str_with_options(&text, options)
}

pub fn parse_str(input: &str) -> Result<Document, ParseError> {
    parse_str_with_options(input, ParserOptions::default())
}

pub fn parse_str_with_options(input: &str, options: ParserOptions) -> Result<Document, ParseError> {
    parse_lines(source_lines(input), options)
}

/// Parses lines supplied by the caller. Lines should carry their terminator.
pub fn parse_lines<I>(lines: I, options: ParserOptions) -> Result<Document, ParseError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    Reader::new(options).parse(lines)
}

fn source_lines(input: &str) -> impl Iterator<Item = String> + '_ {
    input.split_inclusive('\n').map(|line| match line.strip_suffix("\r\n") {
        Some(body) => format!("{body}\n"),
        None => line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use std::error::Error as StdError;

    #[test]
    fn source_lines_keep_terminators() {
        let lines: Vec<_> = source_lines("a\r\nb\n\nc").collect();
        assert_eq!(lines, vec!["a\n", "b\n", "\n", "c"]);
        assert_eq!(source_lines("").count(), 0);
    }

    #[test]
    fn parse_minimal_document() {
        let cif = "data_demo\n\
                   _entry.id demo\n\
                   _cell.length_a 10.0\n\
                   loop_\n\
                   _atom_site.id\n\
                   _atom_site.type_symbol\n\
                   1 C\n\
                   2 O\n";

        let doc = parse_str(cif).expect("parsed");
        assert_eq!(doc.block_name(), Some("demo"));
        assert_eq!(doc.scalar("entry", "id"), Some("demo"));
        assert_eq!(doc.scalar("cell", "length_a"), Some("10.0"));
        assert_eq!(doc.rows("atom_site").map(<[_]>::len), Some(2));
    }

    #[test]
    fn crlf_text_blocks_fold_like_lf() {
        let unix = parse_str("_a.b\n;x\ny\n;\n").unwrap();
        let dos = parse_str("_a.b\r\n;x\r\ny\r\n;\r\n").unwrap();
        assert_eq!(unix.scalar("a", "b"), Some("xy\n"));
        assert_eq!(dos, unix);
    }

    #[test]
    fn parse_reader_matches_parse_str() {
        let cif = "_entry.id 1ABC\nloop_\n_a.x\n1\n2\n";
        let from_reader = parse_reader(cif.as_bytes(), ParserOptions::default()).unwrap();
        assert_eq!(from_reader, parse_str(cif).unwrap());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = parse_file("does/not/exist.cif").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Io);
        assert_eq!(err.path(), Some(Path::new("does/not/exist.cif")));
    }

    #[test]
    fn async_utf8_errors_keep_their_source() {
        let input = futures::io::Cursor::new(b"_entry.id \xe9\n".to_vec());
        let err = block_on(parse_async_reader(input, ParserOptions::default())).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Utf8);
        assert!(StdError::source(&err).is_some());
    }
}
