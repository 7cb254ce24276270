//! Record assembly on top of [`LineIterator`].
//!
//! Each logical line at the top level is classified by its first token and
//! handed to the matching record handler. Scalar entries and loops write into
//! the [`Document`]; a later definition of a category replaces the earlier one
//! whatever its shape.

use log::{debug, trace, warn};

use crate::document::{Document, Row};
use crate::error::{ParseError, ParseErrorKind, ParseWarning, Result};
use crate::lines::{LineIterator, LogicalLine};
use crate::parser::ParserOptions;

const LOOP_MARKER: &str = "loop_";
const DATA_MARKER: &str = "data_";
const UNKNOWN_VALUE: &str = "?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Record {
    Entry,
    Loop,
    Comment,
    DataBlock,
    Blank,
    Unrecognized,
}

impl Record {
    fn classify(line: &LogicalLine) -> Self {
        if line.is_empty() {
            return Record::Blank;
        }
        match line.marker() {
            Some(token) if token.starts_with('_') => Record::Entry,
            Some(token) if token.starts_with(LOOP_MARKER) => Record::Loop,
            Some(token) if token.starts_with('#') => Record::Comment,
            Some(token) if token.starts_with(DATA_MARKER) => Record::DataBlock,
            _ => Record::Unrecognized,
        }
    }
}

/// End of input, or a line that opens a new record.
fn is_boundary(line: Option<&LogicalLine>) -> bool {
    match line {
        None => true,
        Some(line) => matches!(
            Record::classify(line),
            Record::Entry | Record::Loop | Record::Comment | Record::DataBlock
        ),
    }
}

/// Splits `_category.field` into its two halves.
fn split_key(token: &str, line: usize) -> Result<(String, String)> {
    let name = token.strip_prefix('_').unwrap_or(token);
    name.split_once('.')
        .map(|(category, field)| (category.to_string(), field.to_string()))
        .ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::MalformedKey,
                format!("`{token}` is not of the form `_category.field`"),
            )
            .with_line(line)
        })
}

/// Builds a [`Document`] from one pass over a line sequence.
pub struct Reader {
    options: ParserOptions,
    document: Document,
}

impl Reader {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            document: Document::new(),
        }
    }

    pub fn parse<I>(mut self, lines: I) -> Result<Document>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut lines = LineIterator::new(lines.into_iter());
        while let Some(line) = lines.next() {
            match Record::classify(&line) {
                Record::Entry => self.parse_entry(line, &mut lines)?,
                Record::Loop => self.parse_loop(line, &mut lines)?,
                Record::Comment | Record::Blank => {}
                Record::DataBlock => self.parse_data_block(line),
                Record::Unrecognized => self.unrecognized(line)?,
            }
        }
        Ok(self.document)
    }

    fn warn(&mut self, line: usize, message: String) {
        warn!("line {line}: {message}");
        self.document.push_warning(ParseWarning { line, message });
    }

    fn unrecognized(&mut self, line: LogicalLine) -> Result<()> {
        let message = format!("unexpected line {:?}", line.tokens.join(" "));
        if self.options.deny_unrecognized_lines {
            return Err(
                ParseError::new(ParseErrorKind::UnrecognizedLine, message).with_line(line.line)
            );
        }
        self.warn(line.line, message);
        Ok(())
    }

    fn truncated(&mut self, line: usize, what: String) -> Result<()> {
        if self.options.allow_truncated_records {
            self.warn(line, format!("{what}; missing values set to `?`"));
            Ok(())
        } else {
            Err(ParseError::new(ParseErrorKind::UnexpectedEof, what).with_line(line))
        }
    }

    fn parse_data_block(&mut self, line: LogicalLine) {
        let name = line.tokens[0][DATA_MARKER.len()..].to_string();
        match self.document.block_name() {
            None => self.document.set_block_name(name),
            Some(current) => debug!(
                "line {}: ignoring data block `{name}` after `{current}`",
                line.line
            ),
        }
    }

    fn parse_entry<I>(&mut self, line: LogicalLine, lines: &mut LineIterator<I>) -> Result<()>
    where
        I: Iterator,
        I::Item: Into<String>,
    {
        let start = line.line;
        let mut tokens = line.tokens;
        if tokens.len() < 2 {
            match lines.next() {
                Some(value) => tokens.extend(value.tokens),
                None => {
                    self.truncated(start, format!("`{}` has no value", tokens[0]))?;
                    tokens.push(UNKNOWN_VALUE.to_string());
                }
            }
        }

        let (category, field) = split_key(&tokens[0], start)?;
        let value = tokens[1..].join(" ");
        trace!("line {start}: {category}.{field} = {value:?}");
        self.document.set_scalar(category, field, value);
        Ok(())
    }

    fn parse_loop<I>(&mut self, line: LogicalLine, lines: &mut LineIterator<I>) -> Result<()>
    where
        I: Iterator,
        I::Item: Into<String>,
    {
        let start = line.line;
        let mut root: Option<String> = None;
        let mut keys = Vec::new();

        while let Some(key_line) = lines.next_if_key() {
            let (category, key) = split_key(&key_line.tokens[0], key_line.line)?;
            if let Some(previous) = root.as_deref().filter(|previous| *previous != category) {
                warn!(
                    "line {}: loop key `{category}.{key}` follows keys of `{previous}`",
                    key_line.line
                );
            }
            root = Some(category);
            keys.push(key);
        }

        let Some(root) = root else {
            return Err(ParseError::new(
                ParseErrorKind::EmptyLoop,
                "loop_ is not followed by any `_category.field` key",
            )
            .with_line(start));
        };

        let mut rows = Vec::new();
        while !is_boundary(lines.peek()) {
            let Some(first) = lines.next() else { break };
            let row_start = first.line;
            let mut tokens = first.tokens;
            while tokens.len() < keys.len() {
                match lines.next() {
                    Some(more) => tokens.extend(more.tokens),
                    None => {
                        self.truncated(
                            row_start,
                            format!(
                                "row of `{root}` has {} of {} values at end of input",
                                tokens.len(),
                                keys.len()
                            ),
                        )?;
                        tokens.resize(keys.len(), UNKNOWN_VALUE.to_string());
                    }
                }
            }
            if tokens.len() > keys.len() {
                debug!(
                    "line {row_start}: dropping {} surplus values in `{root}` row",
                    tokens.len() - keys.len()
                );
            }
            let row: Row = keys.iter().cloned().zip(tokens).collect();
            rows.push(row);
        }

        trace!("line {start}: loop `{root}` with {} rows", rows.len());
        self.document.set_loop(root, rows);
        Ok(())
    }
}

impl<I> LineIterator<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    /// Consumes the next line if it declares a loop key.
    fn next_if_key(&mut self) -> Option<LogicalLine> {
        let is_key = self
            .peek()
            .and_then(LogicalLine::marker)
            .is_some_and(|token| token.starts_with('_'));
        if is_key {
            self.next()
        } else {
            None
        }
    }
}
