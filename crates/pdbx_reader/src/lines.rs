//! Logical-line iteration over raw mmCIF text lines.
//!
//! [`LineIterator`] turns physical lines into [`LogicalLine`]s. Most logical
//! lines are one tokenized physical line. A line starting with `;` opens a
//! text block that runs until the next line starting with `;`; the whole block
//! becomes one logical line holding a single token.
//!
//! Folding drops the last character of the text accumulated so far before
//! appending each following line, so sources are expected to yield lines with
//! their `\n` terminator attached (see [`crate::parser`]).

use std::collections::VecDeque;

use log::{debug, warn};

use crate::tokenizer::tokenize;

/// Tokens of one logical line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogicalLine {
    pub tokens: Vec<String>,
    /// 1-based physical line where this logical line starts.
    pub line: usize,
    /// Folded from a `;` text block. Never treated as a record marker.
    pub text_block: bool,
    /// The line opens with a quote, so its first token is a value.
    pub quoted: bool,
}

impl LogicalLine {
    pub fn first(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// First token, unless it is a text block or a quoted value.
    pub(crate) fn marker(&self) -> Option<&str> {
        if self.text_block || self.quoted {
            None
        } else {
            self.first()
        }
    }
}

/// Forward-only iterator of [`LogicalLine`]s with lookahead.
pub struct LineIterator<I> {
    lines: I,
    lookahead: VecDeque<LogicalLine>,
    consumed: usize,
}

impl<I> LineIterator<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            lookahead: VecDeque::new(),
            consumed: 0,
        }
    }

    /// Returns the next logical line without consuming it.
    pub fn peek(&mut self) -> Option<&LogicalLine> {
        if self.lookahead.is_empty() {
            let resolved = self.resolve()?;
            self.lookahead.push_back(resolved);
        }
        self.lookahead.front()
    }

    fn pull(&mut self) -> Option<String> {
        let raw = self.lines.next()?;
        self.consumed += 1;
        Some(raw.into())
    }

    fn resolve(&mut self) -> Option<LogicalLine> {
        let raw = self.pull()?;
        let line = self.consumed;

        let Some(opened) = raw.strip_prefix(';') else {
            return Some(LogicalLine {
                tokens: tokenize(&raw),
                line,
                text_block: false,
                quoted: raw.trim_start().starts_with(['\'', '"']),
            });
        };

        let mut text = opened.to_string();
        loop {
            match self.pull() {
                Some(next) if next.starts_with(';') => {
                    if !next[1..].trim().is_empty() {
                        debug!(
                            "line {}: discarding text after closing `;`: {:?}",
                            self.consumed,
                            next[1..].trim()
                        );
                    }
                    break;
                }
                Some(next) => {
                    text.pop();
                    text.push_str(&next);
                }
                None => {
                    warn!("line {line}: text block is not closed before end of input");
                    break;
                }
            }
        }

        Some(LogicalLine {
            tokens: vec![text],
            line,
            text_block: true,
            quoted: false,
        })
    }
}

impl<I> Iterator for LineIterator<I>
where
    I: Iterator,
    I::Item: Into<String>,
{
    type Item = LogicalLine;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lookahead.pop_front() {
            Some(line) => Some(line),
            None => self.resolve(),
        }
    }
}
