//! Splits a single physical line into tokens.
//!
//! A token is a maximal run of characters that are either plain
//! (non-whitespace, non-quote) or a complete `'...'` / `"..."` span. A quote
//! with no partner later on the line joins no run, so it separates tokens and
//! is dropped. Tokens are returned untrimmed: only the surrounding matching
//! quotes of a fully quoted token are removed.

pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut index = 0;

    while let Some(ch) = line[index..].chars().next() {
        match ch {
            '"' | '\'' => match line[index + 1..].find(ch) {
                Some(offset) => {
                    start.get_or_insert(index);
                    index += offset + 2;
                }
                None => {
                    flush(line, &mut start, index, &mut tokens);
                    index += 1;
                }
            },
            c if c.is_whitespace() => {
                flush(line, &mut start, index, &mut tokens);
                index += c.len_utf8();
            }
            c => {
                start.get_or_insert(index);
                index += c.len_utf8();
            }
        }
    }
    flush(line, &mut start, index, &mut tokens);

    tokens
}

fn flush(line: &str, start: &mut Option<usize>, end: usize, tokens: &mut Vec<String>) {
    if let Some(begin) = start.take() {
        tokens.push(unquote(&line[begin..end]).to_string());
    }
}

fn unquote(token: &str) -> &str {
    let bytes = token.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&first), Some(&last))
            if bytes.len() >= 2 && first == last && matches!(first, b'"' | b'\'') =>
        {
            &token[1..token.len() - 1]
        }
        _ => token,
    }
}
