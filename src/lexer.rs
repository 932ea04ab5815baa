//! Tokenizing for the interpreter's deliberately tiny grammar.
//!
//! There is no quoting: a token is a maximal run of non-whitespace characters.
//! Operator characters are not special here; the parser splits the raw line on
//! operators before any segment reaches the tokenizer.

/// Split `line` on runs of whitespace.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

/// The text following the first token of `line`, minus one separating
/// whitespace character. Inner spacing is preserved.
///
/// `echo` prints exactly this, so `echo   a  b` keeps its spacing.
pub fn rest_after_first_token(line: &str) -> &str {
    let line = line.trim_start();
    let end = line
        .find(char::is_whitespace)
        .unwrap_or(line.len());
    let rest = &line[end..];
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => rest,
    }
}
