//! Shell-style line tokenizer.
//!
//! Words are split and unquoted by [`shlex`] with POSIX-shell rules:
//!
//! - `'...'` is taken literally
//! - `"..."` is literal except for backslash escapes of `"` and `\`
//! - outside quotes a backslash makes the next character literal
//! - adjacent quoted and unquoted pieces join into one token
//!
//! Only ASCII space and tab separate words. `#` is not a comment character
//! inside a line.

use shlex::Shlex;

use crate::Span;

const SEPARATORS: [char; 2] = [' ', '\t'];

/// A token with its byte range in the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The unquoted text.
    pub text: String,
    /// Where the raw token sits in the line.
    pub span: Span,
}

/// A word that cannot be unquoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexError {
    /// A quote that was opened and never closed.
    UnclosedQuote {
        /// From the start of the word to the end of the line.
        span: Span,
    },
    /// A backslash with nothing after it.
    TrailingBackslash {
        /// From the start of the word to the end of the line.
        span: Span,
    },
}

/// Tokenize one line.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut start = 0;
    while let Some(offset) = line[start..].find(|c: char| !SEPARATORS.contains(&c)) {
        start += offset;
        let token = next_word(line, start)?;
        start = token.span.end;
        tokens.push(token);
    }
    Ok(tokens)
}

/// The word starting at `start`. It ends at the first separator that is
/// neither quoted nor escaped.
fn next_word(line: &str, start: usize) -> Result<Token, LexError> {
    let rest = &line[start..];
    let ends = rest
        .match_indices(|c: char| SEPARATORS.contains(&c))
        .map(|(index, _)| start + index)
        .chain(std::iter::once(line.len()));

    for end in ends {
        if let Some(text) = unquote(&line[start..end]) {
            return Ok(Token {
                text,
                span: Span::new(start, end),
            });
        }
    }

    let span = Span::new(start, line.len());
    match rest.strip_suffix('\\') {
        Some(head) if unquote(head).is_some() => Err(LexError::TrailingBackslash { span }),
        _ => Err(LexError::UnclosedQuote { span }),
    }
}

/// Unquote one raw word, or `None` if a quote or escape is left open.
fn unquote(raw: &str) -> Option<String> {
    // shlex reads a word-initial `#` as a comment.
    let escaped;
    let raw = if raw.starts_with('#') {
        escaped = format!("\\{raw}");
        escaped.as_str()
    } else {
        raw
    };

    let mut lexer = Shlex::new(raw);
    let text = lexer.next().unwrap_or_default();
    (!lexer.had_error).then_some(text)
}
