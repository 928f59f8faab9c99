//! Tokenizer for flag strings.
//!
//! Splits a string such as `-tags netgo -ldflags "-X main.version=1.2.3 -s -w"` into
//! argument tokens. A token may be wrapped in single or double quotes to embed
//! whitespace; only the quote character that opened a span closes it, so the other
//! quote character is literal inside the span.

use thiserror::Error;

/// Errors produced while tokenizing a flag string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  /// The input ended inside a quoted span.
  #[error("unterminated {quote} quote in arguments: {input}")]
  UnterminatedQuote { quote: char, input: String },
}

/// Split `input` into tokens, honoring quoted spans.
///
/// Runs of whitespace outside quotes separate tokens and never produce empty
/// tokens. An empty or all-whitespace input yields an empty vector.
///
/// # Errors
///
/// Returns [`ParseError::UnterminatedQuote`] if a quoted span is never closed.
pub fn parse(input: &str) -> Result<Vec<String>, ParseError> {
  let mut tokens = Vec::new();
  let mut current = String::new();
  let mut open_quote: Option<char> = None;
  // Distinguishes `""` (an empty token) from no token at all.
  let mut has_token = false;

  for c in input.chars() {
    match open_quote {
      Some(q) if c == q => open_quote = None,
      Some(_) => current.push(c),
      None if c == '"' || c == '\'' => {
        open_quote = Some(c);
        has_token = true;
      }
      None if c.is_whitespace() => {
        if has_token {
          tokens.push(std::mem::take(&mut current));
          has_token = false;
        }
      }
      None => {
        current.push(c);
        has_token = true;
      }
    }
  }

  if let Some(quote) = open_quote {
    return Err(ParseError::UnterminatedQuote {
      quote,
      input: input.to_string(),
    });
  }

  if has_token {
    tokens.push(current);
  }

  Ok(tokens)
}
