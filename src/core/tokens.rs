//! Filepath: src/core/tokens.rs
//! Cheap token estimation for the generated bundle. A deliberate heuristic
//! rather than a real BPE pass: words weigh ~1.3 tokens each, and the
//! remaining characters (punctuation, whitespace) half a token.

/// Characters that end a word for estimation purposes.
fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '.' | ','
                | '!'
                | '?'
                | ';'
                | ':'
                | '('
                | ')'
                | '{'
                | '}'
                | '['
                | ']'
                | '<'
                | '>'
                | '"'
                | '\''
                | '`'
                | '~'
                | '|'
                | '\\'
                | '/'
                | '@'
                | '#'
                | '$'
                | '%'
                | '^'
                | '&'
                | '*'
                | '+'
                | '='
                | '_'
                | '-'
        )
}

/// Estimate the token count of `text`.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }

    let mut word_count = 0usize;
    let mut word_chars = 0usize;
    for word in text.split(is_separator).filter(|w| !w.is_empty()) {
        word_count += 1;
        word_chars += word.chars().count();
    }

    let total_chars = text.chars().count();
    let estimate = word_count as f64 * 1.3 + (total_chars - word_chars) as f64 * 0.5;
    estimate.ceil() as usize
}

/// Rough comfort band for a token count, used to color the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenBand {
    /// Fits comfortably in a typical prompt.
    Comfortable,
    /// Getting close to common context limits.
    Tight,
    /// Likely too large for a single prompt.
    Oversized,
}

impl TokenBand {
    pub fn of(count: usize) -> Self {
        if count > 6000 {
            Self::Oversized
        } else if count > 4000 {
            Self::Tight
        } else {
            Self::Comfortable
        }
    }
}
