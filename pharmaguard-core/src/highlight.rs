//! JSON syntax highlighting for the raw-result viewer.
//!
//! Works on pretty-printed text rather than on a parsed value so the viewer
//! shows exactly what will be exported. Tokens partition the input:
//! concatenating their text reproduces it byte for byte. An object key token
//! includes its trailing colon (and any whitespace before it).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Key,
    String,
    Number,
    Bool,
    Null,
    Plain,
    Whitespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let (kind, end) = match bytes[i] {
            b'"' => scan_string(bytes, i),
            b'-' | b'0'..=b'9' => match scan_number(bytes, i) {
                Some(end) => (TokenKind::Number, end),
                None => (TokenKind::Plain, i + 1),
            },
            b if b.is_ascii_alphabetic() => {
                let end = scan_while(bytes, i, |b| b.is_ascii_alphabetic());
                let kind = match &src[i..end] {
                    "true" | "false" => TokenKind::Bool,
                    "null" => TokenKind::Null,
                    _ => TokenKind::Plain,
                };
                (kind, end)
            }
            b if b.is_ascii_whitespace() => (
                TokenKind::Whitespace,
                scan_while(bytes, i, |b| b.is_ascii_whitespace()),
            ),
            _ => {
                let width = src[i..].chars().next().map(char::len_utf8).unwrap_or(1);
                (TokenKind::Plain, i + width)
            }
        };
        tokens.push(Token {
            kind,
            text: &src[i..end],
        });
        i = end;
    }
    tokens
}

fn scan_while(bytes: &[u8], start: usize, pred: impl Fn(u8) -> bool) -> usize {
    let mut j = start;
    while j < bytes.len() && pred(bytes[j]) {
        j += 1;
    }
    j
}

/// `start` is an opening quote. Unterminated strings run to end of input.
fn scan_string(bytes: &[u8], start: usize) -> (TokenKind, usize) {
    let mut j = start + 1;
    loop {
        if j >= bytes.len() {
            return (TokenKind::String, bytes.len());
        }
        match bytes[j] {
            b'\\' => j += 2,
            b'"' => break,
            _ => j += 1,
        }
    }
    let close = j + 1;

    // A string followed by optional whitespace and a colon is a key.
    let after_ws = scan_while(bytes, close, |b| b.is_ascii_whitespace());
    if after_ws < bytes.len() && bytes[after_ws] == b':' {
        (TokenKind::Key, after_ws + 1)
    } else {
        (TokenKind::String, close)
    }
}

/// `-?\d+(\.\d*)?([eE][+-]?\d+)?`, or `None` if no digit follows a leading minus.
fn scan_number(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start;
    if bytes[j] == b'-' {
        j += 1;
    }
    let int_end = scan_while(bytes, j, |b| b.is_ascii_digit());
    if int_end == j {
        return None;
    }
    j = int_end;

    if j < bytes.len() && bytes[j] == b'.' {
        j = scan_while(bytes, j + 1, |b| b.is_ascii_digit());
    }

    if j < bytes.len() && (bytes[j] == b'e' || bytes[j] == b'E') {
        let mut k = j + 1;
        if k < bytes.len() && (bytes[k] == b'+' || bytes[k] == b'-') {
            k += 1;
        }
        let exp_end = scan_while(bytes, k, |b| b.is_ascii_digit());
        if exp_end > k {
            j = exp_end;
        }
    }
    Some(j)
}

/// Pretty-print `value` with two-space indentation, as exported.
pub fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Tokenized lines, for a line-numbered viewer.
pub fn highlight_lines(text: &str) -> Vec<Vec<Token<'_>>> {
    text.split('\n').map(tokenize).collect()
}

pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}
