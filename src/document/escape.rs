//! Literal-string escaping for text drawn into content streams.

use unicode_normalization::UnicodeNormalization;

/// Keyword that ends a stream object.
const STREAM_END: &str = "endstream";

/// Escape `(`, `)` and `\` with a preceding backslash.
///
/// The result can be embedded between parentheses as a literal string
/// operand without unbalancing it. The `e` of any `endstream` in the text
/// is written as the octal escape `\145`, so a payload never contains the
/// keyword that closes its stream.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for (i, ch) in input.char_indices() {
        match ch {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(ch);
            }
            'e' if input[i..].starts_with(STREAM_END) => out.push_str("\\145"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse [`escape_text`].
///
/// Octal escapes of up to three digits decode to the byte they name. A
/// trailing lone backslash is kept as-is.
pub fn unescape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        let Some(mut code) = next.to_digit(8) else {
            out.push(next);
            continue;
        };
        for _ in 0..2 {
            match chars.peek().and_then(|c| c.to_digit(8)) {
                Some(digit) => {
                    code = code * 8 + digit;
                    chars.next();
                }
                None => break,
            }
        }
        out.push(char::from((code & 0xff) as u8));
    }
    out
}

/// NFC-normalize and flatten whitespace runs (including newlines) to one space.
pub fn normalize_text(input: &str) -> String {
    let composed: String = input.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}
