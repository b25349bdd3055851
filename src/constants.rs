pub const DEFAULT_INDENT: usize = 2;

pub const MAX_INDENT: usize = 16;

pub const DEFAULT_INLINE_LIMIT: usize = 128;

pub const MAX_INLINE_LIMIT: usize = 2048;

/// Maximum nesting of block and inline containers accepted by the decoder.
pub const MAX_DEPTH: usize = 256;

/// Key used by `TopLevel::Dict` when the mode string is a bare `"dict"`.
pub const DEFAULT_TOP_LEVEL_KEY: &str = "nestedtext";

/// Synthetic end-of-line code point produced by the line source.
pub(crate) const EOL_MARKER: char = '\n';

#[inline]
pub fn is_tag_char(ch: char) -> bool {
    matches!(ch, '-' | '>' | ':')
}

/// Characters that may not open an inline-safe dict key.
#[inline]
pub fn is_key_lead_char(ch: char) -> bool {
    matches!(ch, '-' | '>' | ':' | '[' | '{' | '#')
}

#[inline]
pub fn is_inline_structural_char(ch: char) -> bool {
    matches!(ch, '[' | ']' | '{' | '}' | ',')
}

#[inline]
pub fn is_blank_line(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}

#[inline]
pub fn is_comment_line(line: &str) -> bool {
    line.trim_start_matches([' ', '\t']).starts_with('#')
}
