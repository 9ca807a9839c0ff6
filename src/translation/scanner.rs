#[derive(Clone)]
pub(super) enum State {
    Normal,
    /// Backslash escapes apply in MySQL literals and PostgreSQL `E'...'` strings.
    SingleQuoted { backslash_escapes: bool },
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

pub(super) fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        std::str::from_utf8(&bytes[start..idx])
            .ok()
            .map(|digits| (idx, digits))
    }
}

/// A quote at `idx` opens a PostgreSQL escape string when it directly follows a standalone
/// `E` or `e`.
pub(super) fn opens_escape_string(bytes: &[u8], idx: usize) -> bool {
    idx > 0 && matches!(bytes[idx - 1], b'E' | b'e') && !follows_identifier(bytes, idx - 1)
}

/// `$` inside an identifier (`price$1`) is part of the name, not a marker.
pub(super) fn follows_identifier(bytes: &[u8], idx: usize) -> bool {
    idx > 0 && {
        let prev = bytes[idx - 1];
        prev.is_ascii_alphanumeric() || prev == b'_' || prev == b'$' || prev >= 0x80
    }
}
