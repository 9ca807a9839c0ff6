use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, matches_tag,
    try_start_dollar_quote,
};
use scanner::{State, follows_identifier, opens_escape_string, scan_digits};

/// Source placeholder style of the SQL text handed to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// MySQL-style positional `?` markers, numbered by order of appearance.
    Mysql,
    /// PostgreSQL-style numbered `$N` markers, keeping their literal number.
    Postgres,
}

/// Rewrite ordinal placeholders into the service's named `:N` markers.
///
/// `?` markers become `:1`, `:2`, ... left to right, one number per occurrence. `$N` markers
/// become `:N`, so reuse and gaps in the numbering survive:
/// ```rust
/// use sql_dataapi::translation::{PlaceholderStyle, rewrite_placeholders};
///
/// assert_eq!(rewrite_placeholders("SELECT ?, ?", PlaceholderStyle::Mysql), "SELECT :1, :2");
/// assert_eq!(rewrite_placeholders("SELECT $2, $1", PlaceholderStyle::Postgres), "SELECT :2, :1");
/// ```
/// Markers inside string literals, quoted identifiers, comments and dollar-quoted blocks are
/// left alone. Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn rewrite_placeholders(sql: &str, style: PlaceholderStyle) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut next_ordinal = 0usize;
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => {
                    state = State::SingleQuoted {
                        backslash_escapes: style == PlaceholderStyle::Mysql
                            || opens_escape_string(bytes, idx),
                    };
                }
                b'"' => state = State::DoubleQuoted,
                b'`' if style == PlaceholderStyle::Mysql => state = State::Backticked,
                _ if is_line_comment_start(bytes, idx, style) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' if style == PlaceholderStyle::Postgres => {
                    if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = advance;
                    } else if !follows_identifier(bytes, idx)
                        && let Some((digits_end, digits)) = scan_digits(bytes, idx + 1)
                    {
                        let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
                        buf.push_str(&sql[copied..idx]);
                        buf.push(':');
                        buf.push_str(digits);
                        copied = digits_end;
                        idx = digits_end - 1;
                    }
                }
                b'?' if style == PlaceholderStyle::Mysql => {
                    next_ordinal += 1;
                    let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
                    buf.push_str(&sql[copied..idx]);
                    buf.push(':');
                    buf.push_str(&next_ordinal.to_string());
                    copied = idx + 1;
                }
                _ => {}
            },
            State::SingleQuoted { backslash_escapes } => {
                if backslash_escapes && b == b'\\' {
                    idx += 1; // skip escaped byte
                } else if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if style == PlaceholderStyle::Mysql && b == b'\\' {
                    idx += 1;
                } else if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::Backticked => {
                if b == b'`' {
                    if bytes.get(idx + 1) == Some(&b'`') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                // only PostgreSQL nests block comments
                if style == PlaceholderStyle::Postgres && is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    if depth == 1 {
                        state = State::Normal;
                    } else {
                        state = State::BlockComment(depth - 1);
                    }
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    let tag_len = tag.len();
                    state = State::Normal;
                    idx += tag_len + 1;
                }
            }
        }

        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}
