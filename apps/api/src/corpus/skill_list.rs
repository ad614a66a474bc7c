//! Parser for the list-literal encoding of the `Skills` column,
//! e.g. `['python', "c++", 'o\'reilly']`.

/// Parses a bracketed list of quoted strings. Accepts single or double quotes,
/// surrounding whitespace and a trailing comma. Escapes follow Python string
/// literals: `\n \t \r \0`, `\xNN`, `\uNNNN`, `\UNNNNNNNN`, and `\` before any
/// other character yields that character.
pub fn parse_skill_list(literal: &str) -> Result<Vec<String>, String> {
    let mut chars = literal.trim().chars().peekable();
    let mut skills = Vec::new();

    if chars.next() != Some('[') {
        return Err("expected '[' at start of skill list".to_string());
    }

    loop {
        skip_whitespace(&mut chars);
        match chars.next() {
            Some(']') => break,
            Some(quote @ ('\'' | '"')) => {
                skills.push(read_quoted(&mut chars, quote)?);
                skip_whitespace(&mut chars);
                match chars.next() {
                    Some(',') => continue,
                    Some(']') => break,
                    Some(c) => return Err(format!("expected ',' or ']' but found '{c}'")),
                    None => return Err("unterminated skill list".to_string()),
                }
            }
            Some(c) => return Err(format!("expected quoted string but found '{c}'")),
            None => return Err("unterminated skill list".to_string()),
        }
    }

    skip_whitespace(&mut chars);
    if let Some(c) = chars.next() {
        return Err(format!("unexpected '{c}' after closing ']'"));
    }

    Ok(skills)
}

fn skip_whitespace(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn read_quoted(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
) -> Result<String, String> {
    let mut value = String::new();
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some('0') => value.push('\0'),
                Some('x') => value.push(read_code_point(chars, 2)?),
                Some('u') => value.push(read_code_point(chars, 4)?),
                Some('U') => value.push(read_code_point(chars, 8)?),
                Some(c) => value.push(c),
                None => return Err("dangling escape in skill string".to_string()),
            },
            Some(c) if c == quote => return Ok(value),
            Some(c) => value.push(c),
            None => return Err("unterminated string in skill list".to_string()),
        }
    }
}

/// Reads exactly `digits` hex digits and returns the code point they encode.
fn read_code_point(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
) -> Result<char, String> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("truncated \\x/\\u escape '{hex}' in skill string"));
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("escape '{hex}' is not a valid code point"))
}
