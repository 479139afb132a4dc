//! Byte canonicalization of dissector text fields
//!
//! Dissectors print raw element payloads as Python-style byte literals, mixing
//! printable characters with `\xHH` escapes (`'\x01\x00ab'`). The fingerprint
//! only needs a stable number per field, so the payload is rebuilt into bytes
//! and summed.

/// Marker that opens a hex-escaped byte once backslashes are stripped
const HEX_MARKER: char = 'x';

/// Rebuild the byte sequence behind a byte-literal text field
///
/// - Surrounding single quotes are stripped.
/// - `\n`, `\t`, `\r` stand for their control bytes.
/// - Every other backslash separates tokens.
/// - A token starting with `x` is a run of hex digit pairs after the marker.
/// - In any other token, every character is a literal byte.
///
/// Returns `None` for a malformed field: a hex run that is empty, of odd
/// length or holds a non-hex digit, or a character that does not fit in one
/// byte.
pub fn canonical_bytes(text: &str) -> Option<Vec<u8>> {
    let cleaned = expand_escapes(text.trim_matches('\''));
    let mut bytes = Vec::with_capacity(cleaned.len());

    for token in cleaned.split_whitespace() {
        match token.strip_prefix(HEX_MARKER) {
            Some(run) => bytes.extend(hex_pairs(run)?),
            None => {
                for c in token.chars() {
                    bytes.push(u8::try_from(u32::from(c)).ok()?);
                }
            }
        }
    }
    Some(bytes)
}

fn hex_pairs(run: &str) -> Option<Vec<u8>> {
    let digits = run.chars().map(|c| c.to_digit(16)).collect::<Option<Vec<u32>>>()?;
    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }
    Some(digits.chunks(2).map(|pair| (pair[0] * 16 + pair[1]) as u8).collect())
}

/// Arithmetic sum of [`canonical_bytes`]
///
/// ```
/// use probecount::fingerprint::canonical_byte_sum;
///
/// assert_eq!(canonical_byte_sum("ab"), Some(0x61 + 0x62));
/// assert_eq!(canonical_byte_sum(r"'\x01\x02'"), Some(3));
/// assert_eq!(canonical_byte_sum(r"\xzz"), None);
/// ```
pub fn canonical_byte_sum(text: &str) -> Option<u64> {
    canonical_bytes(text).map(|bytes| bytes.iter().map(|&b| u64::from(b)).sum())
}

/// Turn textual escapes into hex escapes and backslashes into separators
fn expand_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let control = match chars.peek() {
            Some('n') => Some("x0a"),
            Some('t') => Some("x09"),
            Some('r') => Some("x0d"),
            _ => None,
        };
        out.push(' ');
        if let Some(escape) = control {
            chars.next();
            out.push_str(escape);
            out.push(' ');
        }
    }
    out
}

/// Sum of the hex numbers in an OUI field
///
/// Uses the first parenthesized group when present (`"Apple, Inc. (00:17:f2)"`),
/// otherwise the whole field. Numbers are separated by `:` or whitespace and
/// may carry a `0x` prefix.
pub fn oui_byte_sum(oui: &str) -> Option<u64> {
    let group = oui
        .find('(')
        .and_then(|start| {
            let rest = &oui[start + 1..];
            rest.find(')').map(|end| &rest[..end])
        })
        .unwrap_or(oui);

    group
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let digits = part
                .strip_prefix("0x")
                .or_else(|| part.strip_prefix("0X"))
                .unwrap_or(part);
            u64::from_str_radix(digits, 16).ok()
        })
        .sum()
}

/// Sum of every sub-field value that is a plain decimal integer
pub fn numeric_field_sum<'a, I>(values: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|v| v.parse::<u64>().ok())
        .sum()
}
