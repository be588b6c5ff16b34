//! Lookup table for JSON string escaping.
//!
//! Indexed by byte value. `0` means the byte is copied verbatim, `b'u'` means
//! it is written as `\u00XX`, and any other entry is the character that
//! follows the backslash.

const __: u8 = 0;
const UU: u8 = b'u';
const BB: u8 = b'b';
const TT: u8 = b't';
const NN: u8 = b'n';
const FF: u8 = b'f';
const RR: u8 = b'r';
const QU: u8 = b'"';
const BS: u8 = b'\\';

#[rustfmt::skip]
pub(crate) static ESCAPE: [u8; 256] = [
    // 0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    UU, UU, UU, UU, UU, UU, UU, UU, BB, TT, NN, UU, FF, RR, UU, UU, // 0
    UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, // 1
    __, __, QU, __, __, __, __, __, __, __, __, __, __, __, __, __, // 2
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 3
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 4
    __, __, __, __, __, __, __, __, __, __, __, __, BS, __, __, __, // 5
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 6
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 7
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 8
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 9
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // A
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // B
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // C
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // D
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // E
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // F
];

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Exact length of the escaped form of `src`, without quotes.
pub(crate) fn escaped_len(src: &[u8]) -> usize {
    src.iter()
        .map(|&byte| match ESCAPE[byte as usize] {
            0 => 1,
            UU => 6,
            _ => 2,
        })
        .sum()
}

/// Escapes `src` into `dst`, returning the number of bytes written.
///
/// `dst` must hold at least [`escaped_len(src)`](escaped_len) bytes.
pub(crate) fn escape_into(src: &[u8], dst: &mut [u8]) -> usize {
    let mut written = 0;
    let mut start = 0;
    for (i, &byte) in src.iter().enumerate() {
        let action = ESCAPE[byte as usize];
        if action == 0 {
            continue;
        }
        let run = &src[start..i];
        dst[written..written + run.len()].copy_from_slice(run);
        written += run.len();
        start = i + 1;

        dst[written] = b'\\';
        dst[written + 1] = action;
        written += 2;
        if action == UU {
            dst[written] = b'0';
            dst[written + 1] = b'0';
            dst[written + 2] = HEX_DIGITS[(byte >> 4) as usize];
            dst[written + 3] = HEX_DIGITS[(byte & 0xF) as usize];
            written += 4;
        }
    }
    let run = &src[start..];
    dst[written..written + run.len()].copy_from_slice(run);
    written + run.len()
}

/// Returns the quoted, escaped JSON form of `s`, e.g. `"a\"b"`.
pub(crate) fn quote(s: &str) -> Vec<u8> {
    let len = escaped_len(s.as_bytes());
    let mut out = vec![0; len + 2];
    out[0] = b'"';
    escape_into(s.as_bytes(), &mut out[1..=len]);
    out[len + 1] = b'"';
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_copied() {
        assert_eq!(quote("hello"), b"\"hello\"");
    }

    #[test]
    fn short_escapes() {
        assert_eq!(quote("a\"b\\c\n\r\t\x08\x0C"), br#""a\"b\\c\n\r\t\b\f""#);
    }

    #[test]
    fn control_bytes_use_unicode_escapes() {
        assert_eq!(quote("\x00\x1f"), br#""\u0000\u001f""#);
    }

    #[test]
    fn escaped_len_matches_output() {
        for text in ["", "plain", "a\"b", "\x00\x1f\n", "åβ"] {
            assert_eq!(escaped_len(text.as_bytes()) + 2, quote(text).len(), "{text:?}");
        }
    }

    #[test]
    fn non_ascii_is_not_escaped() {
        assert_eq!(quote("åβ👍"), "\"åβ👍\"".as_bytes());
    }
}
