//! Decoding of backslash escapes inside JSON strings.
//!
//! [`UnicodeEscapeBuffer`] accumulates exactly four ASCII hexadecimal digits
//! (`0-9`, `A-F`, `a-f`) into a UTF-16 code unit. [`unescape`] drives it and
//! pairs high and low surrogates into a single scalar value.
//!
//! # Errors
//!
//! - A non-hexadecimal digit yields [`FormatError::InvalidUnicodeEscapeChar`].
//! - A lone surrogate yields [`FormatError::InvalidUnicodeEscapeSequence`].
//! - Any other character after `\` yields [`FormatError::InvalidEscape`].

use memchr::memchr;

use crate::error::FormatError;

#[derive(Debug)]
pub(crate) struct UnicodeEscapeBuffer {
    acc: u32,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub(crate) fn new() -> Self {
        Self { acc: 0, len: 0 }
    }

    #[inline]
    fn hex_val(b: u8) -> Option<u32> {
        match b {
            b'0'..=b'9' => Some(u32::from(b - b'0')),
            b'a'..=b'f' => Some(u32::from(b - b'a') + 10),
            b'A'..=b'F' => Some(u32::from(b - b'A') + 10),
            _ => None,
        }
    }

    /// Feeds one digit; returns the code unit once the fourth digit arrives.
    pub(crate) fn feed(&mut self, b: u8) -> Result<Option<u32>, FormatError> {
        let d = Self::hex_val(b).ok_or(FormatError::InvalidUnicodeEscapeChar(b as char))?;
        self.acc = (self.acc << 4) | d;
        self.len += 1;
        if self.len < 4 {
            return Ok(None);
        }
        let unit = self.acc;
        self.acc = 0;
        self.len = 0;
        Ok(Some(unit))
    }
}

/// Reads the four hex digits at the start of `bytes`.
fn read_code_unit(bytes: &[u8]) -> Result<u32, FormatError> {
    let mut buf = UnicodeEscapeBuffer::new();
    for &b in bytes.iter().take(4) {
        if let Some(unit) = buf.feed(b)? {
            return Ok(unit);
        }
    }
    Err(FormatError::UnterminatedString)
}

/// Decodes the escaped string body `raw` (the bytes between the quotes).
///
/// `raw` must not contain an unescaped `"`. The returned bytes are not yet
/// validated as UTF-8.
pub(crate) fn unescape(raw: &[u8]) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(slash) = memchr(b'\\', rest) {
        out.extend_from_slice(&rest[..slash]);
        let Some(&kind) = rest.get(slash + 1) else {
            return Err(FormatError::UnterminatedString);
        };
        rest = &rest[slash + 2..];
        let decoded = match kind {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let (ch, consumed) = decode_unicode_escape(rest)?;
                rest = &rest[consumed..];
                let mut utf8 = [0; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                continue;
            }
            other => return Err(FormatError::InvalidEscape(other as char)),
        };
        out.push(decoded);
    }
    out.extend_from_slice(rest);
    Ok(out)
}

/// Decodes the digits following `\u`, consuming a second `\uXXXX` when the
/// first is a high surrogate. Returns the char and the bytes consumed.
fn decode_unicode_escape(bytes: &[u8]) -> Result<(char, usize), FormatError> {
    let high = read_code_unit(bytes)?;
    match high {
        0xD800..=0xDBFF => {
            if bytes.get(4..6) != Some(b"\\u".as_slice()) {
                return Err(FormatError::InvalidUnicodeEscapeSequence(high));
            }
            let low = read_code_unit(&bytes[6..])?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(FormatError::InvalidUnicodeEscapeSequence(low));
            }
            let scalar = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(scalar)
                .map(|ch| (ch, 10))
                .ok_or(FormatError::InvalidUnicodeEscapeSequence(scalar))
        }
        0xDC00..=0xDFFF => Err(FormatError::InvalidUnicodeEscapeSequence(high)),
        _ => char::from_u32(high)
            .map(|ch| (ch, 4))
            .ok_or(FormatError::InvalidUnicodeEscapeSequence(high)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_decoding() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'4').unwrap(), None);
        assert_eq!(buf.feed(b'1').unwrap(), Some(0x41));
    }

    #[test]
    fn invalid_hex_error() {
        let mut buf = UnicodeEscapeBuffer::new();
        let err = buf.feed(b'G').unwrap_err();
        assert_eq!(err, FormatError::InvalidUnicodeEscapeChar('G'));
    }

    #[test]
    fn short_escapes() {
        assert_eq!(
            unescape(br#"a\"b\\c\/d\b\f\n\r\t"#).unwrap(),
            b"a\"b\\c/d\x08\x0C\n\r\t"
        );
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(unescape(br"\u0041\u00e5").unwrap(), "Aå".as_bytes());
    }

    #[test]
    fn surrogate_pairs_combine() {
        assert_eq!(unescape(br"\ud83d\udc4d").unwrap(), "👍".as_bytes());
    }

    #[test]
    fn lone_surrogates_are_rejected() {
        assert_eq!(
            unescape(br"\uD800").unwrap_err(),
            FormatError::InvalidUnicodeEscapeSequence(0xD800)
        );
        assert_eq!(
            unescape(br"\uDC00x").unwrap_err(),
            FormatError::InvalidUnicodeEscapeSequence(0xDC00)
        );
        assert_eq!(
            unescape(br"\uD800\u0041").unwrap_err(),
            FormatError::InvalidUnicodeEscapeSequence(0x41)
        );
    }

    #[test]
    fn unknown_escape() {
        assert_eq!(unescape(br"\x").unwrap_err(), FormatError::InvalidEscape('x'));
    }

    #[test]
    fn truncated_unicode_escape() {
        assert_eq!(unescape(br"\u00").unwrap_err(), FormatError::UnterminatedString);
    }
}
