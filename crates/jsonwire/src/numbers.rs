//! Number lexing for the reader.

/// Lexical hint so readers can distinguish ints vs floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberLexeme {
    /// No fraction and no exponent.
    Integer,
    Float,
}

/// Length of the JSON number at the start of `bytes`, or `None` if the bytes
/// do not start with a grammatical number.
///
/// Grammar: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
pub(crate) fn scan_number(bytes: &[u8]) -> Option<(usize, NumberLexeme)> {
    let mut i = 0;
    let mut kind = NumberLexeme::Integer;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => i += 1 + count_digits(&bytes[i + 1..]),
        _ => return None,
    }
    if bytes.get(i) == Some(&b'.') {
        let digits = count_digits(&bytes[i + 1..]);
        if digits == 0 {
            return None;
        }
        i += 1 + digits;
        kind = NumberLexeme::Float;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let digits = count_digits(&bytes[i..]);
        if digits == 0 {
            return None;
        }
        i += digits;
        kind = NumberLexeme::Float;
    }
    Some((i, kind))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Parses the magnitude of an integer lexeme (without sign), `None` on overflow.
pub(crate) fn parse_magnitude(digits: &[u8]) -> Option<u64> {
    digits.iter().try_fold(0u64, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
    })
}

/// Parses an integer lexeme as `i64`, `None` on overflow.
pub(crate) fn parse_i64(lexeme: &[u8]) -> Option<i64> {
    match lexeme.split_first() {
        Some((b'-', digits)) => {
            let magnitude = parse_magnitude(digits)?;
            if magnitude == 1 << 63 {
                Some(i64::MIN)
            } else {
                i64::try_from(magnitude).ok().map(|m| -m)
            }
        }
        _ => i64::try_from(parse_magnitude(lexeme)?).ok(),
    }
}

/// Parses an integer lexeme as `u64`, `None` on overflow or a negative sign.
pub(crate) fn parse_u64(lexeme: &[u8]) -> Option<u64> {
    match lexeme {
        [b'-', b'0'] => Some(0),
        [b'-', ..] => None,
        _ => parse_magnitude(lexeme),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(b"0", Some((1, NumberLexeme::Integer)))]
    #[case(b"-0", Some((2, NumberLexeme::Integer)))]
    #[case(b"123,", Some((3, NumberLexeme::Integer)))]
    #[case(b"1.5]", Some((3, NumberLexeme::Float)))]
    #[case(b"-1e10", Some((5, NumberLexeme::Float)))]
    #[case(b"2E-3 ", Some((4, NumberLexeme::Float)))]
    #[case(b"01", Some((1, NumberLexeme::Integer)))]
    #[case(b"1.", None)]
    #[case(b"1e", None)]
    #[case(b"-", None)]
    #[case(b".5", None)]
    #[case(b"+1", None)]
    fn scans(#[case] input: &[u8], #[case] expected: Option<(usize, NumberLexeme)>) {
        assert_eq!(scan_number(input), expected);
    }

    #[test]
    fn i64_bounds() {
        assert_eq!(parse_i64(b"-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_i64(b"9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_i64(b"9223372036854775808"), None);
        assert_eq!(parse_i64(b"-9223372036854775809"), None);
    }

    #[test]
    fn u64_bounds() {
        assert_eq!(parse_u64(b"18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_u64(b"18446744073709551616"), None);
        assert_eq!(parse_u64(b"-1"), None);
        assert_eq!(parse_u64(b"-0"), Some(0));
    }
}
