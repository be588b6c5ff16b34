//! Cursor over a complete JSON document.
//!
//! `JsonReader` never copies its input. Strings without escapes are handed out
//! as borrowed slices of the input; only strings containing escapes are
//! decoded into owned buffers.
//!
//! Method naming follows a small convention:
//! - `read_is_*` consume the expected token if it is next and report whether
//!   it was there. They never fail.
//! - `read_is_*_with_verify` consume the expected token or fail with a
//!   [`StructuralError`].
//! - `read_*` decode a token and fail with a [`FormatError`] if the next token
//!   has the wrong kind or content.
//!
//! All errors carry the byte offset of the cursor at the point of failure.

mod unescape;

use std::borrow::Cow;

use memchr::memchr2;
use smallvec::SmallVec;

use crate::{
    error::{Error, FormatError, Found, StructuralError},
    numbers::{self, NumberLexeme},
};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Grammar category of the next non-whitespace byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonToken {
    /// End of input, or a byte that cannot start any token.
    None,
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Number,
    String,
    Boolean,
    Null,
    ValueSeparator,
    NameSeparator,
}

/// Cursor over a complete JSON document held in memory.
///
/// Cloning is cheap and gives an independent cursor, which is how callers
/// look ahead without consuming input.
#[derive(Debug, Clone)]
pub struct JsonReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> JsonReader<'a> {
    /// Creates a reader positioned at the start of `bytes`, past a UTF-8 BOM
    /// if one is present.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        let offset = if bytes.starts_with(BOM) { BOM.len() } else { 0 };
        Self { bytes, offset }
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// The unread input.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }

    pub(crate) fn structural_error(&self, kind: StructuralError) -> Error {
        Error::Structural {
            kind,
            position: self.offset,
        }
    }

    /// Builds a [`FormatError`] located at the cursor.
    #[must_use]
    pub fn format_error(&self, kind: FormatError) -> Error {
        Error::Format {
            kind,
            position: self.offset,
        }
    }

    fn format_error_at(&self, kind: FormatError, position: usize) -> Error {
        Error::Format { kind, position }
    }

    /// Advances past JSON whitespace (space, tab, line feed, carriage return).
    pub fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.bytes.get(self.offset) {
            self.offset += 1;
        }
    }

    #[inline]
    fn peek_byte(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bytes.get(self.offset).copied()
    }

    /// Classifies the next token without consuming it.
    pub fn peek_token(&mut self) -> JsonToken {
        match self.peek_byte() {
            Some(b'{') => JsonToken::BeginObject,
            Some(b'}') => JsonToken::EndObject,
            Some(b'[') => JsonToken::BeginArray,
            Some(b']') => JsonToken::EndArray,
            Some(b'"') => JsonToken::String,
            Some(b'-' | b'0'..=b'9') => JsonToken::Number,
            Some(b't' | b'f') => JsonToken::Boolean,
            Some(b'n') => JsonToken::Null,
            Some(b',') => JsonToken::ValueSeparator,
            Some(b':') => JsonToken::NameSeparator,
            _ => JsonToken::None,
        }
    }

    #[inline]
    fn read_is(&mut self, byte: u8) -> bool {
        if self.peek_byte() == Some(byte) {
            self.offset += 1;
            true
        } else {
            false
        }
    }

    fn read_is_with_verify(&mut self, byte: u8) -> Result<(), Error> {
        if self.read_is(byte) {
            Ok(())
        } else {
            let found = Found(self.bytes.get(self.offset).copied());
            Err(self.structural_error(StructuralError::Expected {
                expected: byte as char,
                found,
            }))
        }
    }

    fn read_is_literal(&mut self, literal: &[u8]) -> bool {
        self.skip_whitespace();
        if self.remaining().starts_with(literal) {
            self.offset += literal.len();
            true
        } else {
            false
        }
    }

    /// Consumes `null` if it is the next token.
    pub fn read_is_null(&mut self) -> bool {
        self.read_is_literal(b"null")
    }

    /// Consumes `null`.
    ///
    /// # Errors
    ///
    /// A format error naming the token found instead, or a structural error at
    /// the end of input.
    pub fn read_null(&mut self) -> Result<(), Error> {
        if self.read_is_null() {
            Ok(())
        } else {
            Err(self.unexpected_token("null"))
        }
    }

    /// Consumes `[` if it is the next byte.
    pub fn read_is_begin_array(&mut self) -> bool {
        self.read_is(b'[')
    }

    /// Consumes `[`, failing with [`StructuralError::Expected`] otherwise.
    pub fn read_is_begin_array_with_verify(&mut self) -> Result<(), Error> {
        self.read_is_with_verify(b'[')
    }

    /// Consumes `]` if it is the next byte.
    pub fn read_is_end_array(&mut self) -> bool {
        self.read_is(b']')
    }

    /// Consumes `]` or fails.
    pub fn read_is_end_array_with_verify(&mut self) -> Result<(), Error> {
        self.read_is_with_verify(b']')
    }

    /// Consumes `{` if it is the next byte.
    pub fn read_is_begin_object(&mut self) -> bool {
        self.read_is(b'{')
    }

    /// Consumes `{` or fails.
    pub fn read_is_begin_object_with_verify(&mut self) -> Result<(), Error> {
        self.read_is_with_verify(b'{')
    }

    /// Consumes `}` if it is the next byte.
    pub fn read_is_end_object(&mut self) -> bool {
        self.read_is(b'}')
    }

    /// Consumes `}` or fails.
    pub fn read_is_end_object_with_verify(&mut self) -> Result<(), Error> {
        self.read_is_with_verify(b'}')
    }

    /// Consumes `,` if it is the next byte.
    pub fn read_is_value_separator(&mut self) -> bool {
        self.read_is(b',')
    }

    /// Consumes `,` or fails.
    pub fn read_is_value_separator_with_verify(&mut self) -> Result<(), Error> {
        self.read_is_with_verify(b',')
    }

    /// Consumes the `:` between a property name and its value, or fails.
    pub fn read_is_name_separator_with_verify(&mut self) -> Result<(), Error> {
        self.read_is_with_verify(b':')
    }

    /// Drives every array decode loop.
    ///
    /// With `count == 0` (just after `[`) this checks for an immediate `]`.
    /// Afterwards it requires either `]` or a `,` followed by another element.
    /// Returns `true` once the closing `]` has been consumed; otherwise
    /// increments `count` and leaves the cursor on the first byte of the next
    /// element.
    pub fn read_is_end_array_with_skip_value_separator(
        &mut self,
        count: &mut usize,
    ) -> Result<bool, Error> {
        self.read_is_end_with_skip_value_separator(b']', count)
    }

    /// Object counterpart of
    /// [`read_is_end_array_with_skip_value_separator`](Self::read_is_end_array_with_skip_value_separator).
    pub fn read_is_end_object_with_skip_value_separator(
        &mut self,
        count: &mut usize,
    ) -> Result<bool, Error> {
        self.read_is_end_with_skip_value_separator(b'}', count)
    }

    fn read_is_end_with_skip_value_separator(
        &mut self,
        close: u8,
        count: &mut usize,
    ) -> Result<bool, Error> {
        let next = self.peek_byte();
        if next == Some(close) {
            self.offset += 1;
            return Ok(true);
        }
        if *count != 0 {
            if next != Some(b',') {
                return Err(self.structural_error(StructuralError::ExpectedSeparatorOrEnd {
                    close: close as char,
                    found: Found(next),
                }));
            }
            self.offset += 1;
            if self.peek_byte() == Some(close) {
                return Err(self.structural_error(StructuralError::TrailingSeparator {
                    close: close as char,
                }));
            }
        }
        *count += 1;
        self.skip_whitespace();
        Ok(false)
    }

    /// Fails unless only whitespace remains.
    pub fn ensure_end(&mut self) -> Result<(), Error> {
        if self.peek_byte().is_some() {
            return Err(self.structural_error(StructuralError::TrailingCharacters));
        }
        Ok(())
    }

    fn unexpected_token(&mut self, expected: &'static str) -> Error {
        let found = Found(self.peek_byte());
        if found.0.is_none() {
            self.structural_error(StructuralError::UnexpectedValueStart { found })
        } else {
            self.format_error(FormatError::UnexpectedToken { expected, found })
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Skipping
    // ---------------------------------------------------------------------------------------------

    /// Skips exactly one value (scalar, array or object) without decoding it.
    ///
    /// Nesting is tracked on an explicit stack, so arbitrarily deep input does
    /// not recurse.
    pub fn read_next_block(&mut self) -> Result<(), Error> {
        let mut closers: SmallVec<[u8; 32]> = SmallVec::new();
        loop {
            match self.peek_token() {
                JsonToken::BeginObject => {
                    self.offset += 1;
                    if !self.read_is_end_object() {
                        closers.push(b'}');
                        self.read_property_name_segment_raw()?;
                        continue;
                    }
                }
                JsonToken::BeginArray => {
                    self.offset += 1;
                    if !self.read_is_end_array() {
                        closers.push(b']');
                        continue;
                    }
                }
                JsonToken::String => {
                    self.read_string_segment_raw()?;
                }
                JsonToken::Number => {
                    self.read_number_segment()?;
                }
                JsonToken::Boolean => {
                    self.read_boolean()?;
                }
                JsonToken::Null => {
                    self.read_null()?;
                }
                _ => {
                    let found = Found(self.bytes.get(self.offset).copied());
                    return Err(
                        self.structural_error(StructuralError::UnexpectedValueStart { found })
                    );
                }
            }

            // A value just ended: close containers until another value is due.
            loop {
                let Some(&close) = closers.last() else {
                    return Ok(());
                };
                match self.peek_byte() {
                    Some(b',') => {
                        self.offset += 1;
                        if self.peek_byte() == Some(close) {
                            return Err(self.structural_error(StructuralError::TrailingSeparator {
                                close: close as char,
                            }));
                        }
                        if close == b'}' {
                            self.read_property_name_segment_raw()?;
                        }
                        break;
                    }
                    Some(b) if b == close => {
                        self.offset += 1;
                        closers.pop();
                    }
                    found => {
                        return Err(self.structural_error(
                            StructuralError::ExpectedSeparatorOrEnd {
                                close: close as char,
                                found: Found(found),
                            },
                        ));
                    }
                }
            }
        }
    }

    /// Skips one value and returns its raw bytes.
    pub fn read_next_block_segment(&mut self) -> Result<&'a [u8], Error> {
        self.skip_whitespace();
        let start = self.offset;
        self.read_next_block()?;
        Ok(&self.bytes[start..self.offset])
    }

    // ---------------------------------------------------------------------------------------------
    // Strings
    // ---------------------------------------------------------------------------------------------

    /// Locates the string at the cursor. Returns the body (between the quotes)
    /// and whether it contains escapes; the cursor ends after the closing
    /// quote.
    fn scan_string(&mut self) -> Result<(&'a [u8], bool), Error> {
        if self.peek_byte() != Some(b'"') {
            return Err(self.unexpected_token("string"));
        }
        let start = self.offset + 1;
        let mut i = start;
        let mut escaped = false;
        loop {
            let Some(hit) = memchr2(b'"', b'\\', &self.bytes[i..]) else {
                return Err(self.format_error(FormatError::UnterminatedString));
            };
            i += hit;
            if self.bytes[i] == b'"' {
                break;
            }
            escaped = true;
            i += 2;
            if i > self.bytes.len() {
                return Err(self.format_error(FormatError::UnterminatedString));
            }
        }
        let body = &self.bytes[start..i];
        if let Some(at) = body.iter().position(|&b| b < 0x20) {
            return Err(self.format_error_at(
                FormatError::ControlCharacterInString(body[at]),
                start + at,
            ));
        }
        self.offset = i + 1;
        Ok((body, escaped))
    }

    /// Reads a string, borrowing from the input when it has no escapes.
    pub fn read_string(&mut self) -> Result<Cow<'a, str>, Error> {
        self.skip_whitespace();
        let start = self.offset;
        let (body, escaped) = self.scan_string()?;
        if escaped {
            let decoded = unescape::unescape(body).map_err(|kind| self.format_error_at(kind, start))?;
            String::from_utf8(decoded)
                .map(Cow::Owned)
                .map_err(|_| self.format_error_at(FormatError::InvalidUtf8, start))
        } else {
            core::str::from_utf8(body)
                .map(Cow::Borrowed)
                .map_err(|_| self.format_error_at(FormatError::InvalidUtf8, start))
        }
    }

    /// Returns the bytes between the quotes without decoding escapes.
    pub fn read_string_segment_raw(&mut self) -> Result<&'a [u8], Error> {
        self.scan_string().map(|(body, _)| body)
    }

    /// Reads `"name":` and returns the decoded name.
    pub fn read_property_name(&mut self) -> Result<Cow<'a, str>, Error> {
        let name = self.read_string()?;
        self.read_is_name_separator_with_verify()?;
        Ok(name)
    }

    /// Reads `"name":` and returns the undecoded name bytes.
    pub fn read_property_name_segment_raw(&mut self) -> Result<&'a [u8], Error> {
        let name = self.read_string_segment_raw()?;
        self.read_is_name_separator_with_verify()?;
        Ok(name)
    }

    // ---------------------------------------------------------------------------------------------
    // Scalars
    // ---------------------------------------------------------------------------------------------

    /// Reads `true` or `false`.
    ///
    /// A token that starts like a boolean but is not one is
    /// [`FormatError::InvalidLiteral`].
    pub fn read_boolean(&mut self) -> Result<bool, Error> {
        if self.read_is_literal(b"true") {
            Ok(true)
        } else if self.read_is_literal(b"false") {
            Ok(false)
        } else if matches!(self.peek_byte(), Some(b't' | b'f')) {
            Err(self.format_error(FormatError::InvalidLiteral))
        } else {
            Err(self.unexpected_token("boolean"))
        }
    }

    fn scan_number_lexeme(&mut self) -> Result<(&'a [u8], NumberLexeme), Error> {
        if !matches!(self.peek_byte(), Some(b'-' | b'0'..=b'9')) {
            return Err(self.unexpected_token("number"));
        }
        let Some((len, kind)) = numbers::scan_number(self.remaining()) else {
            return Err(self.format_error(FormatError::InvalidNumber));
        };
        let lexeme = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok((lexeme, kind))
    }

    /// Reads the raw bytes of a number token after validating its grammar.
    pub fn read_number_segment(&mut self) -> Result<&'a [u8], Error> {
        self.scan_number_lexeme().map(|(lexeme, _)| lexeme)
    }

    fn read_integer_lexeme(&mut self) -> Result<(&'a [u8], usize), Error> {
        self.skip_whitespace();
        let start = self.offset;
        let (lexeme, kind) = self.scan_number_lexeme()?;
        if kind == NumberLexeme::Float {
            return Err(self.format_error_at(FormatError::InvalidNumber, start));
        }
        Ok((lexeme, start))
    }

    /// Reads an integer token, rejecting fractions and exponents.
    pub fn read_i64(&mut self) -> Result<i64, Error> {
        let (lexeme, start) = self.read_integer_lexeme()?;
        numbers::parse_i64(lexeme)
            .ok_or_else(|| self.format_error_at(FormatError::NumberOutOfRange("i64"), start))
    }

    /// Unsigned counterpart of [`read_i64`](Self::read_i64). `-0` reads as `0`.
    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let (lexeme, start) = self.read_integer_lexeme()?;
        numbers::parse_u64(lexeme)
            .ok_or_else(|| self.format_error_at(FormatError::NumberOutOfRange("u64"), start))
    }

    /// Reads any number token, or one of the strings `"NaN"`,
    /// `"Infinity"` and `"-Infinity"`.
    pub fn read_f64(&mut self) -> Result<f64, Error> {
        if let Some(value) = self.read_non_finite() {
            return Ok(value);
        }
        self.skip_whitespace();
        let start = self.offset;
        let lexeme = self.read_number_segment()?;
        fast_float::parse(lexeme).map_err(|_| self.format_error_at(FormatError::InvalidNumber, start))
    }

    /// [`read_f64`](Self::read_f64) at single precision.
    pub fn read_f32(&mut self) -> Result<f32, Error> {
        if let Some(value) = self.read_non_finite() {
            #[allow(clippy::cast_possible_truncation)]
            return Ok(value as f32);
        }
        self.skip_whitespace();
        let start = self.offset;
        let lexeme = self.read_number_segment()?;
        fast_float::parse(lexeme).map_err(|_| self.format_error_at(FormatError::InvalidNumber, start))
    }

    fn read_non_finite(&mut self) -> Option<f64> {
        if self.read_is_literal(b"\"NaN\"") {
            Some(f64::NAN)
        } else if self.read_is_literal(b"\"Infinity\"") {
            Some(f64::INFINITY)
        } else if self.read_is_literal(b"\"-Infinity\"") {
            Some(f64::NEG_INFINITY)
        } else {
            None
        }
    }
}

macro_rules! narrow_integer_reads {
    ($($method:ident => $ty:ty, $wide:ident;)*) => {
        impl JsonReader<'_> {
            $(
                #[doc = concat!("Reads a `", stringify!($ty), "`, failing with [`FormatError::NumberOutOfRange`] if the integer does not fit.")]
                pub fn $method(&mut self) -> Result<$ty, Error> {
                    self.skip_whitespace();
                    let start = self.offset;
                    let wide = self.$wide()?;
                    <$ty>::try_from(wide).map_err(|_| {
                        self.format_error_at(FormatError::NumberOutOfRange(stringify!($ty)), start)
                    })
                }
            )*
        }
    };
}

narrow_integer_reads! {
    read_i8 => i8, read_i64;
    read_i16 => i16, read_i64;
    read_i32 => i32, read_i64;
    read_isize => isize, read_i64;
    read_u8 => u8, read_u64;
    read_u16 => u16, read_u64;
    read_u32 => u32, read_u64;
    read_usize => usize, read_u64;
}
