//! Booleans, numbers and `char`.
//!
//! Each formatter is a unit struct whose `serialize_static`/`deserialize_static`
//! functions double as the fast path registered for its type. These types
//! have no empty value, so `null` is always rejected; wrap them in `Option`
//! to accept it.

use crate::{
    JsonOptions, JsonReader, JsonWriter,
    error::{Error, FormatError},
    formatter::JsonFormatter,
};

macro_rules! primitive_formatters {
    ($($(#[$doc:meta])* $formatter:ident => $ty:ty, $write:ident, $read:ident;)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $formatter;

            impl $formatter {
                #[inline]
                pub fn serialize_static(
                    writer: &mut JsonWriter,
                    value: &$ty,
                    _options: &JsonOptions,
                ) -> Result<(), Error> {
                    writer.$write(*value);
                    Ok(())
                }

                #[inline]
                pub fn deserialize_static(
                    reader: &mut JsonReader<'_>,
                    _options: &JsonOptions,
                ) -> Result<$ty, Error> {
                    reader.$read()
                }
            }

            impl JsonFormatter<$ty> for $formatter {
                fn serialize(
                    &self,
                    writer: &mut JsonWriter,
                    value: &$ty,
                    options: &JsonOptions,
                ) -> Result<(), Error> {
                    Self::serialize_static(writer, value, options)
                }

                fn deserialize(
                    &self,
                    reader: &mut JsonReader<'_>,
                    options: &JsonOptions,
                ) -> Result<$ty, Error> {
                    Self::deserialize_static(reader, options)
                }
            }
        )*
    };
}

primitive_formatters! {
    /// `true` / `false`.
    BoolFormatter => bool, write_boolean, read_boolean;
    I8Formatter => i8, write_i8, read_i8;
    I16Formatter => i16, write_i16, read_i16;
    I32Formatter => i32, write_i32, read_i32;
    I64Formatter => i64, write_i64, read_i64;
    IsizeFormatter => isize, write_isize, read_isize;
    U8Formatter => u8, write_u8, read_u8;
    U16Formatter => u16, write_u16, read_u16;
    U32Formatter => u32, write_u32, read_u32;
    U64Formatter => u64, write_u64, read_u64;
    UsizeFormatter => usize, write_usize, read_usize;
    /// Shortest round-trip decimal; non-finite values as `"NaN"`,
    /// `"Infinity"` and `"-Infinity"`.
    F32Formatter => f32, write_f32, read_f32;
    /// Shortest round-trip decimal; non-finite values as `"NaN"`,
    /// `"Infinity"` and `"-Infinity"`.
    F64Formatter => f64, write_f64, read_f64;
}

/// A one-character JSON string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharFormatter;

impl CharFormatter {
    pub fn serialize_static(
        writer: &mut JsonWriter,
        value: &char,
        _options: &JsonOptions,
    ) -> Result<(), Error> {
        let mut utf8 = [0; 4];
        writer.write_string(value.encode_utf8(&mut utf8));
        Ok(())
    }

    pub fn deserialize_static(reader: &mut JsonReader<'_>, _options: &JsonOptions) -> Result<char, Error> {
        reader.skip_whitespace();
        let start = reader.position();
        let text = reader.read_string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(Error::Format {
                kind: FormatError::InvalidCharLength(text.chars().count()),
                position: start,
            }),
        }
    }
}

impl JsonFormatter<char> for CharFormatter {
    fn serialize(&self, writer: &mut JsonWriter, value: &char, options: &JsonOptions) -> Result<(), Error> {
        Self::serialize_static(writer, value, options)
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<char, Error> {
        Self::deserialize_static(reader, options)
    }
}
