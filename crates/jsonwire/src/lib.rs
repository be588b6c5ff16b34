//! Pluggable, low-allocation JSON serialization.
//!
//! Values are converted by [`JsonFormatter`]s that a [`JsonResolver`] looks up
//! per type. Scalars additionally publish function-pointer fast paths that
//! containers call without dynamic dispatch. Everything a formatter needs for
//! one call travels in [`JsonOptions`].
//!
//! ```rust
//! use jsonwire::JsonOptions;
//!
//! let options = JsonOptions::default();
//! let bytes = jsonwire::to_vec(&vec![1u32, 2, 3], &options).unwrap();
//! assert_eq!(bytes, b"[1,2,3]");
//!
//! let mut values: Vec<u32> = jsonwire::from_slice(&bytes, &options).unwrap();
//! jsonwire::from_slice_to(b"[4]", &mut values, &options).unwrap();
//! assert_eq!(values, [1, 2, 3, 4]);
//! ```

#![allow(missing_docs)]

mod error;
mod escape;
mod formatter;
pub mod formatters;
mod numbers;
mod options;
mod pool;
mod reader;
mod resolver;
mod writer;

#[cfg(test)]
mod tests;

pub use error::{ConfigurationError, Error, ErrorCategory, FormatError, Found, StructuralError};
pub use formatter::{
    DeserializeDispatch, DeserializeFn, FastPath, JsonFormatter, SerializeDispatch, SerializeFn,
    StaticFormatter,
};
pub use options::{JsonOptions, NullHandling};
pub use pool::{PoolStats, PooledVec, ScratchPool, ScratchPoolConfig};
pub use reader::{JsonReader, JsonToken};
pub use resolver::{
    CompositeResolver, ErasedFastPath, ErasedFormatter, FormatterRegistry, JsonResolver, ResolverExt,
    TypeKey,
};
pub use writer::JsonWriter;

/// Appends the JSON form of `value` to `writer`.
///
/// # Errors
///
/// [`ConfigurationError::FormatterNotRegistered`] if `T` or a nested type has
/// no formatter, or any error a formatter reports.
pub fn serialize_into<T: 'static>(writer: &mut JsonWriter, value: &T, options: &JsonOptions) -> Result<(), Error> {
    options.serializer::<T>()?.serialize(writer, value, options)
}

/// Serializes `value` into a new byte vector.
///
/// # Errors
///
/// As [`serialize_into`].
pub fn to_vec<T: 'static>(value: &T, options: &JsonOptions) -> Result<Vec<u8>, Error> {
    let mut writer = JsonWriter::new();
    serialize_into(&mut writer, value, options)?;
    Ok(writer.into_vec())
}

/// Serializes `value` into a new string.
///
/// # Errors
///
/// As [`serialize_into`], and [`FormatError::InvalidUtf8`] if a custom
/// formatter wrote raw bytes that are not UTF-8.
pub fn to_string<T: 'static>(value: &T, options: &JsonOptions) -> Result<String, Error> {
    String::from_utf8(to_vec(value, options)?).map_err(|err| Error::Format {
        kind: FormatError::InvalidUtf8,
        position: err.utf8_error().valid_up_to(),
    })
}

/// Reads one `T` from `bytes`, which must hold nothing else but whitespace.
///
/// # Errors
///
/// Structural or format errors for malformed input or trailing content,
/// configuration errors for unregistered types, resource errors if scratch
/// space cannot be allocated.
pub fn from_slice<T: 'static>(bytes: &[u8], options: &JsonOptions) -> Result<T, Error> {
    let mut reader = JsonReader::new(bytes);
    let value = options.deserializer::<T>()?.deserialize(&mut reader, options)?;
    reader.ensure_end()?;
    Ok(value)
}

/// [`from_slice`] for text.
///
/// # Errors
///
/// As [`from_slice`].
pub fn from_str<T: 'static>(text: &str, options: &JsonOptions) -> Result<T, Error> {
    from_slice(text.as_bytes(), options)
}

/// Reads `bytes` into an existing value, merging where `T`'s formatter
/// supports it (collections append, maps insert) and replacing otherwise.
///
/// # Errors
///
/// As [`from_slice`]. On error `target` may be partially updated.
pub fn from_slice_to<T: 'static>(bytes: &[u8], target: &mut T, options: &JsonOptions) -> Result<(), Error> {
    let mut reader = JsonReader::new(bytes);
    options
        .deserializer::<T>()?
        .deserialize_to(&mut reader, target, options)?;
    reader.ensure_end()
}
