use std::{borrow::Cow, fmt, marker::PhantomData};

use crate::{JsonOptions, JsonReader, JsonWriter, error::Error, formatter::JsonFormatter};

/// Formatter for owned string types: `String`, `Box<str>` and `Arc<str>`.
///
/// `null` follows [`NullHandling`](crate::NullHandling) and decodes to the
/// empty string by default. Escape-free input is copied once; strings with
/// escapes are decoded once and moved into `S` where the conversion allows.
pub struct StrFormatter<S>(PhantomData<fn() -> S>);

impl<S> StrFormatter<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<S> Default for StrFormatter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for StrFormatter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StrFormatter")
    }
}

impl<S> StrFormatter<S>
where
    S: AsRef<str> + Default + for<'a> From<Cow<'a, str>>,
{
    pub fn serialize_static(writer: &mut JsonWriter, value: &S, _options: &JsonOptions) -> Result<(), Error> {
        writer.write_string(value.as_ref());
        Ok(())
    }

    pub fn deserialize_static(reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<S, Error> {
        if let Some(empty) = options.null_or_default::<S>(reader)? {
            return Ok(empty);
        }
        reader.read_string().map(S::from)
    }
}

impl<S> JsonFormatter<S> for StrFormatter<S>
where
    S: AsRef<str> + Default + for<'a> From<Cow<'a, str>>,
{
    fn serialize(&self, writer: &mut JsonWriter, value: &S, options: &JsonOptions) -> Result<(), Error> {
        Self::serialize_static(writer, value, options)
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<S, Error> {
        Self::deserialize_static(reader, options)
    }
}
