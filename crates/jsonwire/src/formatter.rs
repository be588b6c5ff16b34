//! The codec protocol.
//!
//! A [`JsonFormatter<T>`] converts one type to and from JSON. Formatters are
//! looked up through a [`JsonResolver`](crate::JsonResolver) and called through
//! `Arc<dyn JsonFormatter<T>>`. For types whose codec is a pair of plain
//! functions a resolver can additionally publish a [`FastPath`], which
//! containers call directly instead of going through the vtable.
//!
//! Containers resolve their element codec once per call into a
//! [`SerializeDispatch`] or [`DeserializeDispatch`] and apply it to every
//! element.

use std::{fmt, sync::Arc};

use crate::{JsonOptions, JsonReader, JsonWriter, error::Error};

/// Codec for a single type.
///
/// Implementations must be immutable after construction; any cache they keep
/// is initialized at most once (see [`EnumFormatter`](crate::formatters::EnumFormatter)).
pub trait JsonFormatter<T>: Send + Sync {
    /// Appends the JSON form of `value` to `writer`.
    ///
    /// # Errors
    ///
    /// Fails if a nested formatter cannot be resolved or fails itself.
    fn serialize(&self, writer: &mut JsonWriter, value: &T, options: &JsonOptions)
    -> Result<(), Error>;

    /// Reads one JSON value into a new `T`.
    ///
    /// # Errors
    ///
    /// Structural and format errors from the reader, configuration errors
    /// from nested lookups, and resource errors from scratch allocation.
    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<T, Error>;

    /// Reads one JSON value into an existing `target`.
    ///
    /// The default replaces `target`. Collection formatters merge instead.
    ///
    /// # Errors
    ///
    /// As [`deserialize`](Self::deserialize). On error `target` may hold a
    /// partially merged value.
    fn deserialize_to(
        &self,
        reader: &mut JsonReader<'_>,
        target: &mut T,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        *target = self.deserialize(reader, options)?;
        Ok(())
    }
}

impl<T, F: JsonFormatter<T> + ?Sized> JsonFormatter<T> for Arc<F> {
    fn serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        (**self).serialize(writer, value, options)
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<T, Error> {
        (**self).deserialize(reader, options)
    }

    fn deserialize_to(
        &self,
        reader: &mut JsonReader<'_>,
        target: &mut T,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        (**self).deserialize_to(reader, target, options)
    }
}

/// Statically known serializer.
pub type SerializeFn<T> = fn(&mut JsonWriter, &T, &JsonOptions) -> Result<(), Error>;

/// Statically known deserializer.
pub type DeserializeFn<T> = fn(&mut JsonReader<'_>, &JsonOptions) -> Result<T, Error>;

/// Function-pointer codec for `T`. `None` means no fast path for that direction.
///
/// A registered fast path must behave exactly like the formatter registered
/// for the same type.
pub struct FastPath<T> {
    pub serialize: Option<SerializeFn<T>>,
    pub deserialize: Option<DeserializeFn<T>>,
}

impl<T> FastPath<T> {
    #[must_use]
    pub const fn new(serialize: SerializeFn<T>, deserialize: DeserializeFn<T>) -> Self {
        Self {
            serialize: Some(serialize),
            deserialize: Some(deserialize),
        }
    }
}

impl<T> Clone for FastPath<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FastPath<T> {}

impl<T> fmt::Debug for FastPath<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastPath")
            .field("serialize", &self.serialize.is_some())
            .field("deserialize", &self.deserialize.is_some())
            .finish()
    }
}

/// Formatter backed by a pair of functions.
///
/// Registering a primitive through
/// [`FormatterRegistry::register_static`](crate::FormatterRegistry::register_static)
/// wraps the same two functions in this type and publishes them as the fast
/// path, so both call paths run the same code.
pub struct StaticFormatter<T> {
    serialize: SerializeFn<T>,
    deserialize: DeserializeFn<T>,
}

impl<T> StaticFormatter<T> {
    #[must_use]
    pub const fn new(serialize: SerializeFn<T>, deserialize: DeserializeFn<T>) -> Self {
        Self {
            serialize,
            deserialize,
        }
    }
}

impl<T> fmt::Debug for StaticFormatter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticFormatter")
            .field("type", &core::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T> JsonFormatter<T> for StaticFormatter<T> {
    fn serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        (self.serialize)(writer, value, options)
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<T, Error> {
        (self.deserialize)(reader, options)
    }
}

/// Serializer for `T`, resolved once and applied to many values.
pub enum SerializeDispatch<T: 'static> {
    FastPath(SerializeFn<T>),
    Formatter(Arc<dyn JsonFormatter<T>>),
}

impl<T: 'static> SerializeDispatch<T> {
    #[inline]
    pub fn serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        match self {
            Self::FastPath(serialize) => serialize(writer, value, options),
            Self::Formatter(formatter) => formatter.serialize(writer, value, options),
        }
    }

    #[must_use]
    pub fn is_fast_path(&self) -> bool {
        matches!(self, Self::FastPath(_))
    }
}

impl<T: 'static> fmt::Debug for SerializeDispatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastPath(_) => f.write_str("SerializeDispatch::FastPath"),
            Self::Formatter(_) => f.write_str("SerializeDispatch::Formatter"),
        }
    }
}

/// Deserializer for `T`, resolved once and applied to many values.
pub enum DeserializeDispatch<T: 'static> {
    FastPath(DeserializeFn<T>),
    Formatter(Arc<dyn JsonFormatter<T>>),
}

impl<T: 'static> DeserializeDispatch<T> {
    #[inline]
    pub fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<T, Error> {
        match self {
            Self::FastPath(deserialize) => deserialize(reader, options),
            Self::Formatter(formatter) => formatter.deserialize(reader, options),
        }
    }

    /// Reads into `target`. A fast path always replaces.
    pub fn deserialize_to(
        &self,
        reader: &mut JsonReader<'_>,
        target: &mut T,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        match self {
            Self::FastPath(deserialize) => {
                *target = deserialize(reader, options)?;
                Ok(())
            }
            Self::Formatter(formatter) => formatter.deserialize_to(reader, target, options),
        }
    }

    #[must_use]
    pub fn is_fast_path(&self) -> bool {
        matches!(self, Self::FastPath(_))
    }
}

impl<T: 'static> fmt::Debug for DeserializeDispatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastPath(_) => f.write_str("DeserializeDispatch::FastPath"),
            Self::Formatter(_) => f.write_str("DeserializeDispatch::Formatter"),
        }
    }
}
