//! Array-shaped containers and the decode loop they share.
//!
//! Every container writes `[e1,e2,...]` through [`serialize_elements`] and
//! reads through [`deserialize_elements`], which resolves the element codec
//! once and then alternates between decoding an element and
//! [`JsonReader::read_is_end_array_with_skip_value_separator`]. Fresh decodes
//! collect into a pooled scratch vector ([`deserialize_scratch`]) and copy the
//! result out once the element count is known.

use std::{fmt, sync::Arc};

use crate::{JsonOptions, JsonReader, JsonWriter, error::Error, formatter::JsonFormatter};

/// Scratch capacity for fixed-size array decodes.
pub(crate) const ARRAY_SCRATCH_CAPACITY: usize = 256;
/// Scratch capacity for lists, segments and other growable collections.
pub(crate) const LIST_SCRATCH_CAPACITY: usize = 64;

/// Writes `values` as a JSON array.
pub(crate) fn serialize_elements<'v, T: 'static>(
    writer: &mut JsonWriter,
    values: impl IntoIterator<Item = &'v T>,
    options: &JsonOptions,
) -> Result<(), Error> {
    let element = options.serializer::<T>()?;
    writer.write_begin_array();
    for (i, value) in values.into_iter().enumerate() {
        if i != 0 {
            writer.write_value_separator();
        }
        element.serialize(writer, value, options)?;
    }
    writer.write_end_array();
    Ok(())
}

/// Reads a JSON array, handing every element to `sink` in order.
pub(crate) fn deserialize_elements<T: 'static>(
    reader: &mut JsonReader<'_>,
    options: &JsonOptions,
    mut sink: impl FnMut(T) -> Result<(), Error>,
) -> Result<(), Error> {
    let element = options.deserializer::<T>()?;
    reader.read_is_begin_array_with_verify()?;
    let mut count = 0;
    while !reader.read_is_end_array_with_skip_value_separator(&mut count)? {
        sink(element.deserialize(reader, options)?)?;
    }
    Ok(())
}

/// Reads a JSON array into an exactly-sized vector.
///
/// Elements accumulate in a scratch vector rented from the options' pool,
/// which is handed back on every exit path.
pub(crate) fn deserialize_scratch<T: Send + 'static>(
    reader: &mut JsonReader<'_>,
    options: &JsonOptions,
    initial_capacity: usize,
) -> Result<Vec<T>, Error> {
    let mut scratch = options.pool.rent::<T>(initial_capacity)?;
    deserialize_elements(reader, options, |value| scratch.push(value))?;
    scratch.to_exact_vec()
}

macro_rules! marker_formatter {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub struct $name<T>(::core::marker::PhantomData<fn() -> T>);

        impl<T> $name<T> {
            #[must_use]
            pub const fn new() -> Self {
                Self(::core::marker::PhantomData)
            }
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T> ::core::fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}<{}>", stringify!($name), core::any::type_name::<T>())
            }
        }
    };
}

pub(crate) use marker_formatter;

marker_formatter! {
    /// `Vec<T>` as a JSON array. Merging appends to the existing elements.
    ListFormatter
}

impl<T: Send + 'static> JsonFormatter<Vec<T>> for ListFormatter<T> {
    fn serialize(&self, writer: &mut JsonWriter, value: &Vec<T>, options: &JsonOptions) -> Result<(), Error> {
        serialize_elements(writer, value, options)
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<Vec<T>, Error> {
        if let Some(empty) = options.null_or_default(reader)? {
            return Ok(empty);
        }
        deserialize_scratch(reader, options, LIST_SCRATCH_CAPACITY)
    }

    fn deserialize_to(
        &self,
        reader: &mut JsonReader<'_>,
        target: &mut Vec<T>,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        if options.skip_null::<Vec<T>>(reader)? {
            return Ok(());
        }
        deserialize_elements(reader, options, |value| {
            target.try_reserve(1)?;
            target.push(value);
            Ok(())
        })
    }
}

marker_formatter! {
    /// `Box<[T]>` as a JSON array.
    ///
    /// Merging overwrites the target index by index. A longer input replaces
    /// the target; a shorter one leaves the tail in place.
    ArrayFormatter
}

impl<T: Send + 'static> JsonFormatter<Box<[T]>> for ArrayFormatter<T> {
    fn serialize(&self, writer: &mut JsonWriter, value: &Box<[T]>, options: &JsonOptions) -> Result<(), Error> {
        serialize_elements(writer, value.iter(), options)
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<Box<[T]>, Error> {
        if let Some(empty) = options.null_or_default::<Box<[T]>>(reader)? {
            return Ok(empty);
        }
        deserialize_scratch(reader, options, ARRAY_SCRATCH_CAPACITY).map(Vec::into_boxed_slice)
    }

    fn deserialize_to(
        &self,
        reader: &mut JsonReader<'_>,
        target: &mut Box<[T]>,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        if options.skip_null::<Box<[T]>>(reader)? {
            return Ok(());
        }
        let incoming = deserialize_scratch::<T>(reader, options, ARRAY_SCRATCH_CAPACITY)?;
        if incoming.len() >= target.len() {
            *target = incoming.into_boxed_slice();
        } else {
            for (slot, value) in target.iter_mut().zip(incoming) {
                *slot = value;
            }
        }
        Ok(())
    }
}

/// A window onto a shared array.
///
/// A segment without an array is written as `null`; `null` reads back as
/// such a segment. Decoded segments always cover their whole array.
pub struct ArraySegment<T> {
    array: Option<Arc<[T]>>,
    offset: usize,
    count: usize,
}

impl<T> ArraySegment<T> {
    /// The segment `array[offset..offset + count]`, `None` if out of bounds.
    #[must_use]
    pub fn new(array: Arc<[T]>, offset: usize, count: usize) -> Option<Self> {
        let end = offset.checked_add(count)?;
        (end <= array.len()).then_some(Self {
            array: Some(array),
            offset,
            count,
        })
    }

    /// A segment without an array.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            array: None,
            offset: 0,
            count: 0,
        }
    }

    #[must_use]
    pub fn array(&self) -> Option<&Arc<[T]>> {
        self.array.as_ref()
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The viewed elements, `None` for an absent segment.
    #[must_use]
    pub fn as_slice(&self) -> Option<&[T]> {
        self.array
            .as_deref()
            .map(|array| &array[self.offset..self.offset + self.count])
    }
}

impl<T> From<Arc<[T]>> for ArraySegment<T> {
    fn from(array: Arc<[T]>) -> Self {
        let count = array.len();
        Self {
            array: Some(array),
            offset: 0,
            count,
        }
    }
}

impl<T> From<Vec<T>> for ArraySegment<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from(Arc::<[T]>::from(values))
    }
}

impl<T> Default for ArraySegment<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T> Clone for ArraySegment<T> {
    fn clone(&self) -> Self {
        Self {
            array: self.array.clone(),
            offset: self.offset,
            count: self.count,
        }
    }
}

impl<T: PartialEq> PartialEq for ArraySegment<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for ArraySegment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArraySegment").field(&self.as_slice()).finish()
    }
}

marker_formatter! {
    /// [`ArraySegment<T>`] as a JSON array of the viewed elements.
    ArraySegmentFormatter
}

impl<T: Send + 'static> JsonFormatter<ArraySegment<T>> for ArraySegmentFormatter<T> {
    fn serialize(
        &self,
        writer: &mut JsonWriter,
        value: &ArraySegment<T>,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        match value.as_slice() {
            Some(elements) => serialize_elements(writer, elements, options),
            None => {
                writer.write_null();
                Ok(())
            }
        }
    }

    fn deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        options: &JsonOptions,
    ) -> Result<ArraySegment<T>, Error> {
        if reader.read_is_null() {
            return Ok(ArraySegment::absent());
        }
        let elements = deserialize_scratch::<T>(reader, options, LIST_SCRATCH_CAPACITY)?;
        Ok(ArraySegment::from(elements))
    }
}
