use std::{any::type_name, fmt, sync::Arc};

use crate::{
    FormatterRegistry, JsonReader,
    error::{Error, FormatError},
    formatter::{DeserializeDispatch, JsonFormatter, SerializeDispatch},
    pool::ScratchPool,
    reader::JsonToken,
    resolver::{JsonResolver, ResolverExt},
};

/// What a formatter for a non-optional type does when it reads `null`.
///
/// Applies to strings, collections, tuples and other types with an empty
/// value. Numbers, booleans, chars and GUIDs always reject `null`; use
/// `Option<T>` to accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullHandling {
    /// `null` decodes to `T::default()`. When merging, `null` leaves the
    /// target untouched.
    #[default]
    AsDefault,
    /// `null` is a [`FormatError::UnexpectedNull`].
    Reject,
}

/// Settings shared by every formatter taking part in one call.
///
/// Cheap to clone; typically built once and reused.
///
/// # Examples
///
/// ```rust
/// use jsonwire::{JsonOptions, NullHandling};
///
/// let options = JsonOptions::default().with_null_handling(NullHandling::Reject);
/// assert!(jsonwire::from_slice::<Vec<u8>>(b"null", &options).is_err());
/// ```
///
/// # Default
///
/// The built-in registry, the process-wide scratch pool and
/// [`NullHandling::AsDefault`].
#[derive(Clone)]
pub struct JsonOptions {
    /// Where formatters are looked up.
    pub resolver: Arc<dyn JsonResolver>,

    /// Scratch buffers for collection decoding.
    ///
    /// # Default
    ///
    /// [`ScratchPool::shared`]
    pub pool: Arc<ScratchPool>,

    /// Treatment of `null` for non-optional types.
    ///
    /// # Default
    ///
    /// [`NullHandling::AsDefault`]
    pub null_handling: NullHandling,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self::new(FormatterRegistry::builtin())
    }
}

impl fmt::Debug for JsonOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonOptions")
            .field("pool", &self.pool.stats())
            .field("null_handling", &self.null_handling)
            .finish_non_exhaustive()
    }
}

impl JsonOptions {
    #[must_use]
    pub fn new(resolver: Arc<dyn JsonResolver>) -> Self {
        Self {
            resolver,
            pool: ScratchPool::shared(),
            null_handling: NullHandling::default(),
        }
    }

    #[must_use]
    pub fn with_pool(mut self, pool: Arc<ScratchPool>) -> Self {
        self.pool = pool;
        self
    }

    #[must_use]
    pub fn with_null_handling(mut self, null_handling: NullHandling) -> Self {
        self.null_handling = null_handling;
        self
    }

    /// # Errors
    ///
    /// [`ConfigurationError::FormatterNotRegistered`](crate::ConfigurationError::FormatterNotRegistered).
    pub fn formatter<T: 'static>(&self) -> Result<Arc<dyn JsonFormatter<T>>, Error> {
        self.resolver.get_formatter_with_verify::<T>()
    }

    /// # Errors
    ///
    /// [`ConfigurationError::FormatterNotRegistered`](crate::ConfigurationError::FormatterNotRegistered).
    pub fn serializer<T: 'static>(&self) -> Result<SerializeDispatch<T>, Error> {
        self.resolver.serializer::<T>()
    }

    /// # Errors
    ///
    /// [`ConfigurationError::FormatterNotRegistered`](crate::ConfigurationError::FormatterNotRegistered).
    pub fn deserializer<T: 'static>(&self) -> Result<DeserializeDispatch<T>, Error> {
        self.resolver.deserializer::<T>()
    }

    /// Consumes a `null` if one is next, applying [`NullHandling`] for `T`.
    ///
    /// Returns whether a `null` was consumed. The cursor does not move on
    /// rejection.
    ///
    /// # Errors
    ///
    /// [`FormatError::UnexpectedNull`] under [`NullHandling::Reject`].
    pub fn skip_null<T: ?Sized>(&self, reader: &mut JsonReader<'_>) -> Result<bool, Error> {
        if reader.peek_token() != JsonToken::Null {
            return Ok(false);
        }
        if self.null_handling == NullHandling::Reject {
            return Err(reader.format_error(FormatError::UnexpectedNull(type_name::<T>())));
        }
        reader.read_null()?;
        Ok(true)
    }

    /// `Some(T::default())` if a `null` was consumed, see
    /// [`skip_null`](Self::skip_null).
    ///
    /// # Errors
    ///
    /// As [`skip_null`](Self::skip_null).
    pub fn null_or_default<T: Default>(&self, reader: &mut JsonReader<'_>) -> Result<Option<T>, Error> {
        Ok(self.skip_null::<T>(reader)?.then(T::default))
    }
}
