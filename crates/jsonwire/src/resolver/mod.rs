//! Formatter lookup.
//!
//! [`JsonResolver`] is object-safe: it answers lookups by [`TypeKey`] with
//! type-erased handles. [`ResolverExt`] layers the typed API on top of any
//! resolver, including `dyn JsonResolver`.

mod composite;
mod registry;

use std::{
    any::{Any, TypeId, type_name},
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

pub use composite::CompositeResolver;
pub use registry::FormatterRegistry;

use crate::{
    error::Error,
    formatter::{DeserializeDispatch, DeserializeFn, FastPath, JsonFormatter, SerializeDispatch, SerializeFn},
};

/// Identity of a Rust type, with its name kept for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// An `Arc<dyn JsonFormatter<T>>` with `T` erased.
#[derive(Clone)]
pub struct ErasedFormatter(Arc<dyn Any + Send + Sync>);

impl ErasedFormatter {
    pub fn new<T: 'static>(formatter: Arc<dyn JsonFormatter<T>>) -> Self {
        Self(Arc::new(formatter))
    }

    /// Recovers the typed formatter, `None` if it was created for another type.
    #[must_use]
    pub fn downcast<T: 'static>(&self) -> Option<Arc<dyn JsonFormatter<T>>> {
        self.0.downcast_ref::<Arc<dyn JsonFormatter<T>>>().cloned()
    }
}

impl fmt::Debug for ErasedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErasedFormatter")
    }
}

/// A [`FastPath<T>`] with `T` erased.
#[derive(Clone)]
pub struct ErasedFastPath(Arc<dyn Any + Send + Sync>);

impl ErasedFastPath {
    pub fn new<T: 'static>(path: FastPath<T>) -> Self {
        Self(Arc::new(path))
    }

    #[must_use]
    pub fn downcast<T: 'static>(&self) -> Option<FastPath<T>> {
        self.0.downcast_ref::<FastPath<T>>().copied()
    }
}

impl fmt::Debug for ErasedFastPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErasedFastPath")
    }
}

/// Source of formatters.
///
/// A resolver must return at most one formatter per type, and the same one on
/// every call.
pub trait JsonResolver: Send + Sync {
    fn formatter_for(&self, key: TypeKey) -> Option<ErasedFormatter>;

    /// Function-pointer codec for `key`, if the resolver knows one.
    fn fast_path_for(&self, key: TypeKey) -> Option<ErasedFastPath> {
        let _ = key;
        None
    }
}

impl<R: JsonResolver + ?Sized> JsonResolver for Arc<R> {
    fn formatter_for(&self, key: TypeKey) -> Option<ErasedFormatter> {
        (**self).formatter_for(key)
    }

    fn fast_path_for(&self, key: TypeKey) -> Option<ErasedFastPath> {
        (**self).fast_path_for(key)
    }
}

/// Typed lookups, available on every resolver.
pub trait ResolverExt: JsonResolver {
    fn get_formatter<T: 'static>(&self) -> Option<Arc<dyn JsonFormatter<T>>> {
        self.formatter_for(TypeKey::of::<T>())?.downcast::<T>()
    }

    /// # Errors
    ///
    /// [`ConfigurationError::FormatterNotRegistered`](crate::ConfigurationError::FormatterNotRegistered)
    /// if the resolver has no formatter for `T`.
    fn get_formatter_with_verify<T: 'static>(&self) -> Result<Arc<dyn JsonFormatter<T>>, Error> {
        self.get_formatter::<T>().ok_or_else(Error::not_registered::<T>)
    }

    fn get_serialize_static<T: 'static>(&self) -> Option<SerializeFn<T>> {
        self.fast_path_for(TypeKey::of::<T>())?.downcast::<T>()?.serialize
    }

    fn get_deserialize_static<T: 'static>(&self) -> Option<DeserializeFn<T>> {
        self.fast_path_for(TypeKey::of::<T>())?.downcast::<T>()?.deserialize
    }

    /// Fast path if one exists, otherwise the formatter.
    ///
    /// # Errors
    ///
    /// As [`get_formatter_with_verify`](Self::get_formatter_with_verify).
    fn serializer<T: 'static>(&self) -> Result<SerializeDispatch<T>, Error> {
        if let Some(serialize) = self.get_serialize_static::<T>() {
            return Ok(SerializeDispatch::FastPath(serialize));
        }
        self.get_formatter_with_verify::<T>().map(SerializeDispatch::Formatter)
    }

    /// Fast path if one exists, otherwise the formatter.
    ///
    /// # Errors
    ///
    /// As [`get_formatter_with_verify`](Self::get_formatter_with_verify).
    fn deserializer<T: 'static>(&self) -> Result<DeserializeDispatch<T>, Error> {
        if let Some(deserialize) = self.get_deserialize_static::<T>() {
            return Ok(DeserializeDispatch::FastPath(deserialize));
        }
        self.get_formatter_with_verify::<T>().map(DeserializeDispatch::Formatter)
    }
}

impl<R: JsonResolver + ?Sized> ResolverExt for R {}
