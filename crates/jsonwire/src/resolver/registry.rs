use std::{
    any::{TypeId, type_name},
    fmt,
    sync::{Arc, OnceLock},
};

use dashmap::DashMap;

use super::{ErasedFastPath, ErasedFormatter, JsonResolver, TypeKey};
use crate::formatter::{DeserializeFn, FastPath, JsonFormatter, SerializeFn, StaticFormatter};

type Factory = Box<dyn Fn() -> ErasedFormatter + Send + Sync>;

struct Slot {
    name: &'static str,
    formatter: OnceLock<ErasedFormatter>,
    factory: Option<Factory>,
}

impl Slot {
    fn get(&self) -> Option<&ErasedFormatter> {
        if let Some(formatter) = self.formatter.get() {
            return Some(formatter);
        }
        let factory = self.factory.as_ref()?;
        Some(self.formatter.get_or_init(|| {
            tracing::debug!(r#type = self.name, "constructing formatter");
            factory()
        }))
    }
}

/// Resolver backed by explicit registrations.
///
/// Registrations may happen at any time, also concurrently with lookups. A
/// later registration for the same type replaces the earlier one together
/// with any fast path it published. Formatters
/// registered through a factory are constructed on first lookup, at most
/// once, outside the map's locks.
///
/// ```rust
/// use jsonwire::{FormatterRegistry, JsonOptions, formatters::ListFormatter};
///
/// let registry = FormatterRegistry::with_builtins();
/// registry.register_with::<Vec<Vec<u8>>, _, _>(ListFormatter::<Vec<u8>>::new);
/// let options = JsonOptions::new(registry.into_shared());
///
/// let bytes = jsonwire::to_vec(&vec![vec![1u8], vec![]], &options).unwrap();
/// assert_eq!(bytes, b"[[1],[]]");
/// ```
pub struct FormatterRegistry {
    formatters: DashMap<TypeId, Arc<Slot>, ahash::RandomState>,
    fast_paths: DashMap<TypeId, ErasedFastPath, ahash::RandomState>,
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("formatters", &self.formatters.len())
            .field("fast_paths", &self.fast_paths.len())
            .finish()
    }
}

impl FormatterRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            formatters: DashMap::with_hasher(ahash::RandomState::new()),
            fast_paths: DashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    /// A registry holding the built-in formatters, ready for more
    /// registrations.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::formatters::register_builtins(&registry);
        registry
    }

    /// The process-wide built-in registry used by default options.
    pub fn builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<FormatterRegistry>> = OnceLock::new();
        Arc::clone(BUILTIN.get_or_init(|| Arc::new(Self::with_builtins())))
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn insert_slot<T: 'static>(&self, formatter: OnceLock<ErasedFormatter>, factory: Option<Factory>) {
        let slot = Slot {
            name: type_name::<T>(),
            formatter,
            factory,
        };
        // A fast path left over from an earlier registration would shadow the
        // new formatter.
        self.fast_paths.remove(&TypeId::of::<T>());
        self.formatters.insert(TypeId::of::<T>(), Arc::new(slot));
    }

    pub fn register<T, F>(&self, formatter: F) -> &Self
    where
        T: 'static,
        F: JsonFormatter<T> + 'static,
    {
        let formatter: Arc<dyn JsonFormatter<T>> = Arc::new(formatter);
        self.insert_slot::<T>(OnceLock::from(ErasedFormatter::new(formatter)), None);
        self
    }

    /// Registers a formatter constructed on first lookup.
    pub fn register_with<T, F, M>(&self, factory: M) -> &Self
    where
        T: 'static,
        F: JsonFormatter<T> + 'static,
        M: Fn() -> F + Send + Sync + 'static,
    {
        let factory: Factory = Box::new(move || {
            let formatter: Arc<dyn JsonFormatter<T>> = Arc::new(factory());
            ErasedFormatter::new(formatter)
        });
        self.insert_slot::<T>(OnceLock::new(), Some(factory));
        self
    }

    /// Publishes a fast path for `T` without a formatter.
    ///
    /// The caller is responsible for keeping it equivalent to whatever
    /// formatter `T` resolves to.
    pub fn register_fast_path<T: 'static>(&self, path: FastPath<T>) -> &Self {
        self.fast_paths
            .insert(TypeId::of::<T>(), ErasedFastPath::new(path));
        self
    }

    /// Registers `serialize`/`deserialize` as both the formatter and the fast
    /// path of `T`.
    pub fn register_static<T: 'static>(
        &self,
        serialize: SerializeFn<T>,
        deserialize: DeserializeFn<T>,
    ) -> &Self {
        self.register::<T, _>(StaticFormatter::new(serialize, deserialize));
        self.register_fast_path(FastPath::new(serialize, deserialize))
    }

    /// Whether a formatter is registered for `T`.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.formatters.contains_key(&TypeId::of::<T>())
    }
}

impl JsonResolver for FormatterRegistry {
    fn formatter_for(&self, key: TypeKey) -> Option<ErasedFormatter> {
        // Clone the slot out so the shard lock is released before a factory runs.
        let slot = self.formatters.get(&key.id()).map(|slot| Arc::clone(&slot));
        let Some(slot) = slot else {
            tracing::debug!(r#type = key.name(), "no formatter registered");
            return None;
        };
        slot.get().cloned()
    }

    fn fast_path_for(&self, key: TypeKey) -> Option<ErasedFastPath> {
        self.fast_paths.get(&key.id()).map(|path| path.clone())
    }
}
