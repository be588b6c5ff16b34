use std::{fmt, sync::Arc};

use super::{ErasedFastPath, ErasedFormatter, JsonResolver, TypeKey};

/// Ordered chain of resolvers. The first resolver that knows a type wins.
///
/// A fast path is only taken from the resolver that also supplied the
/// formatter (or from an earlier one), so a later resolver cannot attach a
/// fast path to a formatter it does not own.
#[derive(Clone, Default)]
pub struct CompositeResolver {
    resolvers: Vec<Arc<dyn JsonResolver>>,
}

impl fmt::Debug for CompositeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeResolver")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

impl CompositeResolver {
    #[must_use]
    pub fn new(resolvers: Vec<Arc<dyn JsonResolver>>) -> Self {
        Self { resolvers }
    }

    /// Appends `resolver` with the lowest priority so far.
    #[must_use]
    pub fn then(mut self, resolver: Arc<dyn JsonResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }
}

impl JsonResolver for CompositeResolver {
    fn formatter_for(&self, key: TypeKey) -> Option<ErasedFormatter> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.formatter_for(key))
    }

    fn fast_path_for(&self, key: TypeKey) -> Option<ErasedFastPath> {
        for resolver in &self.resolvers {
            if let Some(path) = resolver.fast_path_for(key) {
                return Some(path);
            }
            if resolver.formatter_for(key).is_some() {
                return None;
            }
        }
        None
    }
}
