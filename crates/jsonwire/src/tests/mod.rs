mod merge;
mod pool_hygiene;
mod round_trip;
mod wire_format;

use std::sync::Arc;

use crate::{
    FormatterRegistry, JsonOptions, ScratchPool,
    formatters::{DictionaryFormatter, ListFormatter, NullableFormatter, TupleFormatter},
};

pub(crate) type Record = (i64, String, Option<f64>);
pub(crate) type Table = std::collections::BTreeMap<String, Vec<i32>>;

/// Built-ins plus the composite types the cross-module tests use, with a
/// private pool so pool counters are not shared between tests.
pub(crate) fn test_options() -> JsonOptions {
    let registry = FormatterRegistry::with_builtins();
    registry
        .register_with::<Record, _, _>(TupleFormatter::<Record>::new)
        .register_with::<Vec<Record>, _, _>(ListFormatter::<Record>::new)
        .register_with::<Vec<Vec<String>>, _, _>(ListFormatter::<Vec<String>>::new)
        .register_with::<Vec<Option<i32>>, _, _>(ListFormatter::<Option<i32>>::new)
        .register_with::<Option<Vec<i32>>, _, _>(NullableFormatter::<Vec<i32>>::new)
        .register_with::<Table, _, _>(DictionaryFormatter::<Table, Vec<i32>>::new);
    JsonOptions::new(registry.into_shared()).with_pool(Arc::new(ScratchPool::default()))
}

pub(crate) fn quickcheck_tests() -> u64 {
    if is_ci::cached() { 10_000 } else { 1_000 }
}
