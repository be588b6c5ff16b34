#![no_main]
//! Structured values survive a write/read cycle, and merging a list into an
//! existing list appends.

use std::{collections::BTreeMap, sync::LazyLock};

use arbitrary::Arbitrary;
use jsonwire::{
    FormatterRegistry, JsonOptions,
    formatters::{DictionaryFormatter, ListFormatter, TupleFormatter},
};
use libfuzzer_sys::fuzz_target;

type Row = (i64, String, Option<u32>, bool);
type Index = BTreeMap<String, Vec<Row>>;

static OPTIONS: LazyLock<JsonOptions> = LazyLock::new(|| {
    let registry = FormatterRegistry::with_builtins();
    registry
        .register_with::<Row, _, _>(TupleFormatter::<Row>::new)
        .register_with::<Vec<Row>, _, _>(ListFormatter::<Row>::new)
        .register_with::<Index, _, _>(DictionaryFormatter::<Index, Vec<Row>>::new);
    JsonOptions::new(registry.into_shared())
});

#[derive(Debug, Arbitrary)]
struct Input {
    index: Index,
    head: Vec<Row>,
    tail: Vec<Row>,
    floats: Vec<f64>,
}

fuzz_target!(|input: Input| {
    let bytes = jsonwire::to_vec(&input.index, &OPTIONS).unwrap();
    serde_json::from_slice::<serde_json::Value>(&bytes).unwrap();
    assert_eq!(jsonwire::from_slice::<Index>(&bytes, &OPTIONS).unwrap(), input.index);

    let mut merged = input.head.clone();
    let tail = jsonwire::to_vec(&input.tail, &OPTIONS).unwrap();
    jsonwire::from_slice_to(&tail, &mut merged, &OPTIONS).unwrap();
    assert_eq!(merged.len(), input.head.len() + input.tail.len());
    assert_eq!(merged[input.head.len()..], input.tail[..]);

    let bytes = jsonwire::to_vec(&input.floats, &OPTIONS).unwrap();
    let floats: Vec<f64> = jsonwire::from_slice(&bytes, &OPTIONS).unwrap();
    assert!(
        floats
            .iter()
            .zip(&input.floats)
            .all(|(a, b)| a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()))
    );
});
