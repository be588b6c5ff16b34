#![no_main]
//! Differential decoding against `serde_json`.
//!
//! Whatever `serde_json` accepts as one of the listed shapes must decode to
//! the same value here, and whatever decodes here must re-encode to bytes that
//! decode to that value again.

use std::sync::LazyLock;

use jsonwire::{FormatterRegistry, JsonOptions, formatters::ListFormatter};
use libfuzzer_sys::fuzz_target;

static OPTIONS: LazyLock<JsonOptions> = LazyLock::new(|| {
    let registry = FormatterRegistry::with_builtins();
    registry.register_with::<Vec<Vec<String>>, _, _>(ListFormatter::<Vec<String>>::new);
    JsonOptions::new(registry.into_shared())
});

fn check<T: PartialEq + std::fmt::Debug + 'static>(data: &[u8], theirs: Option<T>) {
    let ours = jsonwire::from_slice::<T>(data, &OPTIONS);
    if let Some(theirs) = theirs {
        assert_eq!(ours.as_ref().ok(), Some(&theirs), "input: {:?}", String::from_utf8_lossy(data));
    }
    if let Ok(value) = ours {
        let bytes = jsonwire::to_vec(&value, &OPTIONS).unwrap();
        assert_eq!(jsonwire::from_slice::<T>(&bytes, &OPTIONS).unwrap(), value);
    }
}

fuzz_target!(|data: &[u8]| {
    check::<Vec<i64>>(data, serde_json::from_slice(data).ok());
    check::<Vec<u32>>(data, serde_json::from_slice(data).ok());
    check::<Vec<bool>>(data, serde_json::from_slice(data).ok());
    check::<Vec<String>>(data, serde_json::from_slice(data).ok());
    check::<Vec<Vec<String>>>(data, serde_json::from_slice(data).ok());
    check::<Option<Vec<i64>>>(data, serde_json::from_slice(data).ok());
});
