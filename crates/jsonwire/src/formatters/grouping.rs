use std::{fmt, marker::PhantomData};

use super::collection::serialize_elements;
use crate::{JsonOptions, JsonReader, JsonWriter, error::Error, formatter::JsonFormatter};

/// A key together with the elements grouped under it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grouping<K, V> {
    pub key: K,
    pub elements: Vec<V>,
}

impl<K, V> Grouping<K, V> {
    #[must_use]
    pub fn new(key: K, elements: Vec<V>) -> Self {
        Self { key, elements }
    }
}

/// Writes a [`Grouping`] as `{"Key":..,"Elements":[..]}`.
///
/// Write-only: deserializing fails with
/// [`ConfigurationError::UnsupportedOperation`](crate::ConfigurationError::UnsupportedOperation).
pub struct GroupingFormatter<K, V>(PhantomData<fn() -> (K, V)>);

impl<K, V> GroupingFormatter<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K, V> Default for GroupingFormatter<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for GroupingFormatter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GroupingFormatter")
    }
}

impl<K: 'static, V: 'static> JsonFormatter<Grouping<K, V>> for GroupingFormatter<K, V> {
    fn serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Grouping<K, V>,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        writer.write_raw(b"{\"Key\":");
        options.serializer::<K>()?.serialize(writer, &value.key, options)?;
        writer.write_raw(b",\"Elements\":");
        serialize_elements(writer, &value.elements, options)?;
        writer.write_end_object();
        Ok(())
    }

    fn deserialize(&self, _reader: &mut JsonReader<'_>, _options: &JsonOptions) -> Result<Grouping<K, V>, Error> {
        Err(Error::unsupported("GroupingFormatter", "deserialize"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FormatterRegistry, error::ErrorCategory};

    fn options() -> JsonOptions {
        let registry = FormatterRegistry::with_builtins();
        registry.register::<Grouping<String, u8>, _>(GroupingFormatter::<String, u8>::new());
        JsonOptions::new(registry.into_shared())
    }

    #[test]
    fn writes_key_and_elements() {
        let group = Grouping::new("odd".to_owned(), vec![1u8, 3, 5]);
        assert_eq!(
            crate::to_string(&group, &options()).unwrap(),
            r#"{"Key":"odd","Elements":[1,3,5]}"#
        );
    }

    #[test]
    fn reading_is_unsupported() {
        let err = crate::from_str::<Grouping<String, u8>>(r#"{"Key":"a","Elements":[]}"#, &options())
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
