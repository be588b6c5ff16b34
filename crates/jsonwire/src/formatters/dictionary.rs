use std::{fmt, iter, marker::PhantomData};

use crate::{JsonOptions, JsonReader, JsonWriter, error::Error, formatter::JsonFormatter};

/// A string-keyed map `M` with values `V`, as a JSON object.
///
/// Works for `BTreeMap<String, V>` and `HashMap<String, V, S>`. Duplicate
/// keys keep the last value. Merging inserts into the target, overwriting
/// existing keys.
pub struct DictionaryFormatter<M, V>(PhantomData<fn() -> (M, V)>);

impl<M, V> DictionaryFormatter<M, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M, V> Default for DictionaryFormatter<M, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, V> fmt::Debug for DictionaryFormatter<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DictionaryFormatter<{}>", core::any::type_name::<M>())
    }
}

impl<M, V> DictionaryFormatter<M, V>
where
    M: Extend<(String, V)>,
    V: 'static,
{
    fn read_entries(reader: &mut JsonReader<'_>, target: &mut M, options: &JsonOptions) -> Result<(), Error> {
        let value_codec = options.deserializer::<V>()?;
        reader.read_is_begin_object_with_verify()?;
        let mut count = 0;
        while !reader.read_is_end_object_with_skip_value_separator(&mut count)? {
            let key = reader.read_property_name()?.into_owned();
            let value = value_codec.deserialize(reader, options)?;
            target.extend(iter::once((key, value)));
        }
        Ok(())
    }
}

impl<M, V> JsonFormatter<M> for DictionaryFormatter<M, V>
where
    M: Default + Extend<(String, V)> + 'static,
    for<'a> &'a M: IntoIterator<Item = (&'a String, &'a V)>,
    V: 'static,
{
    fn serialize(&self, writer: &mut JsonWriter, value: &M, options: &JsonOptions) -> Result<(), Error> {
        let value_codec = options.serializer::<V>()?;
        writer.write_begin_object();
        for (i, (key, value)) in value.into_iter().enumerate() {
            if i != 0 {
                writer.write_value_separator();
            }
            writer.write_property_name(key);
            value_codec.serialize(writer, value, options)?;
        }
        writer.write_end_object();
        Ok(())
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<M, Error> {
        if let Some(empty) = options.null_or_default(reader)? {
            return Ok(empty);
        }
        let mut map = M::default();
        Self::read_entries(reader, &mut map, options)?;
        Ok(map)
    }

    fn deserialize_to(&self, reader: &mut JsonReader<'_>, target: &mut M, options: &JsonOptions) -> Result<(), Error> {
        if options.skip_null::<M>(reader)? {
            return Ok(());
        }
        Self::read_entries(reader, target, options)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use insta::assert_snapshot;

    use super::*;
    use crate::{FormatterRegistry, error::StructuralError};

    type Scores = BTreeMap<String, Vec<i32>>;
    type Lookup = HashMap<String, String, ahash::RandomState>;

    fn options() -> JsonOptions {
        let registry = FormatterRegistry::with_builtins();
        registry.register::<Scores, _>(DictionaryFormatter::<Scores, Vec<i32>>::new());
        registry.register::<Lookup, _>(DictionaryFormatter::<Lookup, String>::new());
        JsonOptions::new(registry.into_shared())
    }

    #[test]
    fn sorted_map_wire_form() {
        let options = options();
        let mut scores = Scores::new();
        scores.insert("b\"".to_owned(), vec![2, 3]);
        scores.insert("a".to_owned(), vec![]);
        let text = crate::to_string(&scores, &options).unwrap();
        assert_snapshot!(text, @r#"{"a":[],"b\"":[2,3]}"#);
        assert_eq!(crate::from_str::<Scores>(&text, &options).unwrap(), scores);
    }

    #[test]
    fn hash_map_round_trip_and_merge() {
        let options = options();
        let mut lookup: Lookup = [("k".to_owned(), "v".to_owned())].into_iter().collect();
        crate::from_slice_to(br#"{"k":"w","x":"y"}"#, &mut lookup, &options).unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup["k"], "w");
        assert_eq!(lookup["x"], "y");
    }

    #[test]
    fn missing_colon_is_structural() {
        let err = crate::from_str::<Scores>(r#"{"a" []}"#, &options()).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural {
                kind: StructuralError::Expected { expected: ':', .. },
                ..
            }
        ));
    }
}
