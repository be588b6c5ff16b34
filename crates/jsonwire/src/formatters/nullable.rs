use super::collection::marker_formatter;
use crate::{JsonOptions, JsonReader, JsonWriter, error::Error, formatter::JsonFormatter};

marker_formatter! {
    /// `Option<T>`: `null` for `None`, otherwise whatever `T` resolves to.
    ///
    /// Merging `null` clears the target. Merging a value into `Some` merges
    /// into the contained value; into `None` it decodes a fresh one.
    NullableFormatter
}

impl<T: 'static> JsonFormatter<Option<T>> for NullableFormatter<T> {
    fn serialize(&self, writer: &mut JsonWriter, value: &Option<T>, options: &JsonOptions) -> Result<(), Error> {
        match value {
            Some(value) => options.serializer::<T>()?.serialize(writer, value, options),
            None => {
                writer.write_null();
                Ok(())
            }
        }
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<Option<T>, Error> {
        if reader.read_is_null() {
            return Ok(None);
        }
        options.deserializer::<T>()?.deserialize(reader, options).map(Some)
    }

    fn deserialize_to(
        &self,
        reader: &mut JsonReader<'_>,
        target: &mut Option<T>,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        if reader.read_is_null() {
            *target = None;
            return Ok(());
        }
        let inner = options.deserializer::<T>()?;
        match target {
            Some(value) => inner.deserialize_to(reader, value, options),
            None => {
                *target = Some(inner.deserialize(reader, options)?);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{FormatterRegistry, NullHandling};

    #[rstest]
    #[case(None, "null")]
    #[case(Some(0), "0")]
    #[case(Some(-12), "-12")]
    fn round_trip(#[case] value: Option<i64>, #[case] expected: &str) {
        let options = JsonOptions::default();
        let text = crate::to_string(&value, &options).unwrap();
        assert_eq!(text, expected);
        assert_eq!(crate::from_str::<Option<i64>>(&text, &options).unwrap(), value);
    }

    #[test]
    fn null_is_accepted_even_when_rejecting() {
        let options = JsonOptions::default().with_null_handling(NullHandling::Reject);
        assert_eq!(crate::from_str::<Option<String>>(" null ", &options).unwrap(), None);
    }

    #[test]
    fn merge_into_some_merges_the_content() {
        let registry = FormatterRegistry::with_builtins();
        registry.register_with::<Option<Vec<u8>>, _, _>(NullableFormatter::<Vec<u8>>::new);
        let options = JsonOptions::new(registry.into_shared());
        let mut target = Some(vec![1u8]);
        crate::from_slice_to(b"[2]", &mut target, &options).unwrap();
        assert_eq!(target, Some(vec![1, 2]));

        let mut empty: Option<Vec<u8>> = None;
        crate::from_slice_to(b"[2]", &mut empty, &options).unwrap();
        assert_eq!(empty, Some(vec![2]));

        crate::from_slice_to(b"null", &mut target, &options).unwrap();
        assert_eq!(target, None);
    }
}
