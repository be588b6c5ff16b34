//! Tuples as `{"Item1":..,"Item2":..}`.
//!
//! Keys are written from precomputed byte strings. Reading accepts the keys in
//! any order, skips unknown keys and leaves missing items at their default.

use std::{fmt, marker::PhantomData};

use crate::{JsonOptions, JsonReader, JsonWriter, error::Error, formatter::JsonFormatter};

/// `"ItemN":` prefixed by the separator for every key but the first.
const KEYS: [&[u8]; 7] = [
    b"\"Item1\":",
    b",\"Item2\":",
    b",\"Item3\":",
    b",\"Item4\":",
    b",\"Item5\":",
    b",\"Item6\":",
    b",\"Item7\":",
];

/// Formatter for tuples of two to seven items.
pub struct TupleFormatter<T>(PhantomData<fn() -> T>);

impl<T> TupleFormatter<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TupleFormatter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TupleFormatter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TupleFormatter<{}>", core::any::type_name::<T>())
    }
}

macro_rules! tuple_formatter {
    ($($idx:tt => $item:ident : $key:literal),+) => {
        impl<$($item: Default + 'static),+> JsonFormatter<($($item,)+)> for TupleFormatter<($($item,)+)> {
            fn serialize(
                &self,
                writer: &mut JsonWriter,
                value: &($($item,)+),
                options: &JsonOptions,
            ) -> Result<(), Error> {
                writer.write_begin_object();
                $(
                    writer.write_raw(KEYS[$idx]);
                    options.serializer::<$item>()?.serialize(writer, &value.$idx, options)?;
                )+
                writer.write_end_object();
                Ok(())
            }

            fn deserialize(
                &self,
                reader: &mut JsonReader<'_>,
                options: &JsonOptions,
            ) -> Result<($($item,)+), Error> {
                if let Some(empty) = options.null_or_default(reader)? {
                    return Ok(empty);
                }
                reader.read_is_begin_object_with_verify()?;
                let mut items: ($(Option<$item>,)+) = Default::default();
                let mut count = 0;
                while !reader.read_is_end_object_with_skip_value_separator(&mut count)? {
                    match reader.read_property_name_segment_raw()? {
                        $(
                            $key => {
                                items.$idx = Some(options.deserializer::<$item>()?.deserialize(reader, options)?);
                            }
                        )+
                        _ => reader.read_next_block()?,
                    }
                }
                Ok(($(items.$idx.unwrap_or_default(),)+))
            }
        }
    };
}

tuple_formatter!(0 => T1: b"Item1", 1 => T2: b"Item2");
tuple_formatter!(0 => T1: b"Item1", 1 => T2: b"Item2", 2 => T3: b"Item3");
tuple_formatter!(0 => T1: b"Item1", 1 => T2: b"Item2", 2 => T3: b"Item3", 3 => T4: b"Item4");
tuple_formatter!(
    0 => T1: b"Item1", 1 => T2: b"Item2", 2 => T3: b"Item3", 3 => T4: b"Item4",
    4 => T5: b"Item5"
);
tuple_formatter!(
    0 => T1: b"Item1", 1 => T2: b"Item2", 2 => T3: b"Item3", 3 => T4: b"Item4",
    4 => T5: b"Item5", 5 => T6: b"Item6"
);
tuple_formatter!(
    0 => T1: b"Item1", 1 => T2: b"Item2", 2 => T3: b"Item3", 3 => T4: b"Item4",
    4 => T5: b"Item5", 5 => T6: b"Item6", 6 => T7: b"Item7"
);

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use rstest::rstest;

    use super::*;
    use crate::{FormatterRegistry, error::ErrorCategory};

    type Pair = (i32, String);
    type Wide = (u8, u16, u32, u64, i8, bool, String);

    fn options() -> JsonOptions {
        let registry = FormatterRegistry::with_builtins();
        registry.register::<Pair, _>(TupleFormatter::<Pair>::new());
        registry.register::<Wide, _>(TupleFormatter::<Wide>::new());
        registry.register::<(Pair, Vec<u8>), _>(TupleFormatter::<(Pair, Vec<u8>)>::new());
        JsonOptions::new(registry.into_shared())
    }

    #[test]
    fn pair_wire_form() {
        let text = crate::to_string(&(1, "x".to_owned()), &options()).unwrap();
        assert_snapshot!(text, @r#"{"Item1":1,"Item2":"x"}"#);
    }

    #[test]
    fn seven_items_round_trip() {
        let options = options();
        let value: Wide = (1, 2, 3, 4, -5, true, "seven".to_owned());
        let text = crate::to_string(&value, &options).unwrap();
        assert_snapshot!(
            text,
            @r#"{"Item1":1,"Item2":2,"Item3":3,"Item4":4,"Item5":-5,"Item6":true,"Item7":"seven"}"#
        );
        assert_eq!(crate::from_str::<Wide>(&text, &options).unwrap(), value);
    }

    #[rstest]
    #[case(r#"{"Item2":"b","Item1":2}"#, (2, "b"))]
    #[case(r#"{"Item1":3,"Extra":{"x":[1,{"y":null}]},"Item2":"c"}"#, (3, "c"))]
    #[case(r#"{"Item2":"d"}"#, (0, "d"))]
    #[case(r#"{}"#, (0, ""))]
    #[case("null", (0, ""))]
    fn lenient_reads(#[case] input: &str, #[case] expected: (i32, &str)) {
        let value: Pair = crate::from_str(input, &options()).unwrap();
        assert_eq!(value, (expected.0, expected.1.to_owned()));
    }

    #[test]
    fn nested_tuples() {
        let options = options();
        let value = ((7, "n".to_owned()), vec![1u8, 2]);
        let text = crate::to_string(&value, &options).unwrap();
        assert_eq!(text, r#"{"Item1":{"Item1":7,"Item2":"n"},"Item2":[1,2]}"#);
        assert_eq!(crate::from_str::<(Pair, Vec<u8>)>(&text, &options).unwrap(), value);
    }

    #[test]
    fn wrong_item_type_is_a_format_error() {
        let err = crate::from_str::<Pair>(r#"{"Item1":"one"}"#, &options()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Format);
    }
}
