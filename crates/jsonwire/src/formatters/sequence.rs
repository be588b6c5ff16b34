use std::{fmt, iter, marker::PhantomData};

use super::collection::{LIST_SCRATCH_CAPACITY, deserialize_elements, serialize_elements};
use crate::{JsonOptions, JsonReader, JsonWriter, error::Error, formatter::JsonFormatter};

/// Any collection `C` of `T` that can be iterated, collected and extended,
/// as a JSON array.
///
/// Covers `VecDeque`, `LinkedList`, `BTreeSet`, `HashSet` and friends.
/// Merging extends the target, so set-like targets deduplicate as usual.
pub struct SequenceFormatter<C, T>(PhantomData<fn() -> (C, T)>);

impl<C, T> SequenceFormatter<C, T> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C, T> Default for SequenceFormatter<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> fmt::Debug for SequenceFormatter<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SequenceFormatter<{}>", core::any::type_name::<C>())
    }
}

impl<C, T> JsonFormatter<C> for SequenceFormatter<C, T>
where
    C: Default + FromIterator<T> + Extend<T> + 'static,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
    T: Send + 'static,
{
    fn serialize(&self, writer: &mut JsonWriter, value: &C, options: &JsonOptions) -> Result<(), Error> {
        serialize_elements(writer, value, options)
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<C, Error> {
        if let Some(empty) = options.null_or_default::<C>(reader)? {
            return Ok(empty);
        }
        let mut scratch = options.pool.rent::<T>(LIST_SCRATCH_CAPACITY)?;
        deserialize_elements(reader, options, |value| scratch.push(value))?;
        Ok(scratch.drain().collect())
    }

    fn deserialize_to(
        &self,
        reader: &mut JsonReader<'_>,
        target: &mut C,
        options: &JsonOptions,
    ) -> Result<(), Error> {
        if options.skip_null::<C>(reader)? {
            return Ok(());
        }
        deserialize_elements(reader, options, |value| {
            target.extend(iter::once(value));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use super::*;
    use crate::FormatterRegistry;

    fn options() -> JsonOptions {
        let registry = FormatterRegistry::with_builtins();
        registry.register::<VecDeque<u16>, _>(SequenceFormatter::<VecDeque<u16>, u16>::new());
        registry.register::<BTreeSet<String>, _>(SequenceFormatter::<BTreeSet<String>, String>::new());
        JsonOptions::new(registry.into_shared())
    }

    #[test]
    fn deque_round_trip() {
        let options = options();
        let value: VecDeque<u16> = (0..300).collect();
        let bytes = crate::to_vec(&value, &options).unwrap();
        assert_eq!(crate::from_slice::<VecDeque<u16>>(&bytes, &options).unwrap(), value);
    }

    #[test]
    fn set_is_written_in_iteration_order() {
        let options = options();
        let value: BTreeSet<String> = ["b", "a"].into_iter().map(str::to_owned).collect();
        assert_eq!(crate::to_string(&value, &options).unwrap(), r#"["a","b"]"#);
    }

    #[test]
    fn set_merge_extends() {
        let options = options();
        let mut target: BTreeSet<String> = ["a".to_owned()].into();
        crate::from_slice_to(br#"["c","a"]"#, &mut target, &options).unwrap();
        assert_eq!(target.into_iter().collect::<Vec<_>>(), ["a", "c"]);
    }
}
