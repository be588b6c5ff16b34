//! Built-in formatters.
//!
//! Scalars (booleans, numbers, chars, strings, GUIDs and URIs) are plain
//! functions and are registered as fast paths. Containers are generic over their element
//! type and resolve the element codec from the options they are called with.

mod bit_vector;
mod collection;
mod dictionary;
mod enums;
mod grouping;
mod guid;
mod nullable;
mod primitive;
mod sequence;
mod string;
mod tuple;
mod uri;

use std::sync::Arc;

use url::Url;
use uuid::Uuid;

use crate::resolver::FormatterRegistry;

pub use bit_vector::{BitVector, BitVectorFormatter};
pub use collection::{ArrayFormatter, ArraySegment, ArraySegmentFormatter, ListFormatter};
pub use dictionary::DictionaryFormatter;
pub use enums::{EnumFormatter, EnumMember, NamedEnum};
pub use grouping::{Grouping, GroupingFormatter};
pub use guid::GuidFormatter;
pub use nullable::NullableFormatter;
pub use primitive::{
    BoolFormatter, CharFormatter, F32Formatter, F64Formatter, I8Formatter, I16Formatter, I32Formatter,
    I64Formatter, IsizeFormatter, U8Formatter, U16Formatter, U32Formatter, U64Formatter, UsizeFormatter,
};
pub use sequence::SequenceFormatter;
pub use string::StrFormatter;
pub use tuple::TupleFormatter;
pub use uri::UriFormatter;

/// Registers every scalar with its fast path, plus `Option`, `Vec` and
/// `Box<[_]>` of each scalar, and [`BitVector`].
pub(crate) fn register_builtins(registry: &FormatterRegistry) {
    macro_rules! scalars {
        ($($ty:ty => $formatter:ty),* $(,)?) => {
            $(
                registry.register_static::<$ty>(
                    <$formatter>::serialize_static,
                    <$formatter>::deserialize_static,
                );
                registry.register_with::<Option<$ty>, _, _>(NullableFormatter::<$ty>::new);
                registry.register_with::<Vec<$ty>, _, _>(ListFormatter::<$ty>::new);
                registry.register_with::<Box<[$ty]>, _, _>(ArrayFormatter::<$ty>::new);
            )*
        };
    }

    scalars! {
        bool => BoolFormatter,
        i8 => I8Formatter,
        i16 => I16Formatter,
        i32 => I32Formatter,
        i64 => I64Formatter,
        isize => IsizeFormatter,
        u8 => U8Formatter,
        u16 => U16Formatter,
        u32 => U32Formatter,
        u64 => U64Formatter,
        usize => UsizeFormatter,
        f32 => F32Formatter,
        f64 => F64Formatter,
        char => CharFormatter,
        String => StrFormatter<String>,
        Box<str> => StrFormatter<Box<str>>,
        Arc<str> => StrFormatter<Arc<str>>,
        Uuid => GuidFormatter,
        Url => UriFormatter,
    }

    registry.register::<BitVector, _>(BitVectorFormatter);
}
