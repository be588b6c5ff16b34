//! Enums written by member name.
//!
//! An enum opts in by implementing [`NamedEnum`]. [`EnumFormatter`] builds two
//! lookup tables the first time it is used: raw name bytes to value, and
//! value to the pre-escaped, quoted name. Serialization of a declared member
//! is then a single copy, and deserialization of a name spelled the way the
//! writer escapes it is a single hash lookup on the undecoded input bytes.
//!
//! Anything the tables do not cover takes the slow path: flag combinations
//! are written as `"A, B"` and undeclared values as their decimal number;
//! reading decodes the string and accepts declared names, renames,
//! comma-separated flag names and decimal numbers. A JSON number is always
//! accepted as the underlying value.

use std::{any::type_name, fmt, sync::OnceLock};

use ahash::AHashMap;
use bstr::BString;

use crate::{
    JsonOptions, JsonReader, JsonWriter,
    error::{Error, FormatError},
    escape,
    formatter::JsonFormatter,
    reader::JsonToken,
};

/// One declared member of a [`NamedEnum`].
#[derive(Debug, Clone, Copy)]
pub struct EnumMember<E> {
    pub name: &'static str,
    /// Name used on the wire instead of `name`.
    pub rename: Option<&'static str>,
    pub value: E,
}

impl<E> EnumMember<E> {
    #[must_use]
    pub const fn new(name: &'static str, value: E) -> Self {
        Self {
            name,
            rename: None,
            value,
        }
    }

    #[must_use]
    pub const fn renamed(name: &'static str, rename: &'static str, value: E) -> Self {
        Self {
            name,
            rename: Some(rename),
            value,
        }
    }

    /// The name written to JSON.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }
}

/// An enum with named members and an integer representation.
///
/// ```rust
/// use jsonwire::formatters::{EnumMember, NamedEnum};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Color {
///     Red = 1,
///     Green = 2,
/// }
///
/// impl NamedEnum for Color {
///     const MEMBERS: &'static [EnumMember<Self>] = &[
///         EnumMember::new("Red", Color::Red),
///         EnumMember::renamed("Green", "green", Color::Green),
///     ];
///
///     fn to_underlying(self) -> i64 {
///         self as i64
///     }
///
///     fn from_underlying(value: i64) -> Option<Self> {
///         Self::MEMBERS
///             .iter()
///             .map(|member| member.value)
///             .find(|member| member.to_underlying() == value)
///     }
/// }
/// ```
pub trait NamedEnum: Copy + Send + Sync + 'static {
    const MEMBERS: &'static [EnumMember<Self>];

    /// Whether values may be bitwise combinations of members.
    const IS_FLAGS: bool = false;

    fn to_underlying(self) -> i64;

    /// The value for `value`, `None` if it is not representable.
    fn from_underlying(value: i64) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Representation {
    Name,
    Value,
}

struct Tables {
    /// Keyed by the escaped bytes between the quotes, as written.
    by_name: AHashMap<Box<[u8]>, i64>,
    by_value: AHashMap<i64, Box<[u8]>>,
}

/// Formatter for a [`NamedEnum`].
pub struct EnumFormatter<E> {
    representation: Representation,
    tables: OnceLock<Tables>,
    _enum: std::marker::PhantomData<fn() -> E>,
}

impl<E> fmt::Debug for EnumFormatter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumFormatter")
            .field("enum", &type_name::<E>())
            .field("representation", &self.representation)
            .field("initialized", &self.tables.get().is_some())
            .finish()
    }
}

impl<E> Default for EnumFormatter<E> {
    fn default() -> Self {
        Self::by_name()
    }
}

impl<E> EnumFormatter<E> {
    /// Writes member names.
    #[must_use]
    pub const fn by_name() -> Self {
        Self::with_representation(Representation::Name)
    }

    /// Writes the underlying number.
    #[must_use]
    pub const fn by_value() -> Self {
        Self::with_representation(Representation::Value)
    }

    const fn with_representation(representation: Representation) -> Self {
        Self {
            representation,
            tables: OnceLock::new(),
            _enum: std::marker::PhantomData,
        }
    }
}

impl<E: NamedEnum> EnumFormatter<E> {
    fn tables(&self) -> &Tables {
        self.tables.get_or_init(|| {
            tracing::debug!(r#enum = type_name::<E>(), members = E::MEMBERS.len(), "building enum name tables");
            let mut by_name: AHashMap<Box<[u8]>, i64> = AHashMap::with_capacity(E::MEMBERS.len());
            let mut by_value = AHashMap::with_capacity(E::MEMBERS.len());
            for member in E::MEMBERS {
                let value = member.value.to_underlying();
                let quoted = escape::quote(member.wire_name());
                by_name
                    .entry(Box::from(&quoted[1..quoted.len() - 1]))
                    .or_insert(value);
                by_value.entry(value).or_insert_with(|| quoted.into_boxed_slice());
            }
            Tables { by_name, by_value }
        })
    }

    fn write_fallback(writer: &mut JsonWriter, value: i64) {
        if E::IS_FLAGS {
            if let Some(names) = flag_names::<E>(value) {
                writer.write_string(&names);
                return;
            }
        }
        writer.write_string(itoa::Buffer::new().format(value));
    }

    fn from_value(value: i64, position: usize) -> Result<E, Error> {
        E::from_underlying(value).ok_or_else(|| Error::Format {
            kind: FormatError::UnknownEnumValue {
                type_name: type_name::<E>(),
                value,
            },
            position,
        })
    }

    fn read_name(&self, reader: &mut JsonReader<'_>, position: usize) -> Result<E, Error> {
        let mut lookahead = reader.clone();
        let raw = lookahead.read_string_segment_raw()?;
        if let Some(&value) = self.tables().by_name.get(raw) {
            *reader = lookahead;
            return Self::from_value(value, position);
        }

        let text = reader.read_string()?;
        let Some(value) = parse_generic::<E>(&text) else {
            return Err(Error::Format {
                kind: FormatError::UnknownEnumName {
                    type_name: type_name::<E>(),
                    name: BString::from(text.as_bytes()),
                },
                position,
            });
        };
        Self::from_value(value, position)
    }
}

/// `"A, B"` for a value made of declared flags, largest flags first taken.
fn flag_names<E: NamedEnum>(value: i64) -> Option<String> {
    let mut members: Vec<_> = E::MEMBERS
        .iter()
        .map(|member| (member.value.to_underlying(), member.wire_name()))
        .filter(|(flag, _)| *flag != 0)
        .collect();
    members.sort_by(|a, b| b.0.cmp(&a.0));

    let mut remaining = value;
    let mut parts = Vec::new();
    for (flag, name) in members {
        if remaining & flag == flag {
            remaining &= !flag;
            parts.push((flag, name));
        }
    }
    if remaining != 0 || parts.is_empty() {
        return None;
    }
    parts.sort_by_key(|(flag, _)| *flag);
    Some(
        parts
            .iter()
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Declared names, renames, decimals and comma-separated combinations.
fn parse_generic<E: NamedEnum>(text: &str) -> Option<i64> {
    text.split(',').try_fold(0i64, |acc, part| {
        let part = part.trim();
        let value = E::MEMBERS
            .iter()
            .find(|member| member.name == part || member.rename == Some(part))
            .map(|member| member.value.to_underlying())
            .or_else(|| part.parse().ok())?;
        Some(acc | value)
    })
}

impl<E: NamedEnum> JsonFormatter<E> for EnumFormatter<E> {
    fn serialize(&self, writer: &mut JsonWriter, value: &E, _options: &JsonOptions) -> Result<(), Error> {
        let value = value.to_underlying();
        match self.representation {
            Representation::Value => writer.write_i64(value),
            Representation::Name => match self.tables().by_value.get(&value) {
                Some(quoted) => writer.write_raw(quoted),
                None => Self::write_fallback(writer, value),
            },
        }
        Ok(())
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, _options: &JsonOptions) -> Result<E, Error> {
        reader.skip_whitespace();
        let position = reader.position();
        match reader.peek_token() {
            JsonToken::Number => {
                let value = reader.read_i64()?;
                Self::from_value(value, position)
            }
            _ => self.read_name(reader, position),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::FormatterRegistry;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Fruit {
        Apple = 1,
        Pear = 2,
        Quoted = 3,
    }

    impl NamedEnum for Fruit {
        const MEMBERS: &'static [EnumMember<Self>] = &[
            EnumMember::new("Apple", Fruit::Apple),
            EnumMember::renamed("Pear", "pear-tree", Fruit::Pear),
            EnumMember::renamed("Quoted", "say \"hi\"", Fruit::Quoted),
        ];

        fn to_underlying(self) -> i64 {
            self as i64
        }

        fn from_underlying(value: i64) -> Option<Self> {
            Self::MEMBERS
                .iter()
                .map(|member| member.value)
                .find(|fruit| fruit.to_underlying() == value)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Access(i64);

    impl Access {
        const NONE: Self = Self(0);
        const READ: Self = Self(1);
        const WRITE: Self = Self(2);
        const EXECUTE: Self = Self(4);
    }

    impl NamedEnum for Access {
        const MEMBERS: &'static [EnumMember<Self>] = &[
            EnumMember::new("None", Access::NONE),
            EnumMember::new("Read", Access::READ),
            EnumMember::new("Write", Access::WRITE),
            EnumMember::new("Execute", Access::EXECUTE),
        ];
        const IS_FLAGS: bool = true;

        fn to_underlying(self) -> i64 {
            self.0
        }

        fn from_underlying(value: i64) -> Option<Self> {
            (0..8).contains(&value).then_some(Self(value))
        }
    }

    fn options() -> JsonOptions {
        let registry = FormatterRegistry::with_builtins();
        registry.register::<Fruit, _>(EnumFormatter::<Fruit>::by_name());
        registry.register::<Access, _>(EnumFormatter::<Access>::by_name());
        JsonOptions::new(registry.into_shared())
    }

    #[rstest]
    #[case(Fruit::Apple, r#""Apple""#)]
    #[case(Fruit::Pear, r#""pear-tree""#)]
    #[case(Fruit::Quoted, r#""say \"hi\"""#)]
    fn names_round_trip(#[case] fruit: Fruit, #[case] expected: &str) {
        let options = options();
        let text = crate::to_string(&fruit, &options).unwrap();
        assert_eq!(text, expected);
        assert_eq!(crate::from_str::<Fruit>(&text, &options).unwrap(), fruit);
    }

    #[rstest]
    #[case(r#""Pear""#, Fruit::Pear)]
    #[case(r#"" Apple ""#, Fruit::Apple)]
    #[case(r#""Apple""#, Fruit::Apple)]
    #[case(r#""3""#, Fruit::Quoted)]
    #[case("2", Fruit::Pear)]
    fn slow_path_reads(#[case] input: &str, #[case] expected: Fruit) {
        assert_eq!(crate::from_str::<Fruit>(input, &options()).unwrap(), expected);
    }

    #[test]
    fn unknown_name_is_a_format_error() {
        let err = crate::from_str::<Fruit>(r#" "Banana""#, &options()).unwrap_err();
        assert_eq!(
            err,
            Error::Format {
                kind: FormatError::UnknownEnumName {
                    type_name: type_name::<Fruit>(),
                    name: BString::from("Banana"),
                },
                position: 1,
            }
        );
    }

    #[test]
    fn undeclared_number_is_rejected() {
        let err = crate::from_str::<Fruit>("9", &options()).unwrap_err();
        assert!(matches!(
            err,
            Error::Format {
                kind: FormatError::UnknownEnumValue { value: 9, .. },
                ..
            }
        ));
    }

    #[rstest]
    #[case(Access::READ, r#""Read""#)]
    #[case(Access(3), r#""Read, Write""#)]
    #[case(Access(7), r#""Read, Write, Execute""#)]
    #[case(Access::NONE, r#""None""#)]
    fn flags(#[case] access: Access, #[case] expected: &str) {
        let options = options();
        let text = crate::to_string(&access, &options).unwrap();
        assert_eq!(text, expected);
        assert_eq!(crate::from_str::<Access>(&text, &options).unwrap(), access);
    }

    #[test]
    fn by_value_writes_numbers() {
        let registry = FormatterRegistry::with_builtins();
        registry.register::<Fruit, _>(EnumFormatter::<Fruit>::by_value());
        let options = JsonOptions::new(registry.into_shared());
        assert_eq!(crate::to_string(&Fruit::Pear, &options).unwrap(), "2");
        assert_eq!(crate::from_str::<Fruit>(r#""Apple""#, &options).unwrap(), Fruit::Apple);
    }

    #[test]
    fn raw_lookup_matches_escaped_names() {
        let formatter = EnumFormatter::<Fruit>::by_name();
        let tables = formatter.tables();
        assert_eq!(tables.by_name.get(br#"say \"hi\""#.as_slice()), Some(&3));
        assert_eq!(tables.by_name.get(b"pear-tree".as_slice()), Some(&2));
        assert_eq!(tables.by_name.get(b"Pear".as_slice()), None);

        let mut reader = JsonReader::new(br#""say \"hi\"""#);
        assert_eq!(formatter.read_name(&mut reader, 0), Ok(Fruit::Quoted));
        assert!(reader.remaining().is_empty());
    }

    #[test]
    fn tables_are_built_once() {
        let formatter = EnumFormatter::<Fruit>::by_name();
        let first: *const Tables = formatter.tables();
        let second: *const Tables = formatter.tables();
        assert_eq!(first, second);
    }
}
