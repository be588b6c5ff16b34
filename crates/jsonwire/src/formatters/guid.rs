use uuid::Uuid;

use crate::{
    JsonOptions, JsonReader, JsonWriter,
    error::{Error, FormatError},
    formatter::JsonFormatter,
};

/// Quoted hyphenated form plus the two quotes.
const GUID_LEN: usize = 38;
const HYPHENATED_LEN: usize = 36;

/// `"xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"`, lowercase.
///
/// Written into a single 38-byte reservation at fixed offsets. Reading
/// accepts upper- and lowercase digits, but only in the hyphenated layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidFormatter;

impl GuidFormatter {
    pub fn serialize_static(writer: &mut JsonWriter, value: &Uuid, _options: &JsonOptions) -> Result<(), Error> {
        let span = writer.reserve(GUID_LEN);
        span[0] = b'"';
        value
            .hyphenated()
            .encode_lower(&mut span[1..=HYPHENATED_LEN]);
        span[GUID_LEN - 1] = b'"';
        writer.commit(GUID_LEN);
        Ok(())
    }

    pub fn deserialize_static(reader: &mut JsonReader<'_>, _options: &JsonOptions) -> Result<Uuid, Error> {
        reader.skip_whitespace();
        let start = reader.position();
        let raw = reader.read_string_segment_raw()?;
        if raw.len() != HYPHENATED_LEN || raw[8] != b'-' {
            return Err(invalid(start));
        }
        Uuid::try_parse_ascii(raw).map_err(|_| invalid(start))
    }
}

fn invalid(position: usize) -> Error {
    Error::Format {
        kind: FormatError::InvalidGuid,
        position,
    }
}

impl JsonFormatter<Uuid> for GuidFormatter {
    fn serialize(&self, writer: &mut JsonWriter, value: &Uuid, options: &JsonOptions) -> Result<(), Error> {
        Self::serialize_static(writer, value, options)
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<Uuid, Error> {
        Self::deserialize_static(reader, options)
    }
}
