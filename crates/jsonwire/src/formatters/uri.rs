use url::Url;

use crate::{
    JsonOptions, JsonReader, JsonWriter,
    error::{Error, FormatError},
    formatter::JsonFormatter,
};

/// Absolute URI as a JSON string.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriFormatter;

impl UriFormatter {
    pub fn serialize_static(writer: &mut JsonWriter, value: &Url, _options: &JsonOptions) -> Result<(), Error> {
        writer.write_string(value.as_str());
        Ok(())
    }

    pub fn deserialize_static(reader: &mut JsonReader<'_>, _options: &JsonOptions) -> Result<Url, Error> {
        reader.skip_whitespace();
        let start = reader.position();
        let text = reader.read_string()?;
        Url::parse(&text).map_err(|err| Error::Format {
            kind: FormatError::InvalidUri(err.to_string()),
            position: start,
        })
    }
}

impl JsonFormatter<Url> for UriFormatter {
    fn serialize(&self, writer: &mut JsonWriter, value: &Url, options: &JsonOptions) -> Result<(), Error> {
        Self::serialize_static(writer, value, options)
    }

    fn deserialize(&self, reader: &mut JsonReader<'_>, options: &JsonOptions) -> Result<Url, Error> {
        Self::deserialize_static(reader, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn round_trip() {
        let options = JsonOptions::default();
        let url = Url::parse("https://example.com/a b?q=\"x\"").unwrap();
        let text = crate::to_string(&url, &options).unwrap();
        assert_eq!(text, r#""https://example.com/a%20b?q=%22x%22""#);
        assert_eq!(crate::from_str::<Url>(&text, &options).unwrap(), url);
    }

    #[test]
    fn relative_uri_is_rejected() {
        let err = crate::from_str::<Url>(r#""/relative""#, &JsonOptions::default()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Format);
        assert!(matches!(
            err,
            Error::Format {
                kind: FormatError::InvalidUri(_),
                position: 0
            }
        ));
    }
}
