use crate::{error::InternalError, resolve::ValueResolver};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use thiserror::Error as ThisError;

///
/// Encoding
///
/// Wire tag describing how `data` must be read. Absent means utf8.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    #[default]
    Utf8,
    Base64,
    StorageRef,
}

///
/// FieldValueError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FieldValueError {
    #[error("field value is not valid base64: {0}")]
    InvalidBase64(String),
}

///
/// FieldValue
///
/// One value of a multi-valued field: inline text, inline bytes, or a
/// reference into remote storage. Exactly one representation is held.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "FieldValueWire", into = "FieldValueWire")]
pub enum FieldValue {
    Text(String),
    Bytes(Vec<u8>),
    Reference(String),
}

impl FieldValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn reference(reference: impl Into<String>) -> Self {
        Self::Reference(reference.into())
    }

    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        match self {
            Self::Text(_) => Encoding::Utf8,
            Self::Bytes(_) => Encoding::Base64,
            Self::Reference(_) => Encoding::StorageRef,
        }
    }

    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// Inline data, or `None` for a storage reference.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(text) => Some(text.as_bytes()),
            Self::Bytes(bytes) => Some(bytes),
            Self::Reference(_) => None,
        }
    }

    #[must_use]
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Self::Reference(reference) => Some(reference),
            Self::Text(_) | Self::Bytes(_) => None,
        }
    }

    /// Inline data of this value.
    ///
    /// Reading inline data from a storage reference is a caller bug and panics.
    #[must_use]
    #[track_caller]
    pub fn value(&self) -> &[u8] {
        match self.as_bytes() {
            Some(bytes) => bytes,
            None => panic!("field value is a storage reference; open a stream instead"),
        }
    }

    /// Storage reference of this value.
    ///
    /// Asking an inline value for its reference is a caller bug and panics.
    #[must_use]
    #[track_caller]
    pub fn storage_reference(&self) -> &str {
        match self.as_reference() {
            Some(reference) => reference,
            None => panic!("field value holds inline data, not a storage reference"),
        }
    }

    /// Inline data as text, when it is valid UTF-8.
    #[must_use]
    pub fn string_value(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            Self::Reference(_) => None,
        }
    }

    /// Open the value for reading. Storage references go through `resolver`.
    pub fn open_stream<'a>(
        &'a self,
        resolver: &'a dyn ValueResolver,
    ) -> Result<Box<dyn Read + 'a>, InternalError> {
        match self {
            Self::Text(text) => Ok(Box::new(Cursor::new(text.as_bytes()))),
            Self::Bytes(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
            Self::Reference(reference) => resolver.resolve(reference),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

///
/// FieldValueWire
///

#[derive(Clone, Debug, Deserialize, Serialize)]
struct FieldValueWire {
    #[serde(default)]
    data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encoding: Option<Encoding>,
}

impl TryFrom<FieldValueWire> for FieldValue {
    type Error = FieldValueError;

    fn try_from(wire: FieldValueWire) -> Result<Self, Self::Error> {
        let data = wire.data.unwrap_or_default();

        match wire.encoding.unwrap_or_default() {
            Encoding::Utf8 => Ok(Self::Text(data)),
            Encoding::StorageRef => Ok(Self::Reference(data)),
            Encoding::Base64 => STANDARD
                .decode(data.as_bytes())
                .map(Self::Bytes)
                .map_err(|err| FieldValueError::InvalidBase64(err.to_string())),
        }
    }
}

impl From<FieldValue> for FieldValueWire {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(text) => Self {
                data: Some(text),
                encoding: None,
            },
            FieldValue::Bytes(bytes) => Self {
                data: Some(STANDARD.encode(bytes)),
                encoding: Some(Encoding::Base64),
            },
            FieldValue::Reference(reference) => Self {
                data: Some(reference),
                encoding: Some(Encoding::StorageRef),
            },
        }
    }
}
