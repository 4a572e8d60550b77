use crate::serialize::{MAX_PAYLOAD_BYTES, SerializeError};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{from_slice, to_vec};

/// Serialize a value into JSON bytes.
pub(super) fn serialize<T>(t: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    to_vec(t).map_err(|e| SerializeError::Serialize(e.to_string()))
}

/// Deserialize JSON bytes into a value. Oversized input is refused
/// before decoding.
pub(super) fn deserialize<T>(bytes: &[u8]) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if bytes.len() > MAX_PAYLOAD_BYTES {
        return Err(SerializeError::Deserialize(
            "payload exceeds maximum allowed size".into(),
        ));
    }

    from_slice(bytes).map_err(|err| SerializeError::Deserialize(err.to_string()))
}
