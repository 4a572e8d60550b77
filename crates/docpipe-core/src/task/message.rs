use crate::{
    changelog::ChangeLogEntry,
    model::{FieldValue, Snapshot},
    serialize::null_as_default,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// DocumentTaskMessage
///
/// Wire body of a document task. The same shape is returned in the
/// response, with `document` unchanged and one entry appended to
/// `change_log`.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTaskMessage {
    pub document: Snapshot,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub change_log: Vec<ChangeLogEntry>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub custom_data: BTreeMap<String, String>,
}

///
/// FieldTaskMessage
///
/// Wire body of a flat field-enrichment task.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTaskMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: BTreeMap<String, Option<Vec<FieldValue>>>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub custom_map: BTreeMap<String, String>,
}
