//! Raw and persisted record shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Catalog identifier of a single record.
pub type RecordId = u64;

/// A record as returned by the collection API.
///
/// Every field is optional. A field that is absent, `null`, or carries a
/// value of the wrong JSON type deserializes to `None` instead of failing the
/// whole record; defaults are applied later by [`project`](super::project).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(rename = "objectID", default, deserialize_with = "lenient")]
    pub object_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub artist_display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub artist_display_bio: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub object_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub object_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub dimensions: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub culture: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub period: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub dynasty: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub credit_line: Option<String>,
    #[serde(rename = "objectURL", default, deserialize_with = "lenient")]
    pub object_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_public_domain: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub primary_image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub primary_image_small: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Option<Vec<Value>>,
}

/// The durable metadata shape written to the output file.
///
/// All fields are always present in the serialized form. `local_image` is
/// `Some` only when the image download ran and succeeded for this record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    #[serde(rename = "objectID")]
    pub object_id: RecordId,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub artist_display_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub artist_display_bio: String,
    #[serde(default, deserialize_with = "nullable")]
    pub object_date: String,
    #[serde(default, deserialize_with = "nullable")]
    pub object_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub medium: String,
    #[serde(default, deserialize_with = "nullable")]
    pub dimensions: String,
    #[serde(default, deserialize_with = "nullable")]
    pub department: String,
    #[serde(default, deserialize_with = "nullable")]
    pub culture: String,
    #[serde(default, deserialize_with = "nullable")]
    pub period: String,
    #[serde(default, deserialize_with = "nullable")]
    pub dynasty: String,
    #[serde(default, deserialize_with = "nullable")]
    pub credit_line: String,
    #[serde(default, rename = "objectURL", deserialize_with = "nullable")]
    pub object_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub is_public_domain: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub primary_image: String,
    #[serde(default, deserialize_with = "nullable")]
    pub primary_image_small: String,
    #[serde(default)]
    pub local_image: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<Value>,
}

/// Response body of the collection search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub total: Option<u64>,
    #[serde(rename = "objectIDs", default, deserialize_with = "lenient")]
    pub object_ids: Option<Vec<RecordId>>,
}

/// Deserializes `null` as the type's default value.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes any JSON value, keeping it only if it fits `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
