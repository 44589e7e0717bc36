//! Projection from raw API records to the persisted metadata shape.

use tracing::warn;

use super::record::{PersistedRecord, RawRecord, RecordId};

/// Builds the persisted record for `id`.
///
/// Every absent field is replaced by its empty default (empty string, empty
/// tag list, `false`). The requested `id` is the persisted identifier, since
/// it is what resume checks are keyed on. `local_image` is copied through
/// unchanged.
#[must_use]
pub fn project(id: RecordId, record: &RawRecord, local_image: Option<&str>) -> PersistedRecord {
    if let Some(reported) = record.object_id
        && reported != id
    {
        warn!(id, reported, "API reported a different objectID, keeping requested id");
    }

    let text = |field: &Option<String>| field.clone().unwrap_or_default();

    PersistedRecord {
        object_id: id,
        title: text(&record.title),
        artist_display_name: text(&record.artist_display_name),
        artist_display_bio: text(&record.artist_display_bio),
        object_date: text(&record.object_date),
        object_name: text(&record.object_name),
        medium: text(&record.medium),
        dimensions: text(&record.dimensions),
        department: text(&record.department),
        culture: text(&record.culture),
        period: text(&record.period),
        dynasty: text(&record.dynasty),
        credit_line: text(&record.credit_line),
        object_url: text(&record.object_url),
        is_public_domain: record.is_public_domain.unwrap_or(false),
        primary_image: text(&record.primary_image),
        primary_image_small: text(&record.primary_image_small),
        local_image: local_image.map(str::to_string),
        tags: record.tags.clone().unwrap_or_default(),
    }
}
