use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const ARCHIVE_PREFIX: &str = "events";
pub const ARCHIVE_EXTENSION: &str = "json";

/// `events/YYYY/MM/DD` for the UTC date of `at`.
pub fn archive_date_prefix(at: DateTime<Utc>) -> String {
    format!("{ARCHIVE_PREFIX}/{}", at.format("%Y/%m/%d"))
}

pub fn archive_object_key(at: DateTime<Utc>, object_id: Uuid) -> String {
    format!(
        "{}/{}.{ARCHIVE_EXTENSION}",
        archive_date_prefix(at),
        object_id.simple()
    )
}

/// Fresh key with a random v4 object id. Collisions are not checked.
pub fn new_archive_object_key(at: DateTime<Utc>) -> String {
    archive_object_key(at, Uuid::new_v4())
}
