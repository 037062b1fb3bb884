//! Repository layer: entity-scoped database operations.

mod document;
mod user;
mod verification;

use chrono::NaiveDateTime;

use super::DatabaseError;

pub use document::*;
pub use user::*;
pub use verification::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(field: &str, raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| DatabaseError::InvalidValue {
        field: field.into(),
        reason: e.to_string(),
    })
}
