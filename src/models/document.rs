use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{DocumentKind, DocumentStatus};

/// An uploaded (or system-generated) loan document and where its bytes live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub loan_id: i64,
    pub user_id: i64,
    pub kind: DocumentKind,
    /// Remote storage locator (public URL).
    pub file_url: String,
    pub status: DocumentStatus,
    pub created_at: NaiveDateTime,
}

/// Input for registering a document record.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub loan_id: i64,
    pub user_id: i64,
    pub kind: DocumentKind,
    pub file_url: String,
    pub status: DocumentStatus,
}

impl NewDocument {
    /// A user upload, recorded with status `UPLOADED`.
    pub fn uploaded(loan_id: i64, user_id: i64, kind: DocumentKind, file_url: &str) -> Self {
        Self {
            loan_id,
            user_id,
            kind,
            file_url: file_url.to_string(),
            status: DocumentStatus::Uploaded,
        }
    }
}
