use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

/// Record an uploaded or generated document and return the stored row.
pub fn insert_document(conn: &Connection, doc: &NewDocument) -> Result<Document, DatabaseError> {
    let created_at = Utc::now().naive_utc();
    conn.execute(
        "INSERT INTO documents (loan_id, user_id, type, file_url, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            doc.loan_id,
            doc.user_id,
            doc.kind.as_str(),
            doc.file_url,
            doc.status.as_str(),
            format_timestamp(&created_at),
        ],
    )?;

    Ok(Document {
        id: conn.last_insert_rowid(),
        loan_id: doc.loan_id,
        user_id: doc.user_id,
        kind: doc.kind,
        file_url: doc.file_url.clone(),
        status: doc.status,
        created_at,
    })
}

/// Most recent document of the given kind attached to a loan. A re-upload
/// supersedes earlier files.
pub fn get_document_for_loan(
    conn: &Connection,
    loan_id: i64,
    kind: DocumentKind,
) -> Result<Option<Document>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, loan_id, user_id, type, file_url, status, created_at
             FROM documents WHERE loan_id = ?1 AND type = ?2
             ORDER BY id DESC LIMIT 1",
            params![loan_id, kind.as_str()],
            |row| {
                Ok(DocumentRow {
                    id: row.get(0)?,
                    loan_id: row.get(1)?,
                    user_id: row.get(2)?,
                    doc_type: row.get(3)?,
                    file_url: row.get(4)?,
                    status: row.get(5)?,
                    created_at: row.get(6)?,
                })
            },
        )
        .optional()?;

    row.map(document_from_row).transpose()
}

struct DocumentRow {
    id: i64,
    loan_id: i64,
    user_id: i64,
    doc_type: String,
    file_url: String,
    status: String,
    created_at: String,
}

fn document_from_row(row: DocumentRow) -> Result<Document, DatabaseError> {
    Ok(Document {
        id: row.id,
        loan_id: row.loan_id,
        user_id: row.user_id,
        kind: DocumentKind::from_str(&row.doc_type)?,
        file_url: row.file_url,
        status: DocumentStatus::from_str(&row.status)?,
        created_at: parse_timestamp("documents.created_at", &row.created_at)?,
    })
}
