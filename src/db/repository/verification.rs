use std::str::FromStr;

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

const SELECT_COLUMNS: &str =
    "SELECT id, loan_id, type, status, result, review_note, reviewed_at, created_at
     FROM verification_results";

/// Remove every stored result for the key. Returns the number of rows removed.
pub fn delete_verification_results(
    conn: &Connection,
    loan_id: i64,
    kind: DocumentKind,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM verification_results WHERE loan_id = ?1 AND type = ?2",
        params![loan_id, kind.as_str()],
    )?;
    Ok(deleted)
}

/// Delete prior results for (loan, kind) and insert `result`, in one transaction.
pub fn replace_verification_result(
    conn: &Connection,
    result: &VerificationResult,
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    write_verification_result(&tx, result)?;
    tx.commit()?;
    Ok(())
}

/// Delete-then-insert for the result's key without opening a transaction.
/// Callers run it inside their own transaction.
pub fn write_verification_result(
    conn: &Connection,
    result: &VerificationResult,
) -> Result<(), DatabaseError> {
    let payload = serde_json::to_string(&result.payload).map_err(|e| {
        DatabaseError::InvalidValue {
            field: "verification_results.result".into(),
            reason: e.to_string(),
        }
    })?;

    conn.execute(
        "DELETE FROM verification_results WHERE loan_id = ?1 AND type = ?2",
        params![result.loan_id, result.kind.as_str()],
    )?;
    conn.execute(
        "INSERT INTO verification_results
         (id, loan_id, type, status, result, review_note, reviewed_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            result.id.to_string(),
            result.loan_id,
            result.kind.as_str(),
            result.status.as_str(),
            payload,
            result.review_note,
            result.reviewed_at.as_ref().map(format_timestamp),
            format_timestamp(&result.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_verification_result(
    conn: &Connection,
    loan_id: i64,
    kind: DocumentKind,
) -> Result<Option<VerificationResult>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE loan_id = ?1 AND type = ?2"),
            params![loan_id, kind.as_str()],
            result_row,
        )
        .optional()?;
    row.map(result_from_row).transpose()
}

pub fn count_verification_results(
    conn: &Connection,
    loan_id: i64,
    kind: DocumentKind,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM verification_results WHERE loan_id = ?1 AND type = ?2",
        params![loan_id, kind.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// All results for a loan, in document-kind order of creation.
pub fn list_verification_results(
    conn: &Connection,
    loan_id: i64,
) -> Result<Vec<VerificationResult>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE loan_id = ?1 ORDER BY created_at ASC, rowid ASC"
    ))?;
    let rows = stmt
        .query_map(params![loan_id], result_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(result_from_row).collect()
}

/// Results currently in `status`, oldest first.
pub fn list_results_by_status(
    conn: &Connection,
    status: VerificationStatus,
) -> Result<Vec<VerificationResult>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE status = ?1 ORDER BY created_at ASC, rowid ASC"
    ))?;
    let rows = stmt
        .query_map(params![status.as_str()], result_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(result_from_row).collect()
}

/// Set a reviewer decision on an existing result.
pub fn override_verification_status(
    conn: &Connection,
    loan_id: i64,
    kind: DocumentKind,
    status: VerificationStatus,
    note: &str,
) -> Result<VerificationResult, DatabaseError> {
    let reviewed_at = Utc::now().naive_utc();
    let rows = conn.execute(
        "UPDATE verification_results SET status = ?3, review_note = ?4, reviewed_at = ?5
         WHERE loan_id = ?1 AND type = ?2",
        params![
            loan_id,
            kind.as_str(),
            status.as_str(),
            note,
            format_timestamp(&reviewed_at),
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "VerificationResult".into(),
            id: format!("{loan_id}/{}", kind.as_str()),
        });
    }

    get_verification_result(conn, loan_id, kind)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "VerificationResult".into(),
        id: format!("{loan_id}/{}", kind.as_str()),
    })
}

struct ResultRow {
    id: String,
    loan_id: i64,
    doc_type: String,
    status: String,
    result: String,
    review_note: Option<String>,
    reviewed_at: Option<String>,
    created_at: String,
}

fn result_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ResultRow> {
    Ok(ResultRow {
        id: row.get(0)?,
        loan_id: row.get(1)?,
        doc_type: row.get(2)?,
        status: row.get(3)?,
        result: row.get(4)?,
        review_note: row.get(5)?,
        reviewed_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn result_from_row(row: ResultRow) -> Result<VerificationResult, DatabaseError> {
    let id = Uuid::parse_str(&row.id).map_err(|e| DatabaseError::InvalidValue {
        field: "verification_results.id".into(),
        reason: e.to_string(),
    })?;
    let payload = serde_json::from_str(&row.result).map_err(|e| DatabaseError::InvalidValue {
        field: "verification_results.result".into(),
        reason: e.to_string(),
    })?;
    let reviewed_at: Option<NaiveDateTime> = row
        .reviewed_at
        .as_deref()
        .map(|s| parse_timestamp("verification_results.reviewed_at", s))
        .transpose()?;

    Ok(VerificationResult {
        id,
        loan_id: row.loan_id,
        kind: DocumentKind::from_str(&row.doc_type)?,
        status: VerificationStatus::from_str(&row.status)?,
        payload,
        review_note: row.review_note,
        reviewed_at,
        created_at: parse_timestamp("verification_results.created_at", &row.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn on_hold(loan_id: i64, kind: DocumentKind) -> VerificationResult {
        VerificationResult::new(
            loan_id,
            kind,
            VerificationStatus::OnHold,
            VerificationPayload::reason("not enough salary credits"),
        )
    }

    #[test]
    fn replace_keeps_a_single_row_per_key() {
        let conn = open_memory_database().unwrap();
        replace_verification_result(&conn, &on_hold(1, DocumentKind::BankStatement)).unwrap();
        let second = VerificationResult::new(
            1,
            DocumentKind::BankStatement,
            VerificationStatus::Verified,
            VerificationPayload::default(),
        );
        replace_verification_result(&conn, &second).unwrap();

        assert_eq!(count_verification_results(&conn, 1, DocumentKind::BankStatement).unwrap(), 1);
        let stored = get_verification_result(&conn, 1, DocumentKind::BankStatement)
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, second.id);
        assert_eq!(stored.status, VerificationStatus::Verified);
    }

    #[test]
    fn replace_does_not_touch_other_keys() {
        let conn = open_memory_database().unwrap();
        replace_verification_result(&conn, &on_hold(1, DocumentKind::Pan)).unwrap();
        replace_verification_result(&conn, &on_hold(1, DocumentKind::Aadhaar)).unwrap();
        replace_verification_result(&conn, &on_hold(2, DocumentKind::Pan)).unwrap();

        assert_eq!(list_verification_results(&conn, 1).unwrap().len(), 2);
        assert_eq!(list_verification_results(&conn, 2).unwrap().len(), 1);
    }

    #[test]
    fn payload_survives_storage() {
        let conn = open_memory_database().unwrap();
        let result = on_hold(3, DocumentKind::BankStatement);
        replace_verification_result(&conn, &result).unwrap();

        let stored = get_verification_result(&conn, 3, DocumentKind::BankStatement)
            .unwrap()
            .unwrap();
        assert_eq!(stored.payload, result.payload);
        assert_eq!(stored.reason(), Some("not enough salary credits"));
    }

    #[test]
    fn delete_reports_removed_rows() {
        let conn = open_memory_database().unwrap();
        replace_verification_result(&conn, &on_hold(1, DocumentKind::Pan)).unwrap();
        assert_eq!(delete_verification_results(&conn, 1, DocumentKind::Pan).unwrap(), 1);
        assert_eq!(delete_verification_results(&conn, 1, DocumentKind::Pan).unwrap(), 0);
    }

    #[test]
    fn list_by_status_filters() {
        let conn = open_memory_database().unwrap();
        replace_verification_result(&conn, &on_hold(1, DocumentKind::Pan)).unwrap();
        replace_verification_result(
            &conn,
            &VerificationResult::new(
                2,
                DocumentKind::Pan,
                VerificationStatus::Verified,
                VerificationPayload::default(),
            ),
        )
        .unwrap();

        let held = list_results_by_status(&conn, VerificationStatus::OnHold).unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].loan_id, 1);
    }

    #[test]
    fn override_stamps_reviewer_fields() {
        let conn = open_memory_database().unwrap();
        replace_verification_result(&conn, &on_hold(1, DocumentKind::Pan)).unwrap();

        let updated = override_verification_status(
            &conn,
            1,
            DocumentKind::Pan,
            VerificationStatus::Verified,
            "PAN confirmed with issuing authority",
        )
        .unwrap();

        assert_eq!(updated.status, VerificationStatus::Verified);
        assert_eq!(
            updated.review_note.as_deref(),
            Some("PAN confirmed with issuing authority")
        );
        assert!(updated.reviewed_at.is_some());
    }

    #[test]
    fn override_missing_result_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = override_verification_status(
            &conn,
            1,
            DocumentKind::Pan,
            VerificationStatus::Verified,
            "n/a",
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
