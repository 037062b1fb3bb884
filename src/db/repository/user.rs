use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_user(conn: &Connection, user: &NewUser) -> Result<User, DatabaseError> {
    conn.execute(
        "INSERT INTO users (name, dob, pan_number) VALUES (?1, ?2, ?3)",
        params![user.name, user.dob, user.pan_number],
    )?;

    Ok(User {
        id: conn.last_insert_rowid(),
        name: user.name.clone(),
        dob: user.dob.clone(),
        pan_number: user.pan_number.clone(),
        aadhaar_last_4: None,
        aadhaar_verified: false,
    })
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            "SELECT id, name, dob, pan_number, aadhaar_last_4, aadhaar_verified
             FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// Another applicant already holding this PAN, if any.
pub fn find_other_user_with_pan(
    conn: &Connection,
    pan: &str,
    exclude_user_id: i64,
) -> Result<Option<User>, DatabaseError> {
    let user = conn
        .query_row(
            "SELECT id, name, dob, pan_number, aadhaar_last_4, aadhaar_verified
             FROM users WHERE pan_number = ?1 AND id != ?2
             ORDER BY id ASC LIMIT 1",
            params![pan, exclude_user_id],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// Store the masked Aadhaar and flag it as verified.
pub fn record_aadhaar_verification(
    conn: &Connection,
    user_id: i64,
    aadhaar_last_4: &str,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE users SET aadhaar_last_4 = ?2, aadhaar_verified = 1 WHERE id = ?1",
        params![user_id, aadhaar_last_4],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: user_id.to_string(),
        });
    }
    Ok(())
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        dob: row.get(2)?,
        pan_number: row.get(3)?,
        aadhaar_last_4: row.get(4)?,
        aadhaar_verified: row.get::<_, i32>(5)? != 0,
    })
}
