use serde::{Deserialize, Serialize};

/// Applicant record used for cross-checks.
///
/// `dob` is kept as the string the applicant entered; verification compares it
/// verbatim against the date printed on the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub dob: Option<String>,
    pub pan_number: Option<String>,
    pub aadhaar_last_4: Option<String>,
    pub aadhaar_verified: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub pan_number: Option<String>,
}
