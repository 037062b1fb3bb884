use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DocumentKind, LoanKycStatus, VerificationStatus};

/// The single surviving verification outcome for a (loan, document kind) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub id: Uuid,
    pub loan_id: i64,
    pub kind: DocumentKind,
    pub status: VerificationStatus,
    pub payload: VerificationPayload,
    pub review_note: Option<String>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl VerificationResult {
    pub fn new(
        loan_id: i64,
        kind: DocumentKind,
        status: VerificationStatus,
        payload: VerificationPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            kind,
            status,
            payload,
            review_note: None,
            reviewed_at: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        self.payload.reason.as_deref()
    }
}

/// Structured result stored as JSON alongside the status.
///
/// Early exits carry only a `reason`; runs that reached the cross-checks
/// carry the per-kind `checks` report as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<CheckReport>,
}

impl VerificationPayload {
    pub fn reason(reason: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
            checks: None,
        }
    }

    pub fn checks(checks: CheckReport) -> Self {
        Self {
            reason: None,
            checks: Some(checks),
        }
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckReport {
    Pan(PanChecks),
    Aadhaar(AadhaarChecks),
    SalarySlip(SalarySlipChecks),
    BankStatement(BankStatementChecks),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanChecks {
    pub pan: String,
    pub pan_format_valid: bool,
    pub name_match: bool,
    pub dob_match: bool,
    pub father_name: Option<String>,
    pub duplicate_pan: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AadhaarChecks {
    pub aadhaar_last_4: String,
    pub aadhaar_format_valid: bool,
    pub name_match: bool,
    pub dob_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalarySlipChecks {
    pub employee_name: String,
    pub employer_name: String,
    pub designation: Option<String>,
    pub monthly_income: f64,
    pub name_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankStatementChecks {
    pub account_holder_name: String,
    pub salary_credits: Vec<f64>,
    /// Mean of all salary credits, rounded to the nearest rupee.
    pub average_salary: i64,
    pub salaried: bool,
    pub name_match: bool,
}

/// Aggregate KYC picture for one loan.
#[derive(Debug, Clone, Serialize)]
pub struct LoanVerificationSummary {
    pub loan_id: i64,
    pub overall: LoanKycStatus,
    pub results: Vec<VerificationResult>,
    /// Kinds with no verification result yet.
    pub missing: Vec<DocumentKind>,
}
