//! Loan-level KYC status and the manual review queue.

use rusqlite::Connection;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::enums::{DocumentKind, LoanKycStatus, VerificationStatus};
use crate::models::{LoanVerificationSummary, VerificationResult};

/// Latest result per document kind plus the aggregate loan status.
pub fn verification_summary(
    conn: &Connection,
    loan_id: i64,
) -> Result<LoanVerificationSummary, DatabaseError> {
    let results = repository::list_verification_results(conn, loan_id)?;
    let missing: Vec<DocumentKind> = DocumentKind::ALL
        .into_iter()
        .filter(|kind| !results.iter().any(|r| r.kind == *kind))
        .collect();
    let overall = overall_status(&results, missing.is_empty());

    Ok(LoanVerificationSummary {
        loan_id,
        overall,
        results,
        missing,
    })
}

/// Worst outcome wins: rejection, then re-upload, then review.
/// `Verified` needs every kind present and verified.
fn overall_status(results: &[VerificationResult], complete: bool) -> LoanKycStatus {
    let any = |status: VerificationStatus| results.iter().any(|r| r.status == status);

    if any(VerificationStatus::Rejected) {
        LoanKycStatus::Rejected
    } else if any(VerificationStatus::ReuploadRequired) {
        LoanKycStatus::ActionRequired
    } else if any(VerificationStatus::OnHold) {
        LoanKycStatus::UnderReview
    } else if complete && results.iter().all(|r| r.status == VerificationStatus::Verified) {
        LoanKycStatus::Verified
    } else {
        LoanKycStatus::Pending
    }
}

/// Results waiting for a reviewer, oldest first.
pub fn pending_reviews(conn: &Connection) -> Result<Vec<VerificationResult>, DatabaseError> {
    repository::list_results_by_status(conn, VerificationStatus::OnHold)
}

/// Record a reviewer's final decision on an existing result.
///
/// Only the result row changes; applicant records are left as they are.
pub fn override_verification(
    conn: &Connection,
    loan_id: i64,
    kind: DocumentKind,
    status: VerificationStatus,
    note: &str,
) -> Result<VerificationResult, DatabaseError> {
    let result = repository::override_verification_status(conn, loan_id, kind, status, note)?;
    tracing::info!(
        loan_id,
        kind = %kind,
        status = %status,
        "Verification overridden by reviewer"
    );
    Ok(result)
}
