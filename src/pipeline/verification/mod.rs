//! KYC decision engine.
//!
//! Every verifier runs the same sequence for one (loan, document kind) key:
//! reset prior results, load the document row, extract fields, then the
//! completeness gate, the authenticity gate (PAN/Aadhaar), the cross-check
//! against the applicant record and the kind-specific policy gates. Each run
//! ends by persisting exactly one result.
//!
//! Hard failures (missing document or user, reference list I/O, database)
//! abort the run with a [`VerificationError`]. Everything else is a status.

pub mod checks;
pub mod locks;
pub mod summary;

pub use summary::*;

use std::time::{Duration, Instant};

use rusqlite::Connection;
use thiserror::Error;

use crate::config::VerifierConfig;
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::enums::{DocumentKind, VerificationStatus};
use crate::models::{
    AadhaarChecks, BankStatementChecks, CheckReport, Document, PanChecks, SalarySlipChecks,
    User, VerificationPayload, VerificationResult,
};
use crate::pipeline::extraction::fetch::HttpDocumentFetcher;
use crate::pipeline::extraction::ocr::OcrSpaceClient;
use crate::pipeline::extraction::pdf::PdfTextExtractor;
use crate::pipeline::extraction::text::{image_text, pdf_text};
use crate::pipeline::extraction::types::{DocumentFetcher, OcrEngine, PdfExtractor};
use crate::pipeline::extraction::ExtractionError;
use crate::pipeline::fields::{AadhaarFields, BankStatementFields, PanFields, SalarySlipFields};
use crate::pipeline::reference::{
    CachedReferenceList, CsvReferenceList, ReferenceError, ReferenceLookup,
};

use self::checks::{
    aadhaar_format_valid, average_rounded, dobs_match, last_four, mask_id, names_match,
    pan_format_valid,
};
use self::locks::KeyedLock;

pub const REASON_UNREADABLE: &str = "unreadable";
pub const REASON_INCOMPLETE: &str = "missing or unreadable fields";
pub const REASON_NOT_IN_REFERENCE: &str = "not found in reference list";
pub const REASON_MISMATCH: &str = "details do not match applicant record";
pub const REASON_DUPLICATE_PAN: &str = "PAN linked to another applicant";
pub const REASON_THIN_HISTORY: &str = "not enough salary credits";

/// Salary credits needed before an applicant counts as salaried.
pub const MIN_SALARY_CREDITS: usize = 2;

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("{kind} document not found for loan {loan_id}")]
    DocumentNotFound { loan_id: i64, kind: DocumentKind },

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Reference check failed: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Client setup failed: {0}")]
    ClientSetup(#[from] ExtractionError),

    #[error("Verification lock poisoned")]
    LockPoisoned,
}

/// Status and payload produced by one verifier before it is persisted.
struct Decision {
    status: VerificationStatus,
    payload: VerificationPayload,
    /// `(user_id, last four digits)` to record alongside a verified Aadhaar.
    aadhaar_update: Option<(i64, String)>,
}

impl Decision {
    fn early(status: VerificationStatus, reason: &str) -> Self {
        Self {
            status,
            payload: VerificationPayload::reason(reason),
            aadhaar_update: None,
        }
    }

    fn checked(status: VerificationStatus, report: CheckReport, reason: Option<&str>) -> Self {
        let payload = VerificationPayload::checks(report);
        Self {
            status,
            payload: match reason {
                Some(r) => payload.with_reason(r),
                None => payload,
            },
            aadhaar_update: None,
        }
    }
}

// ──────────────────────────────────────────────
// Verifier
// ──────────────────────────────────────────────

pub struct DocumentVerifier {
    fetcher: Box<dyn DocumentFetcher + Send + Sync>,
    ocr: Box<dyn OcrEngine + Send + Sync>,
    pdf: Box<dyn PdfExtractor + Send + Sync>,
    pan_registry: Box<dyn ReferenceLookup>,
    aadhaar_registry: Box<dyn ReferenceLookup>,
    locks: KeyedLock,
}

impl DocumentVerifier {
    pub fn new(
        fetcher: Box<dyn DocumentFetcher + Send + Sync>,
        ocr: Box<dyn OcrEngine + Send + Sync>,
        pdf: Box<dyn PdfExtractor + Send + Sync>,
        pan_registry: Box<dyn ReferenceLookup>,
        aadhaar_registry: Box<dyn ReferenceLookup>,
    ) -> Self {
        Self {
            fetcher,
            ocr,
            pdf,
            pan_registry,
            aadhaar_registry,
            locks: KeyedLock::new(),
        }
    }

    /// Verify the loan's document of `kind`.
    pub fn verify(
        &self,
        conn: &Connection,
        loan_id: i64,
        kind: DocumentKind,
    ) -> Result<VerificationResult, VerificationError> {
        match kind {
            DocumentKind::Pan => self.verify_pan(conn, loan_id),
            DocumentKind::Aadhaar => self.verify_aadhaar(conn, loan_id),
            DocumentKind::SalarySlip => self.verify_salary_slip(conn, loan_id),
            DocumentKind::BankStatement => self.verify_bank_statement(conn, loan_id),
        }
    }

    pub fn verify_pan(
        &self,
        conn: &Connection,
        loan_id: i64,
    ) -> Result<VerificationResult, VerificationError> {
        self.run(conn, loan_id, DocumentKind::Pan, |doc| self.decide_pan(conn, doc))
    }

    pub fn verify_aadhaar(
        &self,
        conn: &Connection,
        loan_id: i64,
    ) -> Result<VerificationResult, VerificationError> {
        self.run(conn, loan_id, DocumentKind::Aadhaar, |doc| {
            self.decide_aadhaar(conn, doc)
        })
    }

    pub fn verify_salary_slip(
        &self,
        conn: &Connection,
        loan_id: i64,
    ) -> Result<VerificationResult, VerificationError> {
        self.run(conn, loan_id, DocumentKind::SalarySlip, |doc| {
            self.decide_salary_slip(conn, doc)
        })
    }

    pub fn verify_bank_statement(
        &self,
        conn: &Connection,
        loan_id: i64,
    ) -> Result<VerificationResult, VerificationError> {
        self.run(conn, loan_id, DocumentKind::BankStatement, |doc| {
            self.decide_bank_statement(conn, doc)
        })
    }

    /// Shared frame: serialize on the key, reset, load, decide, persist.
    fn run<F>(
        &self,
        conn: &Connection,
        loan_id: i64,
        kind: DocumentKind,
        decide: F,
    ) -> Result<VerificationResult, VerificationError>
    where
        F: FnOnce(&Document) -> Result<Decision, VerificationError>,
    {
        let _span = tracing::info_span!("verify_document", loan_id, kind = %kind).entered();
        let start = Instant::now();
        let _guard = self.locks.acquire(loan_id, kind)?;

        let removed = repository::delete_verification_results(conn, loan_id, kind)?;
        if removed > 0 {
            tracing::debug!(removed, "Cleared previous verification results");
        }

        let document = repository::get_document_for_loan(conn, loan_id, kind)?
            .ok_or(VerificationError::DocumentNotFound { loan_id, kind })?;

        let decision = decide(&document)?;
        let result = VerificationResult::new(loan_id, kind, decision.status, decision.payload);

        // The applicant update and the result row commit together or not at all.
        let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;
        if let Some((user_id, last_4)) = &decision.aadhaar_update {
            repository::record_aadhaar_verification(&tx, *user_id, last_4)?;
            tracing::info!(user_id = *user_id, "Aadhaar recorded on applicant");
        }
        repository::write_verification_result(&tx, &result)?;
        tx.commit().map_err(DatabaseError::from)?;

        tracing::info!(
            status = %result.status,
            reason = result.reason().unwrap_or(""),
            elapsed_ms = %start.elapsed().as_millis(),
            "Verification complete"
        );
        Ok(result)
    }

    /// OCR text for an image-class document. Fetch and OCR failures yield "".
    fn document_text(&self, document: &Document) -> String {
        match self.fetcher.fetch(&document.file_url) {
            Ok(bytes) => {
                let text = image_text(self.ocr.as_ref(), self.pdf.as_ref(), &bytes);
                tracing::debug!(text_len = text.len(), "Document text extracted");
                text
            }
            Err(e) => {
                tracing::warn!(error = %e, "Document fetch failed, continuing with empty text");
                String::new()
            }
        }
    }

    fn applicant(&self, conn: &Connection, document: &Document) -> Result<User, VerificationError> {
        repository::get_user(conn, document.user_id)?
            .ok_or(VerificationError::UserNotFound(document.user_id))
    }

    // ── PAN ──────────────────────────────────────

    fn decide_pan(&self, conn: &Connection, document: &Document) -> Result<Decision, VerificationError> {
        let fields = PanFields::from_text(&self.document_text(document));
        let (Some(pan), Some(name), Some(dob)) = (fields.pan, fields.name, fields.dob) else {
            return Ok(Decision::early(
                VerificationStatus::ReuploadRequired,
                REASON_INCOMPLETE,
            ));
        };

        if !self.pan_registry.contains(&pan)? {
            tracing::warn!(pan = %mask_id(&pan), "PAN not in reference list");
            return Ok(Decision::early(
                VerificationStatus::Rejected,
                REASON_NOT_IN_REFERENCE,
            ));
        }

        let user = self.applicant(conn, document)?;
        let pan_format_valid = pan_format_valid(&pan);
        let name_match = names_match(&name, user.name.as_deref());
        let dob_match = dobs_match(&dob, user.dob.as_deref());
        let duplicate_pan = repository::find_other_user_with_pan(conn, &pan, user.id)?.is_some();

        let (status, reason) = if !(pan_format_valid && name_match && dob_match) {
            (VerificationStatus::ReuploadRequired, Some(REASON_MISMATCH))
        } else if duplicate_pan {
            tracing::warn!(pan = %mask_id(&pan), "PAN already linked to another user");
            (VerificationStatus::OnHold, Some(REASON_DUPLICATE_PAN))
        } else {
            (VerificationStatus::Verified, None)
        };

        let report = CheckReport::Pan(PanChecks {
            pan,
            pan_format_valid,
            name_match,
            dob_match,
            father_name: fields.father_name,
            duplicate_pan,
        });
        Ok(Decision::checked(status, report, reason))
    }

    // ── Aadhaar ──────────────────────────────────

    fn decide_aadhaar(
        &self,
        conn: &Connection,
        document: &Document,
    ) -> Result<Decision, VerificationError> {
        let fields = AadhaarFields::from_text(&self.document_text(document));
        let (Some(aadhaar), Some(name), Some(dob)) = (fields.aadhaar, fields.name, fields.dob)
        else {
            return Ok(Decision::early(
                VerificationStatus::ReuploadRequired,
                REASON_INCOMPLETE,
            ));
        };

        if !self.aadhaar_registry.contains(&aadhaar)? {
            tracing::warn!(aadhaar = %mask_id(&aadhaar), "Aadhaar not in reference list");
            return Ok(Decision::early(
                VerificationStatus::Rejected,
                REASON_NOT_IN_REFERENCE,
            ));
        }

        let user = self.applicant(conn, document)?;
        let aadhaar_format_valid = aadhaar_format_valid(&aadhaar);
        let name_match = names_match(&name, user.name.as_deref());
        let dob_match = dobs_match(&dob, user.dob.as_deref());
        let aadhaar_last_4 = last_four(&aadhaar);

        let passed = aadhaar_format_valid && name_match && dob_match;

        let report = CheckReport::Aadhaar(AadhaarChecks {
            aadhaar_last_4: aadhaar_last_4.clone(),
            aadhaar_format_valid,
            name_match,
            dob_match,
        });
        Ok(if passed {
            Decision {
                aadhaar_update: Some((user.id, aadhaar_last_4)),
                ..Decision::checked(VerificationStatus::Verified, report, None)
            }
        } else {
            Decision::checked(
                VerificationStatus::ReuploadRequired,
                report,
                Some(REASON_MISMATCH),
            )
        })
    }

    // ── Salary slip ──────────────────────────────

    fn decide_salary_slip(
        &self,
        conn: &Connection,
        document: &Document,
    ) -> Result<Decision, VerificationError> {
        let fields = SalarySlipFields::from_text(&self.document_text(document));
        let income = fields.monthly_income.filter(|v| *v > 0.0);
        let (Some(employee_name), Some(employer_name), Some(monthly_income)) =
            (fields.employee_name, fields.employer_name, income)
        else {
            return Ok(Decision::early(
                VerificationStatus::ReuploadRequired,
                REASON_INCOMPLETE,
            ));
        };

        let user = self.applicant(conn, document)?;
        let name_match = names_match(&employee_name, user.name.as_deref());

        let report = CheckReport::SalarySlip(SalarySlipChecks {
            employee_name,
            employer_name,
            designation: fields.designation,
            monthly_income,
            name_match,
        });
        Ok(if name_match {
            Decision::checked(VerificationStatus::Verified, report, None)
        } else {
            Decision::checked(
                VerificationStatus::ReuploadRequired,
                report,
                Some(REASON_MISMATCH),
            )
        })
    }

    // ── Bank statement ───────────────────────────

    fn decide_bank_statement(
        &self,
        conn: &Connection,
        document: &Document,
    ) -> Result<Decision, VerificationError> {
        let text = match self
            .fetcher
            .fetch(&document.file_url)
            .and_then(|bytes| pdf_text(self.pdf.as_ref(), &bytes))
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Bank statement unreadable");
                return Ok(Decision::early(
                    VerificationStatus::ReuploadRequired,
                    REASON_UNREADABLE,
                ));
            }
        };

        let fields = BankStatementFields::from_text(&text);
        let Some(account_holder_name) = fields.account_holder_name else {
            return Ok(Decision::early(
                VerificationStatus::ReuploadRequired,
                REASON_INCOMPLETE,
            ));
        };
        if fields.salary_credits.is_empty() {
            return Ok(Decision::early(
                VerificationStatus::ReuploadRequired,
                REASON_INCOMPLETE,
            ));
        }

        let user = self.applicant(conn, document)?;
        let name_match = names_match(&account_holder_name, user.name.as_deref());
        let salaried = fields.salary_credits.len() >= MIN_SALARY_CREDITS;
        let average_salary = average_rounded(&fields.salary_credits);
        tracing::debug!(
            credits = fields.salary_credits.len(),
            average_salary,
            "Salary credits found"
        );

        let (status, reason) = if !name_match {
            (VerificationStatus::ReuploadRequired, Some(REASON_MISMATCH))
        } else if !salaried {
            (VerificationStatus::OnHold, Some(REASON_THIN_HISTORY))
        } else {
            (VerificationStatus::Verified, None)
        };

        let report = CheckReport::BankStatement(BankStatementChecks {
            account_holder_name,
            salary_credits: fields.salary_credits,
            average_salary,
            salaried,
            name_match,
        });
        Ok(Decision::checked(status, report, reason))
    }
}

// ──────────────────────────────────────────────
// Factory
// ──────────────────────────────────────────────

/// Wire the production fetcher, OCR client, PDF reader and cached reference lists.
pub fn build_verifier(config: &VerifierConfig) -> Result<DocumentVerifier, VerificationError> {
    let fetcher = HttpDocumentFetcher::new(config.http_timeout_secs)?;
    let ocr = OcrSpaceClient::new(
        &config.ocr_endpoint,
        &config.ocr_api_key,
        &config.ocr_language,
        config.http_timeout_secs,
    )?;
    let refresh = Duration::from_secs(config.reference_refresh_secs);
    let pan_registry =
        CachedReferenceList::new(CsvReferenceList::pan(&config.pan_reference), refresh);
    let aadhaar_registry =
        CachedReferenceList::new(CsvReferenceList::aadhaar(&config.aadhaar_reference), refresh);

    tracing::info!(
        ocr_endpoint = %config.ocr_endpoint,
        pan_reference = %config.pan_reference.display(),
        aadhaar_reference = %config.aadhaar_reference.display(),
        "Document verifier configured"
    );

    Ok(DocumentVerifier::new(
        Box::new(fetcher),
        Box::new(ocr),
        Box::new(PdfTextExtractor),
        Box::new(pan_registry),
        Box::new(aadhaar_registry),
    ))
}
