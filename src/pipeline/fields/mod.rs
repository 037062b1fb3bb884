//! Per-document field extraction from OCR or PDF text.
//!
//! Extraction never fails: a label that is not found leaves the field `None`
//! and the decision engine treats that as an incomplete document.

pub mod spec;

use std::sync::LazyLock;

pub use spec::*;

use crate::models::enums::DocumentKind;

pub const PAN_NUMBER_PATTERN: &str = r"\b[A-Z]{5}[0-9]{4}[A-Z]\b";

// Labels anchored to line start so "Father's Name" or "Account Holder Name"
// never satisfy a plain "Name" label. `\s*` after the label lets the value sit
// on the following line, as it does on printed PAN cards.
const NAME_LABEL: &str = r"(?im)^\s*Name\s*:?\s*(.+)$";

static PAN_FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        FieldSpec::first("pan", &[PAN_NUMBER_PATTERN], Normalize::Trim),
        FieldSpec::first("name", &[NAME_LABEL], Normalize::Trim),
        FieldSpec::first(
            "dob",
            &[r"(?i)(?:Date\s*of\s*Birth|DOB)\s*:?\s*(.+)"],
            Normalize::Trim,
        ),
        FieldSpec::first(
            "father_name",
            &[r"(?i)Father(?:['’]s)?\s*Name\s*:?\s*(.+)"],
            Normalize::Trim,
        ),
    ]
});

static AADHAAR_FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        FieldSpec::first(
            "aadhaar",
            &[r"\b[0-9]{4} ?[0-9]{4} ?[0-9]{4}\b"],
            Normalize::StripWhitespace,
        ),
        FieldSpec::first("name", &[NAME_LABEL], Normalize::Trim),
        FieldSpec::first(
            "dob",
            &[r"(?i)(?:Date\s*of\s*Birth|DOB|Year\s*of\s*Birth|YOB)\s*:?\s*([0-9]{2}[/\-.][0-9]{2}[/\-.][0-9]{4}|[0-9]{4})"],
            Normalize::Trim,
        ),
    ]
});

static SALARY_SLIP_FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        FieldSpec::first(
            "employee_name",
            &[r"(?im)^\s*(?:Employee\s*)?Name\s*:?\s*(.+)$"],
            Normalize::Trim,
        ),
        FieldSpec::first(
            "employer_name",
            &[r"(?im)^\s*Employer(?:\s*Name)?\s*:?\s*(.+)$"],
            Normalize::Trim,
        ),
        FieldSpec::first(
            "designation",
            &[r"(?im)^\s*Designation\s*:?\s*(.+)$"],
            Normalize::Trim,
        ),
        // Net figures outrank a bare "Salary" label anywhere on the slip.
        FieldSpec::first(
            "monthly_income",
            &[
                r"(?i)Net\s*(?:Pay|Salary)\s*:?\s*(?:₹|Rs\.?|INR)?\s*([0-9][0-9,]*)",
                r"(?i)Salary\s*:?\s*(?:₹|Rs\.?|INR)?\s*([0-9][0-9,]*)",
            ],
            Normalize::Amount,
        ),
    ]
});

static BANK_STATEMENT_FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    vec![
        FieldSpec::first(
            "account_holder_name",
            &[
                r"(?im)Account\s*Holder\s*Name\s*:?\s*(.+)$",
                r"(?im)Customer\s*Name\s*:?\s*(.+)$",
            ],
            Normalize::Trim,
        ),
        // First amount after the keyword on the same line: grouped thousands,
        // two decimals, or at least five bare digits, starting after a
        // separator. Four-digit tokens are years in narrations ("JAN 2024").
        FieldSpec::all(
            "salary_credits",
            &[r"(?:SALARY|Salary|PAYROLL|Payroll)[^\n]*?[ \t₹:](?:Rs\.?\s*|INR\s*)?([0-9]{1,3}(?:,[0-9]{2,3})+(?:\.[0-9]{1,2})?|[0-9]+\.[0-9]{2}|[0-9]{5,})\b"],
            Normalize::Amount,
        ),
    ]
});

/// Field table for a document kind.
pub fn field_specs(kind: DocumentKind) -> &'static [FieldSpec] {
    match kind {
        DocumentKind::Pan => &PAN_FIELDS,
        DocumentKind::Aadhaar => &AADHAAR_FIELDS,
        DocumentKind::SalarySlip => &SALARY_SLIP_FIELDS,
        DocumentKind::BankStatement => &BANK_STATEMENT_FIELDS,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanFields {
    pub pan: Option<String>,
    pub name: Option<String>,
    pub dob: Option<String>,
    pub father_name: Option<String>,
}

impl PanFields {
    pub fn from_text(text: &str) -> Self {
        let f = extract_fields(field_specs(DocumentKind::Pan), text);
        Self {
            pan: f.first("pan"),
            name: f.first("name"),
            dob: f.first("dob"),
            father_name: f.first("father_name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AadhaarFields {
    /// Whitespace-free 12-digit number.
    pub aadhaar: Option<String>,
    pub name: Option<String>,
    pub dob: Option<String>,
}

impl AadhaarFields {
    pub fn from_text(text: &str) -> Self {
        let f = extract_fields(field_specs(DocumentKind::Aadhaar), text);
        Self {
            aadhaar: f.first("aadhaar"),
            name: f.first("name"),
            dob: f.first("dob"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalarySlipFields {
    pub employee_name: Option<String>,
    pub employer_name: Option<String>,
    pub designation: Option<String>,
    pub monthly_income: Option<f64>,
}

impl SalarySlipFields {
    pub fn from_text(text: &str) -> Self {
        let f = extract_fields(field_specs(DocumentKind::SalarySlip), text);
        Self {
            employee_name: f.first("employee_name"),
            employer_name: f.first("employer_name"),
            designation: f.first("designation"),
            monthly_income: f.amount("monthly_income"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BankStatementFields {
    pub account_holder_name: Option<String>,
    pub salary_credits: Vec<f64>,
}

impl BankStatementFields {
    pub fn from_text(text: &str) -> Self {
        let f = extract_fields(field_specs(DocumentKind::BankStatement), text);
        Self {
            account_holder_name: f.first("account_holder_name"),
            salary_credits: f.amounts("salary_credits"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_card_fields() {
        let text = "INCOME TAX DEPARTMENT\r\nGOVT. OF INDIA\r\n\
                    Permanent Account Number Card\r\nABCDE1234F\r\n\
                    Name: PREETI NEGI\r\nFather's Name: XYZ NEGI\r\n\
                    Date of Birth: 12/08/1975\r\n";
        let fields = PanFields::from_text(text);
        assert_eq!(fields.pan.as_deref(), Some("ABCDE1234F"));
        assert_eq!(fields.name.as_deref(), Some("PREETI NEGI"));
        assert_eq!(fields.father_name.as_deref(), Some("XYZ NEGI"));
        assert_eq!(fields.dob.as_deref(), Some("12/08/1975"));
    }

    #[test]
    fn pan_name_on_line_after_label() {
        let text = "Name\nPREETI NEGI\nFather's Name\nXYZ NEGI\nDate of Birth\n12/08/1975\nABCDE1234F";
        let fields = PanFields::from_text(text);
        assert_eq!(fields.name.as_deref(), Some("PREETI NEGI"));
        assert_eq!(fields.dob.as_deref(), Some("12/08/1975"));
    }

    #[test]
    fn father_name_line_is_not_taken_as_name() {
        let text = "Father's Name: XYZ NEGI\nName: PREETI NEGI\nDOB: 12/08/1975";
        let fields = PanFields::from_text(text);
        assert_eq!(fields.name.as_deref(), Some("PREETI NEGI"));
    }

    #[test]
    fn lowercase_pan_is_not_a_pan() {
        let fields = PanFields::from_text("pan abcde1234f");
        assert!(fields.pan.is_none());
    }

    #[test]
    fn blurry_pan_leaves_fields_empty() {
        let fields = PanFields::from_text("INCOME TAX DEPARTMENT ~~ ##");
        assert_eq!(
            fields,
            PanFields {
                pan: None,
                name: None,
                dob: None,
                father_name: None
            }
        );
    }

    #[test]
    fn aadhaar_number_is_normalized() {
        let text = "Government of India\nName: Preeti Negi\nDOB: 12/08/1975\nFEMALE\n1234 5678 9012";
        let fields = AadhaarFields::from_text(text);
        assert_eq!(fields.aadhaar.as_deref(), Some("123456789012"));
        assert_eq!(fields.name.as_deref(), Some("Preeti Negi"));
        assert_eq!(fields.dob.as_deref(), Some("12/08/1975"));
    }

    #[test]
    fn aadhaar_year_of_birth_variant() {
        let text = "Name: Preeti Negi\nYear of Birth : 1975\n123456789012";
        let fields = AadhaarFields::from_text(text);
        assert_eq!(fields.dob.as_deref(), Some("1975"));
        assert_eq!(fields.aadhaar.as_deref(), Some("123456789012"));
    }

    #[test]
    fn aadhaar_dob_accepts_dashes_and_dots() {
        assert_eq!(
            AadhaarFields::from_text("DOB: 12-08-1975").dob.as_deref(),
            Some("12-08-1975")
        );
        assert_eq!(
            AadhaarFields::from_text("Date of Birth 12.08.1975").dob.as_deref(),
            Some("12.08.1975")
        );
    }

    #[test]
    fn salary_slip_fields() {
        let text = "ACME FINSERV PVT LTD\nSalary Slip for March 2024\n\
                    Employee Name: Preeti Negi\nEmployer: Acme Finserv Pvt Ltd\n\
                    Designation: Senior Analyst\nBasic Salary: 40,000\nNet Pay: ₹ 85,000\n";
        let fields = SalarySlipFields::from_text(text);
        assert_eq!(fields.employee_name.as_deref(), Some("Preeti Negi"));
        assert_eq!(fields.employer_name.as_deref(), Some("Acme Finserv Pvt Ltd"));
        assert_eq!(fields.designation.as_deref(), Some("Senior Analyst"));
        assert_eq!(fields.monthly_income, Some(85000.0));
    }

    #[test]
    fn salary_label_used_when_no_net_figure() {
        let fields = SalarySlipFields::from_text("Name: Preeti Negi\nSalary: 52,500");
        assert_eq!(fields.monthly_income, Some(52500.0));
    }

    #[test]
    fn bank_statement_collects_every_salary_credit() {
        let text = "Account Holder Name: Preeti Negi\n\
                    05/01/2024 NEFT-SALARY-ACME CORP 85,000.00 1,25,000.00\n\
                    10/01/2024 UPI-GROCERY 2,340.00 1,22,660.00\n\
                    05/02/2024 NEFT-SALARY-ACME CORP 85,000.00 2,05,000.00\n\
                    05/03/2024 PAYROLL ACME CORP 87,500.00 2,90,000.00\n";
        let fields = BankStatementFields::from_text(text);
        assert_eq!(fields.account_holder_name.as_deref(), Some("Preeti Negi"));
        assert_eq!(fields.salary_credits, vec![85000.0, 85000.0, 87500.0]);
    }

    #[test]
    fn customer_name_is_fallback_label() {
        let fields = BankStatementFields::from_text("Customer Name : Preeti Negi\n");
        assert_eq!(fields.account_holder_name.as_deref(), Some("Preeti Negi"));
        assert!(fields.salary_credits.is_empty());
    }

    #[test]
    fn month_year_in_narration_is_not_a_credit() {
        let text = "Account Holder Name: Preeti Negi\n\
                    05/01/2024 NEFT SALARY JAN 2024 85,000.00 1,25,000.00\n\
                    05/02/2024 NEFT SALARY FEB 2024 85,000.00 2,10,000.00\n\
                    05/03/2024 SALARY FOR MAR 2024 86500 2,96,500.00\n";
        let fields = BankStatementFields::from_text(text);
        assert_eq!(fields.salary_credits, vec![85000.0, 85000.0, 86500.0]);
    }

    #[test]
    fn salary_reference_codes_glued_to_words_are_ignored() {
        let fields = BankStatementFields::from_text("SALARY ACME2024 ₹85,000");
        assert_eq!(fields.salary_credits, vec![85000.0]);
    }
}
