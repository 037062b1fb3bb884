use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(DocumentKind {
    Pan => "PAN",
    Aadhaar => "AADHAAR",
    SalarySlip => "SALARY_SLIP",
    BankStatement => "BANK_STATEMENT",
});

impl DocumentKind {
    /// Every kind a loan application must clear.
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Pan,
        DocumentKind::Aadhaar,
        DocumentKind::SalarySlip,
        DocumentKind::BankStatement,
    ];
}

str_enum!(DocumentStatus {
    Uploaded => "UPLOADED",
    Generated => "GENERATED",
    Failed => "FAILED",
});

str_enum!(VerificationStatus {
    Verified => "VERIFIED",
    ReuploadRequired => "REUPLOAD_REQUIRED",
    Rejected => "REJECTED",
    OnHold => "ON_HOLD",
});

str_enum!(LoanKycStatus {
    Pending => "PENDING",
    Verified => "VERIFIED",
    ActionRequired => "ACTION_REQUIRED",
    UnderReview => "UNDER_REVIEW",
    Rejected => "REJECTED",
});
