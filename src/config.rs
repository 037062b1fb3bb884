use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pipeline::extraction::ocr::DEFAULT_OCR_ENDPOINT;

/// Application-level constants
pub const APP_NAME: &str = "NbfcKyc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REFERENCE_REFRESH_SECS: u64 = 300;

/// Get the application data directory
/// `<platform data dir>/NbfcKyc/`, falling back to the working directory
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default tracing filter when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "nbfc_kyc_lib=debug,warn"
    } else {
        "nbfc_kyc_lib=info,warn"
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Everything needed to wire a production verifier.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub db_path: PathBuf,
    pub ocr_endpoint: String,
    pub ocr_api_key: String,
    pub ocr_language: String,
    /// Applies to document downloads and OCR calls alike.
    pub http_timeout_secs: u64,
    pub pan_reference: PathBuf,
    pub aadhaar_reference: PathBuf,
    pub reference_refresh_secs: u64,
}

impl VerifierConfig {
    /// Defaults rooted at `data_dir`.
    pub fn for_data_dir(data_dir: &Path, ocr_api_key: &str) -> Self {
        Self {
            db_path: data_dir.join("kyc.db"),
            ocr_endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            ocr_api_key: ocr_api_key.to_string(),
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            pan_reference: data_dir.join("reference").join("original_pans.csv"),
            aadhaar_reference: data_dir.join("reference").join("original_aadhaars.csv"),
            reference_refresh_secs: DEFAULT_REFERENCE_REFRESH_SECS,
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OCR_API_KEY").ok_or(ConfigError::Missing("OCR_API_KEY"))?;
        let mut config = Self::for_data_dir(&app_data_dir(), &api_key);

        if let Some(path) = get("KYC_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(url) = get("OCR_API_URL") {
            config.ocr_endpoint = url;
        }
        if let Some(language) = get("OCR_LANGUAGE") {
            config.ocr_language = language;
        }
        if let Some(path) = get("KYC_PAN_REFERENCE") {
            config.pan_reference = PathBuf::from(path);
        }
        if let Some(path) = get("KYC_AADHAAR_REFERENCE") {
            config.aadhaar_reference = PathBuf::from(path);
        }
        if let Some(raw) = get("KYC_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = parse_secs("KYC_HTTP_TIMEOUT_SECS", &raw, 1)?;
        }
        if let Some(raw) = get("KYC_REFERENCE_REFRESH_SECS") {
            config.reference_refresh_secs = parse_secs("KYC_REFERENCE_REFRESH_SECS", &raw, 0)?;
        }

        Ok(config)
    }
}

/// Whole seconds, at least `min`. A refresh interval of 0 reloads on every lookup.
fn parse_secs(key: &'static str, raw: &str, min: u64) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs >= min => Ok(secs),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}
