//! Declarative field tables: label pattern → field name → normalizer.
//!
//! Adding a document kind or a locale variant means adding rows here, not a
//! new extraction function.

use std::collections::BTreeMap;

use regex::Regex;

/// How many matches a field keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// First match of the first pattern that matches at all.
    First,
    /// Every match of every pattern, in document order per pattern.
    All,
}

/// Cleanup applied to a raw capture. A capture that normalizes to `None` is
/// treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    Trim,
    /// Drop all whitespace (grouped identity numbers).
    StripWhitespace,
    /// Drop thousands separators and require a parseable number.
    Amount,
}

impl Normalize {
    fn apply(&self, raw: &str) -> Option<String> {
        let value = match self {
            Self::Trim => raw.trim().to_string(),
            Self::StripWhitespace => raw.chars().filter(|c| !c.is_whitespace()).collect(),
            Self::Amount => {
                let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok()?;
                cleaned
            }
        };
        (!value.is_empty()).then_some(value)
    }
}

/// One extractable field.
pub struct FieldSpec {
    pub name: &'static str,
    /// Tried in order. The value is capture group 1, or the whole match when
    /// the pattern has no group.
    patterns: Vec<Regex>,
    normalize: Normalize,
    capture: Capture,
}

impl FieldSpec {
    pub fn first(name: &'static str, patterns: &[&str], normalize: Normalize) -> Self {
        Self::build(name, patterns, normalize, Capture::First)
    }

    pub fn all(name: &'static str, patterns: &[&str], normalize: Normalize) -> Self {
        Self::build(name, patterns, normalize, Capture::All)
    }

    fn build(name: &'static str, patterns: &[&str], normalize: Normalize, capture: Capture) -> Self {
        Self {
            name,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("Invalid field regex pattern"))
                .collect(),
            normalize,
            capture,
        }
    }

    fn extract(&self, text: &str) -> Vec<String> {
        let mut values = Vec::new();
        for pattern in &self.patterns {
            for caps in pattern.captures_iter(text) {
                let raw = caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str());
                if let Some(value) = raw.and_then(|r| self.normalize.apply(r)) {
                    values.push(value);
                    if self.capture == Capture::First {
                        return values;
                    }
                }
            }
        }
        values
    }
}

/// Field values pulled out of one document's text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    values: BTreeMap<&'static str, Vec<String>>,
}

impl ExtractedFields {
    pub fn first(&self, field: &str) -> Option<String> {
        self.values.get(field).and_then(|v| v.first()).cloned()
    }

    pub fn all(&self, field: &str) -> &[String] {
        self.values.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn amount(&self, field: &str) -> Option<f64> {
        self.first(field).and_then(|v| v.parse().ok())
    }

    pub fn amounts(&self, field: &str) -> Vec<f64> {
        self.all(field).iter().filter_map(|v| v.parse().ok()).collect()
    }
}

/// Run every field of a table over `text`. Missing fields are simply absent.
pub fn extract_fields(specs: &[FieldSpec], text: &str) -> ExtractedFields {
    let values = specs
        .iter()
        .filter_map(|spec| {
            let found = spec.extract(text);
            (!found.is_empty()).then_some((spec.name, found))
        })
        .collect();
    ExtractedFields { values }
}
