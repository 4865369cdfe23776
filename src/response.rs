//! Decoding of lookup responses into reputation records.

use crate::error::{Error, Result};
use crate::subject::SubjectType;
use serde::{Deserialize, Deserializer};

/// Decoded answer of the reputation service for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationRecord {
    /// Whether the service processed the query.
    pub success: bool,
    /// Error message reported by the service when `success` is false.
    pub error: Option<String>,
    /// Whether the subject is in the database at all.
    pub appears: bool,
    /// Number of spam reports on file.
    pub frequency: u64,
    /// Service's own certainty (0-100). None when not reported.
    pub confidence: Option<f64>,
}

impl ReputationRecord {
    /// Create a record for a successful lookup.
    pub fn found(appears: bool, frequency: u64) -> Self {
        Self {
            success: true,
            error: None,
            appears,
            frequency,
            confidence: None,
        }
    }

    /// Create a record for a query the service refused.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            appears: false,
            frequency: 0,
            confidence: None,
        }
    }

    /// Set the confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Lookup API response.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(deserialize_with = "flag")]
    success: bool,

    #[serde(default)]
    error: Option<String>,

    #[serde(default)]
    ip: Option<SubjectEntry>,

    #[serde(default)]
    email: Option<SubjectEntry>,

    #[serde(default)]
    username: Option<SubjectEntry>,
}

/// Per-subject section of the lookup response.
#[derive(Debug, Deserialize)]
struct SubjectEntry {
    #[serde(deserialize_with = "flag")]
    appears: bool,

    frequency: u64,

    #[serde(default)]
    confidence: Option<f64>,
}

/// The API reports booleans as 0/1; accept real booleans as well.
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

/// Parse a raw lookup response for the given subject type.
///
/// A successful response without a section for `subject_type` is an error,
/// not an absent verdict.
pub fn parse(raw: &[u8], subject_type: SubjectType) -> Result<ReputationRecord> {
    let response: LookupResponse = serde_json::from_slice(raw)?;

    if !response.success {
        return Ok(ReputationRecord::rejected(
            response
                .error
                .unwrap_or_else(|| "no error message given".to_string()),
        ));
    }

    let entry = match subject_type {
        SubjectType::Ip => response.ip,
        SubjectType::Email => response.email,
        SubjectType::Username => response.username,
    }
    .ok_or_else(|| Error::parse(format!("response has no '{subject_type}' section")))?;

    Ok(ReputationRecord {
        success: true,
        error: None,
        appears: entry.appears,
        frequency: entry.frequency,
        confidence: entry.confidence,
    })
}
