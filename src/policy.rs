//! Spam classification policy.

use crate::error::{Error, Result};
use crate::response::ReputationRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Named frequency thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPreset {
    /// A single report is enough.
    #[default]
    Strict,
    High,
    Medium,
    /// Only heavily reported subjects.
    Low,
}

impl ThresholdPreset {
    /// Number of reports at which a subject counts as spam.
    pub fn frequency(&self) -> u32 {
        match self {
            ThresholdPreset::Strict => 1,
            ThresholdPreset::High => 3,
            ThresholdPreset::Medium => 5,
            ThresholdPreset::Low => 10,
        }
    }
}

impl FromStr for ThresholdPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ThresholdPreset::Strict),
            "high" => Ok(ThresholdPreset::High),
            "medium" => Ok(ThresholdPreset::Medium),
            "low" => Ok(ThresholdPreset::Low),
            other => Err(Error::invalid_argument(format!(
                "unknown threshold preset '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ThresholdPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThresholdPreset::Strict => "strict",
            ThresholdPreset::High => "high",
            ThresholdPreset::Medium => "medium",
            ThresholdPreset::Low => "low",
        };
        f.write_str(name)
    }
}

/// Thresholds a reputation record is measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationPolicy {
    frequency_threshold: u32,
    confidence_threshold: Option<f64>,
}

impl ClassificationPolicy {
    /// Create a policy with a frequency threshold and no confidence threshold.
    pub fn new(frequency_threshold: u32) -> Result<Self> {
        check_frequency(frequency_threshold)?;
        Ok(Self {
            frequency_threshold,
            confidence_threshold: None,
        })
    }

    /// Create a policy from a preset.
    pub fn from_preset(preset: ThresholdPreset) -> Self {
        Self {
            frequency_threshold: preset.frequency(),
            confidence_threshold: None,
        }
    }

    /// Require a minimum confidence in addition to the frequency.
    pub fn with_confidence_threshold(mut self, confidence: f64) -> Result<Self> {
        self.set_confidence_threshold(Some(confidence))?;
        Ok(self)
    }

    pub fn frequency_threshold(&self) -> u32 {
        self.frequency_threshold
    }

    pub fn confidence_threshold(&self) -> Option<f64> {
        self.confidence_threshold
    }

    /// Change the frequency threshold. Zero is rejected.
    pub fn set_frequency_threshold(&mut self, threshold: u32) -> Result<()> {
        check_frequency(threshold)?;
        self.frequency_threshold = threshold;
        Ok(())
    }

    /// Change or clear the confidence threshold. Must lie within 0-100.
    pub fn set_confidence_threshold(&mut self, threshold: Option<f64>) -> Result<()> {
        if let Some(c) = threshold {
            check_confidence(c)?;
        }
        self.confidence_threshold = threshold;
        Ok(())
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::from_preset(ThresholdPreset::default())
    }
}

pub(crate) fn check_frequency(threshold: u32) -> Result<()> {
    if threshold == 0 {
        return Err(Error::invalid_argument(
            "frequency threshold must be at least 1",
        ));
    }
    Ok(())
}

pub(crate) fn check_confidence(threshold: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&threshold) {
        return Err(Error::invalid_argument(format!(
            "confidence threshold ({threshold}) must be within 0-100"
        )));
    }
    Ok(())
}

/// Decide whether a record marks its subject as spam.
pub fn classify(record: &ReputationRecord, policy: &ClassificationPolicy) -> Result<bool> {
    if !record.success {
        let message = record
            .error
            .clone()
            .unwrap_or_else(|| "no error message given".to_string());
        return Err(Error::RemoteRejected(message));
    }

    if !record.appears {
        return Ok(false);
    }

    if record.frequency < u64::from(policy.frequency_threshold) {
        return Ok(false);
    }

    let spam = match policy.confidence_threshold {
        None => true,
        Some(min) => record.confidence.is_some_and(|c| c >= min),
    };

    debug!(
        frequency = record.frequency,
        confidence = ?record.confidence,
        spam = spam,
        "Frequency threshold reached"
    );

    Ok(spam)
}
