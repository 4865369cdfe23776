//! Spam protection client.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::policy::{classify, ClassificationPolicy, ThresholdPreset};
use crate::query::{build_lookup_url, build_report_url, ReportSubmission, DEFAULT_API_URL, DEFAULT_REPORT_URL};
use crate::response::parse;
use crate::subject::{validate, Subject, SubjectType};
use crate::transport::{HttpTransport, Transport, DEFAULT_TIMEOUT_MS};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Text the report endpoint answers with when a submission is accepted.
pub const SUBMISSION_SUCCESS_MARKER: &str = "data submitted successfully";

/// Client for the StopForumSpam lookup and report APIs.
///
/// Every check or report is a single request. Settings changed through the
/// setters apply to the next call; they need `&mut self`, so a client shared
/// between tasks is read-only.
pub struct SpamProtection {
    base_url: String,
    report_url: String,
    api_key: Option<String>,
    allow_tor_nodes: bool,
    policy: ClassificationPolicy,
    timeout: Duration,
    transport: Arc<dyn Transport>,
}

impl SpamProtection {
    /// Create a client with default settings and an HTTP transport.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> SpamProtectionBuilder {
        SpamProtectionBuilder::default()
    }

    /// Create a client from a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut builder = Self::builder()
            .base_url(&config.api.base_url)
            .report_url(&config.api.report_url)
            .allow_tor_nodes(config.tor.allow_tor_nodes)
            .policy(config.policy()?)
            .timeout(Duration::from_millis(config.api.timeout_ms));

        if !config.api.api_key.is_empty() {
            builder = builder.api_key(&config.api.api_key);
        }

        builder.build()
    }

    /// Check a subject given its type name (`ip`, `email` or `username`).
    ///
    /// Returns true if the subject should be treated as spam.
    pub async fn check(&self, subject_type: &str, value: &str) -> Result<bool> {
        let subject = validate(subject_type, Some(value))?;
        self.check_subject(&subject).await
    }

    /// Check an already validated subject.
    pub async fn check_subject(&self, subject: &Subject) -> Result<bool> {
        let url = build_lookup_url(
            &self.base_url,
            subject.subject_type,
            &subject.value,
            self.allow_tor_nodes,
        );

        debug!(
            subject_type = %subject.subject_type,
            allow_tor = self.allow_tor_nodes,
            "Querying StopForumSpam"
        );

        let raw = self.transport.send(&url, Some(self.timeout)).await?;
        let record = parse(&raw, subject.subject_type)?;

        if !record.success {
            warn!(
                subject_type = %subject.subject_type,
                error = ?record.error,
                "StopForumSpam rejected the query"
            );
        }

        let spam = classify(&record, &self.policy)?;

        debug!(
            subject_type = %subject.subject_type,
            appears = record.appears,
            frequency = record.frequency,
            spam = spam,
            "StopForumSpam lookup complete"
        );

        Ok(spam)
    }

    pub async fn check_ip(&self, ip: &str) -> Result<bool> {
        self.check_subject(&Subject::new(SubjectType::Ip, ip)).await
    }

    pub async fn check_email(&self, email: &str) -> Result<bool> {
        self.check_subject(&Subject::new(SubjectType::Email, email)).await
    }

    pub async fn check_username(&self, username: &str) -> Result<bool> {
        self.check_subject(&Subject::new(SubjectType::Username, username))
            .await
    }

    /// Submit a spam report.
    ///
    /// `evidence` is usually the original message including all headers.
    /// Requires an API key. Succeeds only when the service confirms the
    /// submission; a transport failure is reported as a failed submission.
    pub async fn submit_report(
        &self,
        username: &str,
        ip: &str,
        evidence: &str,
        email: &str,
    ) -> Result<()> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingApiKey)?;

        let report = ReportSubmission {
            username: username.to_string(),
            ip: ip.to_string(),
            evidence: evidence.to_string(),
            email: email.to_string(),
            api_key: api_key.to_string(),
        };
        let url = build_report_url(&self.report_url, &report)?;

        debug!(ip = %ip, "Submitting spam report");

        let body = match self.transport.send(&url, Some(self.timeout)).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Spam report request failed");
                return Err(Error::SubmissionFailed(e.to_string()));
            }
        };

        if String::from_utf8_lossy(&body).contains(SUBMISSION_SUCCESS_MARKER) {
            info!(ip = %ip, "Spam report submitted");
            Ok(())
        } else {
            warn!("Report endpoint did not confirm the submission");
            Err(Error::SubmissionFailed(
                "response did not confirm the submission".to_string(),
            ))
        }
    }

    pub fn allow_tor_nodes(&self) -> bool {
        self.allow_tor_nodes
    }

    pub fn set_allow_tor_nodes(&mut self, allow: bool) {
        self.allow_tor_nodes = allow;
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = Some(api_key.into());
    }

    pub fn frequency_threshold(&self) -> u32 {
        self.policy.frequency_threshold()
    }

    /// Change the frequency threshold. Zero is rejected.
    pub fn set_frequency_threshold(&mut self, threshold: u32) -> Result<()> {
        self.policy.set_frequency_threshold(threshold)
    }

    pub fn confidence_threshold(&self) -> Option<f64> {
        self.policy.confidence_threshold()
    }

    pub fn set_confidence_threshold(&mut self, threshold: Option<f64>) -> Result<()> {
        self.policy.set_confidence_threshold(threshold)
    }

    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }
}

/// Builder for [`SpamProtection`].
pub struct SpamProtectionBuilder {
    base_url: String,
    report_url: String,
    api_key: Option<String>,
    allow_tor_nodes: bool,
    frequency_threshold: u32,
    confidence_threshold: Option<f64>,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for SpamProtectionBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            report_url: DEFAULT_REPORT_URL.to_string(),
            api_key: None,
            allow_tor_nodes: false,
            frequency_threshold: ThresholdPreset::default().frequency(),
            confidence_threshold: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            transport: None,
        }
    }
}

impl SpamProtectionBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn report_url(mut self, url: impl Into<String>) -> Self {
        self.report_url = url.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn allow_tor_nodes(mut self, allow: bool) -> Self {
        self.allow_tor_nodes = allow;
        self
    }

    pub fn frequency_threshold(mut self, threshold: u32) -> Self {
        self.frequency_threshold = threshold;
        self
    }

    pub fn threshold_preset(mut self, preset: ThresholdPreset) -> Self {
        self.frequency_threshold = preset.frequency();
        self
    }

    pub fn confidence_threshold(mut self, confidence: f64) -> Self {
        self.confidence_threshold = Some(confidence);
        self
    }

    /// Take both thresholds from an existing policy.
    pub fn policy(mut self, policy: ClassificationPolicy) -> Self {
        self.frequency_threshold = policy.frequency_threshold();
        self.confidence_threshold = policy.confidence_threshold();
        self
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom transport instead of the default HTTP one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Send requests through a preconfigured reqwest client (proxy, TLS, ...).
    ///
    /// The client's own timeout still applies alongside the per-request one.
    pub fn http_client(self, client: reqwest::Client) -> Self {
        self.transport(Arc::new(HttpTransport::with_client(client)))
    }

    /// Validate the settings and build the client.
    pub fn build(self) -> Result<SpamProtection> {
        let mut policy = ClassificationPolicy::new(self.frequency_threshold)?;
        policy.set_confidence_threshold(self.confidence_threshold)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.timeout)?),
        };

        Ok(SpamProtection {
            base_url: self.base_url,
            report_url: self.report_url,
            api_key: self.api_key,
            allow_tor_nodes: self.allow_tor_nodes,
            policy,
            timeout: self.timeout,
            transport,
        })
    }
}
