//! Construction of lookup and report URLs.

use crate::error::{Error, Result};
use crate::subject::SubjectType;
use urlencoding::encode;

/// Default lookup endpoint.
pub const DEFAULT_API_URL: &str = "http://api.stopforumspam.org/api";

/// Default report submission endpoint.
pub const DEFAULT_REPORT_URL: &str = "http://www.stopforumspam.com/add.php";

/// A spam report to send to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSubmission {
    pub username: String,
    pub ip: String,
    /// Free-form evidence, typically the original message with all headers.
    pub evidence: String,
    pub email: String,
    pub api_key: String,
}

/// Build the lookup URL for a single subject.
///
/// `&notorexit` asks the service to keep treating Tor exit nodes as spam
/// sources, so it is only added when Tor nodes are not allowed.
pub fn build_lookup_url(
    base: &str,
    subject_type: SubjectType,
    value: &str,
    allow_tor_nodes: bool,
) -> String {
    let mut url = format!("{}?{}={}", base, subject_type.as_str(), encode(value));

    if !allow_tor_nodes {
        url.push_str("&notorexit");
    }

    url.push_str("&f=json");
    url
}

/// Build the report submission URL.
///
/// Fails before producing anything if the API key is empty.
pub fn build_report_url(base: &str, report: &ReportSubmission) -> Result<String> {
    if report.api_key.is_empty() {
        return Err(Error::MissingApiKey);
    }

    Ok(format!(
        "{}?username={}&ip_addr={}&evidence={}&email={}&api_key={}",
        base,
        encode(&report.username),
        encode(&report.ip),
        encode(&report.evidence),
        encode(&report.email),
        encode(&report.api_key),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Decode the value of query parameter `name` from a built URL.
    fn query_param(url: &str, name: &str) -> Option<String> {
        let (_, query) = url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| urlencoding::decode(value).unwrap().into_owned())
    }

    fn report(api_key: &str) -> ReportSubmission {
        ReportSubmission {
            username: "spammer".to_string(),
            ip: "1.2.3.4".to_string(),
            evidence: "Received: from mx.example.com\r\nSubject: cheap pills & more\n\nbuy=now".to_string(),
            email: "spam@example.com".to_string(),
            api_key: api_key.to_string(),
        }
    }

    #[test]
    fn test_lookup_url_email_without_tor() {
        assert_eq!(
            build_lookup_url("http://x/api", SubjectType::Email, "a@b.com", false),
            "http://x/api?email=a%40b.com&notorexit&f=json"
        );
    }

    #[test]
    fn test_lookup_url_tor_allowed() {
        assert_eq!(
            build_lookup_url("http://x/api", SubjectType::Ip, "8.8.8.8", true),
            "http://x/api?ip=8.8.8.8&f=json"
        );
    }

    #[test]
    fn test_lookup_url_username() {
        let url = build_lookup_url(DEFAULT_API_URL, SubjectType::Username, "john doe", true);
        assert_eq!(url, "http://api.stopforumspam.org/api?username=john%20doe&f=json");
    }

    #[test]
    fn test_lookup_url_is_idempotent() {
        let a = build_lookup_url("http://x/api", SubjectType::Ip, "::1", false);
        let b = build_lookup_url("http://x/api", SubjectType::Ip, "::1", false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_report_url_requires_api_key() {
        assert!(matches!(
            build_report_url(DEFAULT_REPORT_URL, &report("")),
            Err(Error::MissingApiKey)
        ));
    }

    #[test]
    fn test_report_url_fields() {
        let submission = report("k3y&x");
        let url = build_report_url(DEFAULT_REPORT_URL, &submission).unwrap();

        assert!(url.starts_with("http://www.stopforumspam.com/add.php?username=spammer&ip_addr=1.2.3.4&evidence="));
        assert_eq!(query_param(&url, "username").unwrap(), submission.username);
        assert_eq!(query_param(&url, "ip_addr").unwrap(), submission.ip);
        assert_eq!(query_param(&url, "evidence").unwrap(), submission.evidence);
        assert_eq!(query_param(&url, "email").unwrap(), submission.email);
        assert_eq!(query_param(&url, "api_key").unwrap(), "k3y&x");
        assert!(!url.contains('\n'));
    }

    proptest! {
        #[test]
        fn test_lookup_value_round_trip(value in "(?s).*", allow_tor in any::<bool>()) {
            let url = build_lookup_url("http://x/api", SubjectType::Username, &value, allow_tor);
            prop_assert_eq!(query_param(&url, "username"), Some(value));
            prop_assert_eq!(url.contains("&notorexit"), !allow_tor);
            prop_assert!(url.ends_with("&f=json"));
        }

        #[test]
        fn test_report_evidence_round_trip(evidence in "(?s).{0,200}") {
            let mut submission = report("key");
            submission.evidence = evidence.clone();
            let url = build_report_url(DEFAULT_REPORT_URL, &submission).unwrap();
            prop_assert_eq!(query_param(&url, "evidence"), Some(evidence));
        }
    }
}
