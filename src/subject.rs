//! Subject types and validation of lookup input.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of subject the reputation service can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Ip,
    Email,
    Username,
}

impl SubjectType {
    /// All supported subject types.
    pub const ALL: [SubjectType; 3] = [SubjectType::Ip, SubjectType::Email, SubjectType::Username];

    /// Query parameter name used by the lookup API.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Ip => "ip",
            SubjectType::Email => "email",
            SubjectType::Username => "username",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim().to_lowercase();
        match token.as_str() {
            "ip" => Ok(SubjectType::Ip),
            "email" => Ok(SubjectType::Email),
            "username" => Ok(SubjectType::Username),
            _ => Err(Error::UnsupportedSubjectType(token)),
        }
    }
}

/// A validated subject: what to look up and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub subject_type: SubjectType,
    pub value: String,
}

impl Subject {
    pub fn new(subject_type: SubjectType, value: impl Into<String>) -> Self {
        Self {
            subject_type,
            value: value.into(),
        }
    }
}

/// Validate a raw subject type token and value.
///
/// Value syntax is left to the remote service; only a missing value is
/// rejected here since it can never produce a meaningful query.
pub fn validate(subject_type: &str, value: Option<&str>) -> Result<Subject> {
    let subject_type: SubjectType = subject_type.parse()?;
    let value = value.ok_or_else(|| {
        Error::invalid_argument(format!("a value is required to check a {subject_type}"))
    })?;

    Ok(Subject::new(subject_type, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        assert_eq!("ip".parse::<SubjectType>().unwrap(), SubjectType::Ip);
        assert_eq!("  EMAIL ".parse::<SubjectType>().unwrap(), SubjectType::Email);
        assert_eq!("UserName\n".parse::<SubjectType>().unwrap(), SubjectType::Username);
    }

    #[test]
    fn test_parse_unsupported() {
        let err = " Phone ".parse::<SubjectType>().unwrap_err();
        match err {
            Error::UnsupportedSubjectType(token) => assert_eq!(token, "phone"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!("".parse::<SubjectType>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for subject_type in SubjectType::ALL {
            assert_eq!(subject_type.to_string().parse::<SubjectType>().unwrap(), subject_type);
        }
    }

    #[test]
    fn test_validate_ok() {
        let subject = validate("Email", Some("a@b.com")).unwrap();
        assert_eq!(subject.subject_type, SubjectType::Email);
        assert_eq!(subject.value, "a@b.com");
    }

    #[test]
    fn test_validate_passes_empty_value_through() {
        let subject = validate("username", Some("")).unwrap();
        assert_eq!(subject.value, "");
    }

    #[test]
    fn test_validate_missing_value() {
        assert!(matches!(validate("ip", None), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_checks_type_first() {
        assert!(matches!(
            validate("phone", None),
            Err(Error::UnsupportedSubjectType(_))
        ));
    }

    #[test]
    fn test_serde_lowercase() {
        let t: SubjectType = serde_yaml::from_str("username").unwrap();
        assert_eq!(t, SubjectType::Username);
    }
}
