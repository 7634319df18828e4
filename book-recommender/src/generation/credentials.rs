use std::collections::HashMap;
use std::fmt;

use crate::error::{RecommendError, Result};

pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const REGION_VAR: &str = "AWS_REGION";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

/// Where credentials are looked up. Blank values count as missing.
pub trait CredentialSource: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Reads the process environment at lookup time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl CredentialSource for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub region: String,
}

impl AwsCredentials {
    /// Resolve the access key, secret key and region; all three are required.
    pub fn resolve(source: &dyn CredentialSource) -> Result<Self> {
        Ok(Self {
            access_key_id: required(source, ACCESS_KEY_VAR)?,
            secret_access_key: required(source, SECRET_KEY_VAR)?,
            region: required(source, REGION_VAR)?,
            session_token: non_blank(source.lookup(SESSION_TOKEN_VAR)),
        })
    }
}

// Keep the secret out of logs.
impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .finish()
    }
}

fn required(source: &dyn CredentialSource, key: &str) -> Result<String> {
    non_blank(source.lookup(key))
        .ok_or_else(|| RecommendError::Configuration(format!("{key} is required but not set")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn resolves_complete_credentials() {
        let creds = AwsCredentials::resolve(&source(&[
            (ACCESS_KEY_VAR, "AKIDEXAMPLE"),
            (SECRET_KEY_VAR, "secret"),
            (REGION_VAR, "ap-northeast-1"),
        ]))
        .unwrap();

        assert_eq!(creds.access_key_id, "AKIDEXAMPLE");
        assert_eq!(creds.region, "ap-northeast-1");
        assert!(creds.session_token.is_none());
        assert!(!format!("{creds:?}").contains("secret\""));
    }

    #[test]
    fn missing_or_blank_values_are_configuration_errors() {
        let err = AwsCredentials::resolve(&source(&[
            (SECRET_KEY_VAR, "secret"),
            (REGION_VAR, "us-east-1"),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains(ACCESS_KEY_VAR));

        let err = AwsCredentials::resolve(&source(&[
            (ACCESS_KEY_VAR, "AKIDEXAMPLE"),
            (SECRET_KEY_VAR, "secret"),
            (REGION_VAR, "   "),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains(REGION_VAR));
    }
}
