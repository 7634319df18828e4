//! SigV4 request signing for the Bedrock runtime, delegated to `aws-sigv4`.

use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    PayloadChecksumKind, SignableBody, SignableRequest, SigningParams, SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use std::fmt::Display;
use std::time::SystemTime;

use super::credentials::AwsCredentials;
use crate::error::{RecommendError, Result};

pub const SERVICE: &str = "bedrock";

/// Sign a `POST` to `url` and return the headers to attach on top of `headers`.
///
/// `x-amz-content-sha256` is signed and returned along with `x-amz-date`,
/// `authorization` and, for temporary credentials, `x-amz-security-token`.
pub fn sign_post(
    credentials: &AwsCredentials,
    url: &str,
    headers: &[(&str, &str)],
    body: &[u8],
    time: SystemTime,
) -> Result<Vec<(String, String)>> {
    let identity: Identity = Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        credentials.session_token.clone(),
        None,
        "environment",
    )
    .into();

    let mut settings = SigningSettings::default();
    settings.payload_checksum_kind = PayloadChecksumKind::XAmzSha256;

    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(&credentials.region)
        .name(SERVICE)
        .time(time)
        .settings(settings)
        .build()
        .map_err(signing_failed)?
        .into();

    let request = SignableRequest::new("POST", url, headers.iter().copied(), SignableBody::Bytes(body))
        .map_err(signing_failed)?;
    let (instructions, _signature) = sign(request, &params).map_err(signing_failed)?.into_parts();

    Ok(instructions
        .headers()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}

fn signing_failed(err: impl Display) -> RecommendError {
    RecommendError::Configuration(format!("could not sign Bedrock request: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    const INVOKE_URL: &str = "https://bedrock-runtime.us-east-1.amazonaws.com/model/anthropic.claude-3-5-sonnet-20241022-v2%3A0/invoke";

    fn credentials(session_token: Option<&str>) -> AwsCredentials {
        AwsCredentials {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into(),
            session_token: session_token.map(str::to_string),
            region: "us-east-1".into(),
        }
    }

    // 2024-01-15T09:30:00Z
    fn fixed_time() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_705_311_000)
    }

    fn header<'a>(signed: &'a [(String, String)], name: &str) -> Option<&'a str> {
        signed
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn signs_invoke_request_with_double_encoded_path() {
        let signed = sign_post(
            &credentials(None),
            INVOKE_URL,
            &[("accept", "application/json"), ("content-type", "application/json")],
            br#"{"hello":"world"}"#,
            fixed_time(),
        )
        .unwrap();

        assert_eq!(header(&signed, "x-amz-date"), Some("20240115T093000Z"));
        assert_eq!(
            header(&signed, "x-amz-content-sha256"),
            Some("93a23971a914e5eacbf0a8d25154cda309c3c1c72fbb9914d47c60f3cb681588")
        );
        assert_eq!(
            header(&signed, "authorization"),
            Some(
                "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240115/us-east-1/bedrock/aws4_request, \
                 SignedHeaders=accept;content-type;host;x-amz-content-sha256;x-amz-date, \
                 Signature=70c040864543046013541060f7c5a44984d2514108cd47180de4b48d816498de"
            )
        );
        assert_eq!(header(&signed, "x-amz-security-token"), None);
    }

    #[test]
    fn session_token_is_signed_and_attached() {
        let signed = sign_post(
            &credentials(Some("token-123")),
            INVOKE_URL,
            &[("content-type", "application/json")],
            b"{}",
            fixed_time(),
        )
        .unwrap();

        assert_eq!(header(&signed, "x-amz-security-token"), Some("token-123"));
        assert!(
            header(&signed, "authorization")
                .unwrap()
                .contains("x-amz-security-token")
        );
    }

    #[test]
    fn unparseable_url_is_a_configuration_error() {
        let err = sign_post(&credentials(None), "http://[::1", &[], b"", fixed_time()).unwrap_err();
        assert!(matches!(err, RecommendError::Configuration(_)));
    }
}
