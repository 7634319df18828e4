use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::fmt::Display;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use super::credentials::{AwsCredentials, CredentialSource, ProcessEnv};
use super::signing;
use super::{GenerationReply, GenerationRequest, GeneratorFactory, TextGenerator};
use crate::error::{RecommendError, Result, ShapeError};

const JSON: &str = "application/json";

pub fn default_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

/// Bedrock runtime client bound to one set of credentials.
pub struct BedrockClient {
    http: reqwest::Client,
    credentials: AwsCredentials,
    endpoint: Url,
}

impl BedrockClient {
    pub fn new(http: reqwest::Client, credentials: AwsCredentials, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            RecommendError::Configuration(format!("invalid Bedrock endpoint `{endpoint}`: {e}"))
        })?;
        if endpoint.host_str().is_none() {
            return Err(RecommendError::Configuration(format!(
                "Bedrock endpoint `{endpoint}` has no host"
            )));
        }

        Ok(Self {
            http,
            credentials,
            endpoint,
        })
    }

    fn invoke_url(&self, model_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.set_path(&format!("/model/{}/invoke", urlencoding::encode(model_id)));
        url
    }
}

#[async_trait]
impl TextGenerator for BedrockClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply> {
        let url = self.invoke_url(&request.model_id);
        let body = serde_json::to_vec(&request.body)
            .map_err(|e| RecommendError::BadRequest(format!("could not encode request: {e}")))?;
        let signed = signing::sign_post(
            &self.credentials,
            url.as_str(),
            &[("accept", JSON), ("content-type", JSON)],
            &body,
            SystemTime::now(),
        )?;

        info!(
            model = %request.model_id,
            prompt_chars = request.prompt().chars().count(),
            "Invoking Bedrock model"
        );

        let mut builder = self
            .http
            .post(url)
            .header("accept", JSON)
            .header("content-type", JSON);
        for (name, value) in &signed {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await;
            if let Err(e) = &body {
                warn!(%status, error = %e, "Could not read Bedrock error body");
            }
            return Err(rejection(status, body));
        }

        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Bedrock reply received");

        serde_json::from_slice::<GenerationReply>(&bytes)
            .map_err(|e| ShapeError::MalformedReply(e.to_string()).into())
    }
}

/// Classify a non-2xx Bedrock response by status code.
fn rejection<E: Display>(status: StatusCode, body: std::result::Result<String, E>) -> RecommendError {
    let detail = match body {
        Ok(text) => {
            warn!(%status, body = %text, "Bedrock rejected the request");
            format!("HTTP {status}: {text}")
        }
        Err(e) => format!("HTTP {status} (body unreadable: {e})"),
    };

    match status {
        StatusCode::BAD_REQUEST => RecommendError::BadRequest(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RecommendError::Authentication(detail),
        _ => RecommendError::Transport(detail),
    }
}

/// Builds a [`BedrockClient`] per request from freshly resolved credentials.
#[derive(Clone)]
pub struct BedrockConnector {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialSource>,
    endpoint: Option<String>,
}

impl BedrockConnector {
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            endpoint: None,
        }
    }

    /// Credentials come from the process environment.
    pub fn from_env() -> Self {
        Self::new(Arc::new(ProcessEnv))
    }

    /// Send requests to `endpoint` instead of the regional Bedrock runtime URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

impl GeneratorFactory for BedrockConnector {
    fn connect(&self) -> Result<Arc<dyn TextGenerator>> {
        let credentials = AwsCredentials::resolve(self.credentials.as_ref())?;
        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint(&credentials.region));
        debug!(%endpoint, region = %credentials.region, "Connecting to Bedrock");

        let client = BedrockClient::new(self.http.clone(), credentials, &endpoint)?;
        Ok(Arc::new(client))
    }
}
