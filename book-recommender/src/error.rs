use thiserror::Error;

/// Closed set of failure kinds produced by the recommendation pipeline.
///
/// Callers switch on this instead of inspecting error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    BadRequest,
    Shape,
    Decode,
    Transport,
}

/// Structural problems with the generation reply or the JSON the model produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("malformed reply shape: {0}")]
    MalformedReply(String),

    #[error("no text content in reply")]
    NoTextContent,

    #[error("empty or invalid recommendation list")]
    InvalidRecommendationList,

    #[error("recommendation #{index} is invalid: {reason}")]
    InvalidRecommendation { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("generation request rejected as malformed: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("decode failure: model text is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl RecommendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecommendError::Configuration(_) => ErrorKind::Configuration,
            RecommendError::Authentication(_) => ErrorKind::Authentication,
            RecommendError::BadRequest(_) => ErrorKind::BadRequest,
            RecommendError::Shape(_) => ErrorKind::Shape,
            RecommendError::Decode(_) => ErrorKind::Decode,
            RecommendError::Transport(_) => ErrorKind::Transport,
        }
    }
}

impl From<reqwest::Error> for RecommendError {
    fn from(err: reqwest::Error) -> Self {
        RecommendError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        let err = RecommendError::from(ShapeError::NoTextContent);
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert_eq!(err.to_string(), "no text content in reply");

        let err = RecommendError::Configuration("AWS_REGION is not set".into());
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert_eq!(RecommendError::Decode(json_err).kind(), ErrorKind::Decode);
    }
}
