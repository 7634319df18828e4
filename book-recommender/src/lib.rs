pub mod answers;
pub mod decode;
pub mod error;
pub mod generation;
pub mod links;
pub mod model;
pub mod orchestrator;
pub mod prompt;

// Re-export commonly used types
pub use answers::{AnswersError, QuestionnaireAnswers};
pub use decode::decode_reply;
pub use error::{ErrorKind, RecommendError, Result, ShapeError};
pub use generation::{
    AwsCredentials, BedrockClient, BedrockConnector, ContentBlock, CredentialSource,
    GenerationReply, GenerationRequest, GenerationSettings, GeneratorFactory, ProcessEnv,
    TextGenerator,
};
pub use links::{enrich, retailer_links};
pub use model::{MatchType, Recommendation, RecommendationBatch, RetailerLinks};
pub use orchestrator::RecommendationOrchestrator;
pub use prompt::{PromptProfile, TierScheme, build_prompt};
