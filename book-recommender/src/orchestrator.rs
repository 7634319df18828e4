//! RecommendationOrchestrator – runs one questionnaire through the whole pipeline:
//! prompt → connect → generate → decode → enrich.
//!
//! The orchestrator is built once at startup and shared by every request. It
//! holds only immutable configuration; each call connects its own generator,
//! so credentials are resolved per request and nothing is cached between calls.

use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    answers::QuestionnaireAnswers,
    decode::decode_reply,
    error::Result,
    generation::{GenerationRequest, GenerationSettings, GeneratorFactory},
    links::enrich,
    model::RecommendationBatch,
    prompt::{PromptProfile, build_prompt},
};

#[derive(Clone)]
pub struct RecommendationOrchestrator {
    factory: Arc<dyn GeneratorFactory>,
    settings: GenerationSettings,
    profile: PromptProfile,
}

impl RecommendationOrchestrator {
    pub fn new(
        factory: Arc<dyn GeneratorFactory>,
        settings: GenerationSettings,
        profile: PromptProfile,
    ) -> Self {
        Self {
            factory,
            settings,
            profile,
        }
    }

    pub fn profile(&self) -> &PromptProfile {
        &self.profile
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Run the pipeline once. No retries: any failure is returned as-is and no
    /// partial batch is ever produced.
    pub async fn recommend(&self, answers: &QuestionnaireAnswers) -> Result<RecommendationBatch> {
        let generator = self.factory.connect()?;

        let prompt = build_prompt(&self.profile, answers);
        info!(
            answers = answers.len(),
            prompt_chars = prompt.chars().count(),
            requested = self.profile.count,
            "Prompt built"
        );

        let request = GenerationRequest::new(&self.settings, prompt);
        let reply = generator.generate(&request).await?;

        if let Some(usage) = reply.usage {
            info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                model = reply.model.as_deref().unwrap_or("unknown"),
                "Generation completed"
            );
        }

        let mut batch = decode_reply(&reply).inspect_err(|e| {
            warn!(kind = ?e.kind(), error = %e, "Could not decode model reply");
        })?;
        if batch.len() != self.profile.count {
            warn!(
                requested = self.profile.count,
                received = batch.len(),
                "Model returned a different number of recommendations"
            );
        }

        enrich(&mut batch);
        info!(recommendations = batch.len(), "Recommendations ready");
        Ok(batch)
    }
}
