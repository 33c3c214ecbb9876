//! Job description generation: orchestrates the pipeline for one request.
//!
//! Flow: clean skills → build prompt → model invocation → normalize → records.
//!
//! Prompt building and normalization are pure; the only await point is the model
//! call, and no lock or shared mutable state is held across it.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::normalizer::{normalize, JsonExtraction, Normalized};
use crate::generation::prompts::{build_prompt, clean_skills};
use crate::llm_client::ModelInvoker;
use crate::models::job_description::{GenerationRequest, JobDescriptionRecord};

/// Generation pipeline with its model collaborator injected at construction.
#[derive(Clone)]
pub struct JobDescriptionGenerator {
    llm: Arc<dyn ModelInvoker>,
    extraction: JsonExtraction,
}

impl JobDescriptionGenerator {
    pub fn new(llm: Arc<dyn ModelInvoker>, extraction: JsonExtraction) -> Self {
        Self { llm, extraction }
    }

    /// Runs the pipeline and returns the public, non-empty record list.
    ///
    /// Model invocation failures and template render errors surface as errors;
    /// malformed model output is replaced by the fallback record and logged here.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<JobDescriptionRecord>, AppError> {
        let generation_id = Uuid::new_v4();
        let span = info_span!("generate", %generation_id, model = self.llm.model());

        async move {
            let normalized = self.generate_tagged(request).await?;

            match &normalized {
                Normalized::Parsed { records, rejected } => {
                    for (index, issues) in rejected {
                        let issues: Vec<String> = issues.iter().map(ToString::to_string).collect();
                        debug!("Rejected variant {index}: {}", issues.join("; "));
                    }
                    info!(
                        "Generated {} job description variants ({} rejected)",
                        records.len(),
                        rejected.len()
                    );
                }
                Normalized::Fallback { reason, .. } => {
                    warn!("Model output unusable, returning fallback record: {reason}");
                }
            }

            Ok::<_, AppError>(normalized.into_records())
        }
        .instrument(span)
        .await
    }

    /// Same as `generate` but keeps the parsed/fallback distinction.
    pub async fn generate_tagged(
        &self,
        request: &GenerationRequest,
    ) -> Result<Normalized, AppError> {
        let cleaned_skills = clean_skills(&request.skills);
        let designation_lower = request.designation.to_lowercase();

        let prompt = build_prompt(
            &request.designation,
            request.years_of_experience,
            &cleaned_skills,
            &request.extra_context,
        )
        .context("failed to render job description prompt")?;

        let raw = self.llm.invoke(&prompt).await?;
        debug!("Model replied with {} bytes", raw.len());

        Ok(normalize(
            &raw,
            self.extraction,
            &designation_lower,
            request.years_of_experience,
            &cleaned_skills,
        ))
    }
}
