use std::sync::Arc;

use crate::generation::generator::JobDescriptionGenerator;
use crate::generation::normalizer::JsonExtraction;
use crate::llm_client::ModelInvoker;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; tests construct it around a stub `ModelInvoker`.
#[derive(Clone)]
pub struct AppState {
    pub generator: JobDescriptionGenerator,
    /// Same client the generator holds, kept for health reporting.
    pub llm: Arc<dyn ModelInvoker>,
}

impl AppState {
    pub fn new(llm: Arc<dyn ModelInvoker>, extraction: JsonExtraction) -> Self {
        Self {
            generator: JobDescriptionGenerator::new(llm.clone(), extraction),
            llm,
        }
    }
}
