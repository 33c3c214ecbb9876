use serde::{Deserialize, Serialize};

/// Description text carried by the placeholder record returned when the model's
/// output could not be parsed or validated.
pub const FALLBACK_DESCRIPTION: &str = "Failed to generate description";

pub const MIN_YEARS_OF_EXPERIENCE: i64 = 0;
pub const MAX_YEARS_OF_EXPERIENCE: i64 = 50;

/// Inputs to one generation call. Built by the HTTP boundary after trimming and
/// range checks, so the pipeline can assume a non-blank designation and a bounded
/// experience value.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub designation: String,
    pub years_of_experience: u32,
    pub skills: Vec<String>,
    pub extra_context: String,
}

/// A single job description variant as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionRecord {
    pub designation: String,
    pub experience: i64,
    pub skills: Vec<String>,
    /// 2–3 sentence summary.
    pub description: String,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
}

impl JobDescriptionRecord {
    /// The deterministic placeholder substituted for unusable model output.
    pub fn fallback(designation_lower: &str, years_of_experience: u32, skills: &[String]) -> Self {
        Self {
            designation: designation_lower.to_string(),
            experience: i64::from(years_of_experience),
            skills: skills.to_vec(),
            description: FALLBACK_DESCRIPTION.to_string(),
            responsibilities: vec![],
            requirements: vec![],
        }
    }

    /// True when this record is the placeholder rather than model output.
    #[cfg(test)]
    pub fn is_fallback(&self) -> bool {
        self.description == FALLBACK_DESCRIPTION
            && self.responsibilities.is_empty()
            && self.requirements.is_empty()
    }
}
