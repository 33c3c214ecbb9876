//! Axum route handlers for the job description API.
//!
//! This is the validation boundary: the pipeline only ever sees a trimmed,
//! non-empty designation and an in-range experience value.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::job_description::{
    GenerationRequest, JobDescriptionRecord, MAX_YEARS_OF_EXPERIENCE, MIN_YEARS_OF_EXPERIENCE,
};
use crate::state::AppState;

const SUPPORTED_DESIGNATIONS: &[&str] = &[
    "Software Engineer",
    "Senior Software Engineer",
    "Full Stack Developer",
    "Frontend Developer",
    "Backend Developer",
    "DevOps Engineer",
    "Data Scientist",
    "Data Engineer",
    "Product Manager",
    "Project Manager",
    "Business Analyst",
    "QA Engineer",
    "Technical Lead",
    "Engineering Manager",
    "UX/UI Designer",
    "System Administrator",
    "Database Administrator",
    "Cybersecurity Specialist",
];

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobDescriptionRequest {
    pub designation: String,
    /// Signed so out-of-range values get a 400 from validation, not a decode error.
    pub yoe: i64,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, rename = "extraInfo")]
    pub extra_info: Option<String>,
}

impl JobDescriptionRequest {
    /// Trims and range-checks the body into a pipeline request.
    pub fn validate(self) -> Result<GenerationRequest, AppError> {
        let designation = self.designation.trim();
        if designation.is_empty() {
            return Err(AppError::Validation(
                "Designation cannot be empty".to_string(),
            ));
        }

        if !(MIN_YEARS_OF_EXPERIENCE..=MAX_YEARS_OF_EXPERIENCE).contains(&self.yoe) {
            return Err(AppError::Validation(format!(
                "yoe must be between {MIN_YEARS_OF_EXPERIENCE} and {MAX_YEARS_OF_EXPERIENCE}"
            )));
        }

        Ok(GenerationRequest {
            designation: designation.to_string(),
            years_of_experience: self.yoe as u32,
            skills: self.skills,
            extra_context: self.extra_info.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobDescriptionResponse {
    pub success: bool,
    pub data: Vec<JobDescriptionRecord>,
    pub message: String,
    pub count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /generate-job-description
///
/// Returns the model's job description variations (normally 3), or a single
/// fallback record when the model's reply could not be used.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<JobDescriptionRequest>, JsonRejection>,
) -> Result<Json<JobDescriptionResponse>, AppError> {
    let Json(body) = payload?;
    let request = body.validate()?;

    let data = state.generator.generate(&request).await?;
    let count = data.len();

    Ok(Json(JobDescriptionResponse {
        success: true,
        data,
        message: format!("Successfully generated {count} job description variations"),
        count,
    }))
}

/// GET /example
pub async fn handle_example() -> Json<Value> {
    Json(json!({
        "example_request": {
            "designation": "Software Engineer",
            "yoe": 5,
            "skills": ["Python", "Django", "React", "AWS"],
            "extraInfo": "Experience with microservices architecture and agile development"
        },
        "usage": "POST /generate-job-description with the above JSON structure"
    }))
}

/// GET /designations
pub async fn handle_designations() -> Json<Value> {
    Json(json!({
        "supported_designations": SUPPORTED_DESIGNATIONS,
        "note": "This API can generate descriptions for any job designation, not limited to this list"
    }))
}
