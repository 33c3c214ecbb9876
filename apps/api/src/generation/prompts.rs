//! Prompt Builder: renders a generation request into the instruction sent to the model.
//!
//! Pure: no I/O and no validation. The caller guarantees a trimmed, non-empty
//! designation.

use std::sync::OnceLock;

use minijinja::{context, Environment, UndefinedBehavior};
use serde_json::Value;

/// Generation prompt template (Jinja syntax; single braces are literal JSON).
/// Variables: designation, yoe, skills, extra_info
pub const JOB_DESCRIPTION_PROMPT_TEMPLATE: &str = r#"Generate a detailed job description for a {{ designation }} with {{ yoe }} years of experience and skills: {{ skills }}. If provided use this additional information: {{ extra_info }} to provide a more contextual description. If the skills list is empty, use the designation to infer relevant skills.

Return ONLY a valid JSON object in this exact format (no additional text or explanation):

{
  "designation": "{{ designation }}",
  "experience": {{ yoe }},
  "skills": {{ skills }},
  "description": "Brief job description paragraph (2-3 sentences)",
  "responsibilities": [
    "Responsibility 1",
    "Responsibility 2",
    "Responsibility 3"
  ],
  "requirements": [
    "Requirement 1",
    "Requirement 2",
    "Requirement 3"
  ]
}

Generate 3 variations of the job description, each with different wording but similar content. You may increase the content length if necessary, but ensure it remains concise and relevant to the job role. Only return the JSON objects in array format without any additional text or explanation. Do not include any markdown formatting, asterisks, or extra characters in the response. The JSON should be well-structured and easy to parse."#;

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env
    })
}

/// Trims every skill and drops the blank ones, preserving order.
pub fn clean_skills(skills: &[String]) -> Vec<String> {
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds the generation prompt.
///
/// The designation is lower-cased and the cleaned skill list is embedded as a JSON
/// array literal (`[]` when empty, which tells the model to infer skills).
/// Substituted values are output verbatim and never evaluated as template syntax.
pub fn build_prompt(
    designation: &str,
    years_of_experience: u32,
    skills: &[String],
    extra_context: &str,
) -> Result<String, minijinja::Error> {
    let skills_json = Value::from(clean_skills(skills)).to_string();

    environment().render_str(
        JOB_DESCRIPTION_PROMPT_TEMPLATE,
        context! {
            designation => designation.to_lowercase(),
            yoe => years_of_experience,
            skills => skills_json,
            extra_info => extra_context,
        },
    )
}
