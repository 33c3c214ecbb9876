// Job description generation: prompt building, model invocation, response normalization.
// All model calls go through llm_client; handlers never talk to Ollama directly.

pub mod generator;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
