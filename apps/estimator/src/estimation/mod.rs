// Job feasibility estimation: prompt building, the model call, and result parsing.
// All model calls go through llm_client.

pub mod estimator;
pub mod handlers;
pub mod prompts;
pub mod result;
