//! Landscape job feasibility estimator.
//!
//! Given a job description, optional photos, the tools on hand and a headcount,
//! asks a hosted multimodal model whether the job is doable and, if so, how many
//! people, how many hours and which tools it takes.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod estimation;
pub mod images;
pub mod llm_client;
pub mod routes;
pub mod state;

pub use catalog::{Catalog, Tool};
pub use estimation::estimator::{assess, estimate, Assessment, EstimateError, JobRequest};
pub use estimation::result::{parse_feasibility, FeasibilityResult, ParseStatus};
pub use llm_client::{InferenceBackend, LlmClient};
