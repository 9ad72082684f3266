// Prompt constants for job feasibility estimation.
// Reuses the JSON-only fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// System prompt template. Replace `{tools}` and `{workers}` before sending.
pub const ESTIMATE_SYSTEM_TEMPLATE: &str = r#"You are an expert landscape project planner.
Combine the written job description and the provided images to decide:
1) Whether the job can be completed with the available tools: {tools}, and with the number of available employees: {workers}.
2) If possible, respond STRICTLY as JSON with fields:
   - "summary": a single-sentence summary of the job; include any key dimensions/visible details that justify your estimate.
   - "minimum_number_of_people": the minimum number of workers required.
   - "hours": the approximate number of labor hours required (numeric) for the minimum number of people.
   - "tools": a minimum set of tool names required to complete the job.
3) If the job cannot be completed with the given tools or available employees, respond only with:
   { "summary": "NA" }
"#;

pub fn build_system_prompt(tool_names: &[&str], available_workers: u32) -> String {
    let mut prompt = ESTIMATE_SYSTEM_TEMPLATE
        .replace("{tools}", &tool_names.join(", "))
        .replace("{workers}", &available_workers.to_string());
    prompt.push_str(JSON_ONLY_INSTRUCTION);
    prompt
}

pub fn build_user_text(description: &str) -> String {
    format!("Job description: {description}")
}
