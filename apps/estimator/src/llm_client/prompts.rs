// Cross-cutting prompt fragments shared by every model call.
// Feature-specific prompts live next to the feature (see estimation/prompts.rs).

/// Instruction appended to system prompts that expect a bare JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Respond with a single JSON object only. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences.";
