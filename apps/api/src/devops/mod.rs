// DevOps assistant: two-stage log summarization.

pub mod handlers;
pub mod log_summarizer;
pub mod prompts;
