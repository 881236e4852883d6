// Requirements assistant: summaries, user stories, and context-grounded Q&A.
// All LLM calls go through llm_client.

pub mod assistant;
pub mod handlers;
pub mod prompts;
