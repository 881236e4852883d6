// Code review assistant (the "autonomous agent" endpoints): one-shot analysis,
// and the analyze-then-propose-fix workflow.

pub mod analyzer;
pub mod handlers;
pub mod prompts;
pub mod workflow;
