// Advertising assistant: ad copy for a product and target audience.

pub mod copywriter;
pub mod handlers;
pub mod prompts;
