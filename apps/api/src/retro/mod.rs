// Retrospective analyzer: themes and action items from sprint retro comments.

pub mod analyzer;
pub mod handlers;
pub mod prompts;
