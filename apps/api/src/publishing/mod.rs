// Publishing assistant: book reviews and multi-stage PDF manuscript review.

pub mod book_review;
pub mod handlers;
pub mod manuscript;
pub mod prompts;
