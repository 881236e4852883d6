// Pharmacy assistant: patient education and drug interaction screening.
// Output is informational and always carries the disclaimer.

pub mod education;
pub mod handlers;
pub mod interactions;
pub mod prompts;
