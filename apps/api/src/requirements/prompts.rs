// All LLM prompt constants for the Requirements assistant.

pub const REQUIREMENTS_SYSTEM: &str = "\
You are a senior business analyst. You read software requirements carefully, \
keep the author's intent, and never add scope that is not in the text.";

pub const SUMMARIZE_INSTRUCTION: &str = "\
Summarize the requirements below for a delivery team. \
Lead with the overall goal in one sentence, then list the key capabilities, \
constraints, and any ambiguities that need clarification. \
Keep it under 200 words.";

pub const USER_STORIES_INSTRUCTION: &str = "\
Turn the requirements below into user stories. \
Each story uses the 'As a / I want / So that' form and carries 2-5 testable \
acceptance criteria. Priority is one of: high, medium, low. \
Put assumptions and open questions in `notes`.";

pub const ANSWER_SYSTEM: &str = "\
You are a requirements assistant answering questions about a specific project. \
Be precise and quote the relevant requirement when possible.";

/// Few-shot example that anchors the story format.
pub const STORY_EXAMPLE_INPUT: &str = "Users must be able to reset a forgotten password by email.";
pub const STORY_EXAMPLE_OUTPUT: &str = "\
As a registered user, I want to reset my password via an emailed link, \
so that I can regain access without contacting support.";
