// Shared prompt fragments.
// Each assistant module defines its own prompts.rs alongside its service;
// this file holds the cross-cutting pieces they reuse.

/// Appended to instructions of every structured call.
pub const STRUCTURED_OUTPUT_INSTRUCTION: &str = "\
    Respond by calling the provided function. \
    Fill every field you can support from the input. \
    Use an empty string or empty list for anything the input does not support; \
    never invent facts to fill a field.";

/// Used when the answer must stay inside the supplied context.
pub const GROUNDED_ANSWER_INSTRUCTION: &str = "\
    Answer ONLY from the context provided above. \
    If the context does not contain the answer, say so plainly instead of guessing.";

/// Marker the services prefix to placeholder results when a structured reply was unusable.
pub const UNAVAILABLE_PREFIX: &str = "Unable to generate";
