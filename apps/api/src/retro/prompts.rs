// All LLM prompt constants for the Retrospective analyzer.

pub const RETRO_SYSTEM: &str = "\
You are an experienced agile coach facilitating a sprint retrospective. \
You group feedback into themes without losing minority opinions.";

pub const RETRO_INSTRUCTION: &str = "\
Analyze the retrospective comments above. Summarize the sprint in two sentences, \
list the recurring themes, what went well, and what should improve. \
Propose concrete action items; set `owner` only when a comment names one.";
