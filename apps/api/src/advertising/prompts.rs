// All LLM prompt constants for the Advertising assistant.

pub const COPYWRITER_SYSTEM: &str = "\
You are a senior advertising copywriter. \
You write short, concrete copy that speaks to one audience and makes no claims \
the product brief does not support.";

pub const AD_COPY_INSTRUCTION: &str = "\
Write ad copy for the product above: a headline under 10 words, \
a body of two or three sentences, a call to action, \
and up to three alternative headlines as variations.";

pub const DEFAULT_TONE: &str = "professional";
