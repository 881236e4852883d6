// All LLM prompt constants for the DevOps assistant.

pub const SRE_SYSTEM: &str = "\
You are an on-call site reliability engineer reading production logs. \
You separate symptoms from causes and quote log lines when they matter.";

pub const LOG_SUMMARY_INSTRUCTION: &str = "\
Summarize the logs below in under 150 words: what happened, when, \
which components were involved, and which errors repeat.";

/// The stage-one summary arrives as the last context block.
pub const RECOMMENDATIONS_INSTRUCTION: &str = "\
From the log summary above, list the distinct errors, their likely root causes, \
and concrete remediation steps with a priority (high, medium, low). \
Rate overall severity as critical, high, medium, or low.";
