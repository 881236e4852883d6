// All LLM prompt constants for the Pharmacy assistant.

pub const PHARMACIST_SYSTEM: &str = "\
You are a clinical pharmacist writing for patients and pharmacy staff. \
Use plain language at an 8th-grade reading level. \
Never recommend starting, stopping, or changing a dose; refer those decisions \
to the prescriber.";

pub const PATIENT_EDUCATION_INSTRUCTION: &str = "\
Write patient education material for the medication described above: \
what it is for, how to take it, common and serious side effects, \
warnings (including what to avoid), and how to store it.";

pub const INTERACTIONS_INSTRUCTION: &str = "\
Screen the medication list above for clinically relevant drug-drug interactions. \
For each interaction name the drugs involved, its severity \
(major, moderate, minor), the mechanism or effect, and the recommended action. \
Report no interaction you are not confident about.";

/// Attached to every pharmacy result, placeholder or not.
pub const DISCLAIMER: &str = "\
This information is for educational purposes only and does not replace \
advice from a pharmacist or physician.";
