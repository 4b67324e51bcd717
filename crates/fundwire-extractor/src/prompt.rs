//! Prompt templates for the model-backed engine.
//!
//! Two templates, chosen by the roundup detector before the request goes
//! out: one for singular announcements, one for weekly digests with
//! parallel arrays. Both end with a JSON-only reminder; models still wrap
//! their output in chatter often enough that the parser isolates the
//! object afterwards regardless.

const SINGLE_INSTRUCTIONS: &str = "\
You extract structured data from fundraising announcements.
Read the message below and return a single JSON object with these fields:

- \"type\": \"investment\" or \"acquisition\"
- \"company\": the company that raised or was acquired
- \"amount\": the amount raised, like \"1.5M\" or \"2B\", or \"Undisclosed\"
- \"round\": one of \"Pre-Seed\", \"Seed\", \"Angel Round\", \"Pre-Series A\", \"Series A\", \"Series B\", \"Series C\", \"Strategic\", \"Token Sale\", \"Private Sale\", \"Private Round\", \"Funding\", or omit if unknown
- \"investors\": array of investor names, or of objects {\"name\", \"description\"}
- \"acquirer\": the acquiring company, only for acquisitions
- \"about\": one-line description of the company, if the message has one
- \"valuation\": the stated valuation, if any
- \"links\": array of URLs mentioned in the message

Omit any field you cannot determine. Do not invent values.";

const ROUNDUP_INSTRUCTIONS: &str = "\
You extract structured data from weekly fundraising digests.
Read the digest below and return a single JSON object with these fields:

- \"type\": always \"roundup\"
- \"companies\": array of company names, one per line item, in order
- \"amounts\": array of amounts parallel to \"companies\", like \"10M\" or \"2.5B\"
- \"acquisitions\": array of objects {\"company\", \"acquirer\", \"amount\"} for any acquisitions mentioned
- \"links\": array of URLs mentioned in the digest

The arrays must stay parallel: amounts[i] belongs to companies[i].
Omit any field you cannot determine. Do not invent values.";

const FORMAT_REMINDER: &str =
    "Return ONLY the JSON object. No markdown, no explanation, no surrounding text.";

/// Prompt for a singular announcement.
pub fn single_prompt(text: &str) -> String {
    format!("{SINGLE_INSTRUCTIONS}\n\nMessage:\n---\n{text}\n---\n\n{FORMAT_REMINDER}")
}

/// Prompt for a roundup digest.
pub fn roundup_prompt(text: &str) -> String {
    format!("{ROUNDUP_INSTRUCTIONS}\n\nDigest:\n---\n{text}\n---\n\n{FORMAT_REMINDER}")
}
