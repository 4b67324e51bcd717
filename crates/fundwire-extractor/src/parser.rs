//! Decodes model responses into investment records.
//!
//! Models wrap their JSON in chatter more often than not, so the decoder
//! isolates the outermost object first, parses it leniently into a
//! [`serde_json::Value`], and then normalizes field by field. A response
//! that cannot be salvaged yields `None` rather than an error.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use fundwire_domain::{
    EventKind, InvestmentRecord, NestedAcquisition, RawMessage, RecordCommon, RoundType,
    RoundupRecord, RoundupTag, SingleRecord,
};

use crate::heuristic::has_acquisition_vocabulary;
use crate::normalize::{canonical_link, clean_monetary, match_round};

/// Placeholder company list for roundups whose line items could not be
/// recovered.
pub const ROUNDUP_PLACEHOLDER: &str = "Multiple Companies";

/// Returns the slice from the first `{` to the last `}` of `response`,
/// or `None` when no such pair exists.
pub fn isolate_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    let s = value.get(key)?.as_str()?.trim();
    (!s.is_empty() && !s.eq_ignore_ascii_case("null") && !s.eq_ignore_ascii_case("n/a"))
        .then(|| s.to_string())
}

/// Reads a field that may be a single string or an array of strings.
fn str_list(value: &Value, keys: &[&str]) -> Vec<String> {
    for key in keys {
        match value.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return vec![s.trim().to_string()],
            Some(Value::Array(items)) => {
                let list: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if !list.is_empty() {
                    return list;
                }
            }
            _ => continue,
        }
    }
    Vec::new()
}

/// Investor entries arrive as plain strings or as objects with a name
/// and a description.
fn investors(value: &Value) -> (Vec<String>, BTreeMap<String, String>) {
    let mut names = Vec::new();
    let mut notes = BTreeMap::new();
    let Some(items) = value.get("investors").and_then(Value::as_array) else {
        return (names, notes);
    };
    for item in items {
        match item {
            Value::String(s) => {
                if let Some((name, note)) = crate::normalize::clean_investor(s) {
                    if let Some(note) = note {
                        notes.insert(name.clone(), note);
                    }
                    names.push(name);
                }
            }
            Value::Object(_) => {
                let Some(name) = str_field(item, "name") else {
                    continue;
                };
                if let Some(desc) = str_field(item, "description") {
                    notes.insert(name.clone(), desc);
                }
                names.push(name);
            }
            _ => {}
        }
    }
    names.dedup();
    (names, notes)
}

fn links(value: &Value, message_text: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(items) = value.get("links").and_then(Value::as_array) {
        for item in items.iter().filter_map(Value::as_str) {
            if let Some(link) = canonical_link(item) {
                if !out.contains(&link) {
                    out.push(link);
                }
            }
        }
    }
    if out.is_empty() {
        out = crate::normalize::extract_links(message_text);
    }
    out
}

fn nested_acquisitions(value: &Value) -> Vec<NestedAcquisition> {
    let Some(items) = value.get("acquisitions").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let company = str_field(item, "company")?;
            Some(NestedAcquisition {
                company,
                acquirer: str_field(item, "acquirer").unwrap_or_default(),
                amount: str_field(item, "amount").map(|a| clean_monetary(&a)),
            })
        })
        .collect()
}

fn common_fields(value: &Value, message: &RawMessage) -> RecordCommon {
    let (investor_names, investor_notes) = investors(value);
    RecordCommon {
        date: message.date.clone(),
        raw_text: message.text.clone(),
        round: str_field(value, "round")
            .and_then(|label| RoundType::from_label(&label).or_else(|| match_round(&label))),
        investors: investor_names,
        investor_notes: (!investor_notes.is_empty()).then_some(investor_notes),
        about: str_field(value, "about"),
        valuation: str_field(value, "valuation").map(|v| clean_monetary(&v)),
        links: links(value, &message.text),
        is_part_of_roundup: false,
    }
}

/// Normalizes a parsed response object into a record.
///
/// `roundup` reflects what the message looked like before prompting and
/// decides which shape to build. Returns `None` when the response lacks
/// the fields that shape requires.
pub fn normalize_response(
    value: &Value,
    message: &RawMessage,
    roundup: bool,
) -> Option<InvestmentRecord> {
    if roundup {
        normalize_roundup(value, message)
    } else {
        normalize_single(value, message)
    }
}

fn normalize_roundup(value: &Value, message: &RawMessage) -> Option<InvestmentRecord> {
    let mut companies = str_list(value, &["companies", "company"]);
    let mut amounts: Vec<String> = str_list(value, &["amounts", "amount"])
        .into_iter()
        .map(|a| clean_monetary(&a))
        .collect();
    if companies.is_empty() {
        debug!(message = message.id, "roundup response without line items");
        companies = vec![ROUNDUP_PLACEHOLDER.to_string()];
        amounts.clear();
    }
    if !amounts.is_empty() && amounts.len() != companies.len() {
        debug!(
            message = message.id,
            companies = companies.len(),
            amounts = amounts.len(),
            "roundup arrays misaligned, dropping amounts"
        );
        amounts.clear();
    }
    Some(InvestmentRecord::Roundup(RoundupRecord {
        tag: RoundupTag::Roundup,
        company: companies,
        amount: amounts,
        acquisitions_in_roundup: nested_acquisitions(value),
        common: common_fields(value, message),
    }))
}

fn normalize_single(value: &Value, message: &RawMessage) -> Option<InvestmentRecord> {
    let structured = nested_acquisitions(value);
    let flat_acquirer = str_field(value, "acquirer");
    // The message itself counts as evidence: models regularly omit the
    // type field on acquisition posts.
    let is_acquisition = !structured.is_empty()
        || flat_acquirer.is_some()
        || str_field(value, "type")
            .map(|t| t.eq_ignore_ascii_case("acquisition"))
            .unwrap_or(false)
        || has_acquisition_vocabulary(&message.text);

    // A structured acquisition block is more reliable than the flat
    // fields when both are present.
    let lead = structured.first();
    let company = lead
        .map(|a| a.company.clone())
        .or_else(|| str_field(value, "company"))?;
    let acquirer = lead
        .map(|a| a.acquirer.clone())
        .filter(|a| !a.is_empty())
        .or(flat_acquirer)
        .filter(|_| is_acquisition);
    let amount = lead
        .and_then(|a| a.amount.clone())
        .or_else(|| str_field(value, "amount").map(|a| clean_monetary(&a)))
        .unwrap_or_else(|| "Undisclosed".to_string());

    Some(InvestmentRecord::Single(SingleRecord {
        event: if is_acquisition {
            EventKind::Acquisition
        } else {
            EventKind::Investment
        },
        company,
        amount,
        acquirer,
        common: common_fields(value, message),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message() -> RawMessage {
        RawMessage::new(7, "2024-03-01T10:00:00Z", "Foo raised $2M")
    }

    #[test]
    fn object_isolated_from_chatty_response() {
        let response = "Sure! Here is the JSON you asked for:\n{\"company\": \"Foo\"}\nHope that helps.";
        assert_eq!(isolate_object(response), Some("{\"company\": \"Foo\"}"));
    }

    #[test]
    fn unbalanced_braces_yield_none() {
        assert_eq!(isolate_object("no json here"), None);
        assert_eq!(isolate_object("} {"), None);
        assert_eq!(isolate_object("only opens {"), None);
    }

    #[test]
    fn single_record_normalized() {
        let value = json!({
            "type": "investment",
            "company": "Foo",
            "amount": "$2m",
            "round": "Seed",
            "investors": ["Alice", {"name": "Beta Fund", "description": "lead"}],
            "links": ["foo.io"]
        });
        let record = normalize_single(&value, &message()).unwrap();
        let InvestmentRecord::Single(single) = record else {
            panic!("expected single record");
        };
        assert_eq!(single.company, "Foo");
        assert_eq!(single.amount, "2M");
        assert_eq!(single.common.investors, vec!["Alice", "Beta Fund"]);
        assert_eq!(
            single
                .common
                .investor_notes
                .as_ref()
                .and_then(|n| n.get("Beta Fund"))
                .map(String::as_str),
            Some("lead")
        );
        assert_eq!(single.common.links, vec!["https://foo.io"]);
    }

    #[test]
    fn structured_acquisition_wins_over_flat_fields() {
        let value = json!({
            "company": "Wrong",
            "acquisitions": [
                {"company": "Target", "acquirer": "BigCo", "amount": "$100M"}
            ]
        });
        let record = normalize_single(&value, &message()).unwrap();
        let InvestmentRecord::Single(single) = record else {
            panic!("expected single record");
        };
        assert_eq!(single.event, EventKind::Acquisition);
        assert_eq!(single.company, "Target");
        assert_eq!(single.acquirer.as_deref(), Some("BigCo"));
        assert_eq!(single.amount, "100M");
    }

    #[test]
    fn acquisition_vocabulary_in_message_sets_event() {
        let value = json!({"company": "Foo", "amount": "5M"});
        let message = RawMessage::new(8, "2024-03-01T10:00:00Z", "BigCo has acquired Foo for $5M");
        let record = normalize_single(&value, &message).unwrap();
        let InvestmentRecord::Single(single) = record else {
            panic!("expected single record");
        };
        assert_eq!(single.event, EventKind::Acquisition);
        assert_eq!(single.company, "Foo");
    }

    #[test]
    fn missing_company_yields_none() {
        let value = json!({"amount": "$5M"});
        assert!(normalize_single(&value, &message()).is_none());
    }

    #[test]
    fn roundup_misaligned_amounts_dropped() {
        let value = json!({
            "companies": ["A", "B", "C"],
            "amounts": ["1M", "2M"]
        });
        let record = normalize_roundup(&value, &message()).unwrap();
        let InvestmentRecord::Roundup(roundup) = record else {
            panic!("expected roundup record");
        };
        assert_eq!(roundup.company, vec!["A", "B", "C"]);
        assert!(roundup.amount.is_empty());
    }

    #[test]
    fn empty_roundup_gets_placeholder() {
        let value = json!({"companies": []});
        let record = normalize_roundup(&value, &message()).unwrap();
        let InvestmentRecord::Roundup(roundup) = record else {
            panic!("expected roundup record");
        };
        assert_eq!(roundup.company, vec![ROUNDUP_PLACEHOLDER]);
        assert!(roundup.amount.is_empty());
    }
}
