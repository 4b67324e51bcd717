//! The canonical investment record - the one shape both extraction engines converge on

use crate::round::RoundType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a single record describes an investment or an acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A funding round raised by the company
    Investment,
    /// The company was acquired
    Acquisition,
}

/// Serialized `type` tag of a roundup record.
///
/// Exists so the untagged [`InvestmentRecord`] union can tell the two record
/// shapes apart purely from the `type` field during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoundupTag {
    /// Always `"roundup"`
    #[default]
    Roundup,
}

/// One acquisition line item nested inside a roundup digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedAcquisition {
    /// The company that was acquired
    pub company: String,
    /// The acquiring party
    pub acquirer: String,
    /// Normalized deal amount, when stated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

/// Fields shared by both record shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecordCommon {
    /// Timestamp string copied from the source message
    pub date: String,
    /// Original message text, retained for audit and debugging
    pub raw_text: String,
    /// Round label, when one could be determined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundType>,
    /// Cleaned investor names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub investors: Vec<String>,
    /// Optional free-text description per investor name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investor_notes: Option<BTreeMap<String, String>>,
    /// Optional one-line description of the company
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    /// Normalized valuation, when stated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valuation: Option<String>,
    /// Deduplicated absolute URLs found in the message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    /// True when this record was extracted as a line item of a roundup
    #[serde(default)]
    pub is_part_of_roundup: bool,
}

/// A single funding event: one company, one scalar amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleRecord {
    /// `"investment"` or `"acquisition"`
    #[serde(rename = "type")]
    pub event: EventKind,
    /// Company name, never empty on an emitted record
    pub company: String,
    /// Normalized amount (`<number>[.<decimals>](M|B)`) or `"Undisclosed"`
    pub amount: String,
    /// Acquiring party, present only for acquisitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquirer: Option<String>,
    /// Shared record fields
    #[serde(flatten)]
    pub common: RecordCommon,
}

/// A roundup digest: parallel company/amount lists plus nested acquisitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundupRecord {
    /// Always `"roundup"`
    #[serde(rename = "type")]
    pub tag: RoundupTag,
    /// Ordered company names, never empty on an emitted record
    pub company: Vec<String>,
    /// Amounts parallel to `company`; empty means "absent"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amount: Vec<String>,
    /// Acquisition sub-records mentioned inside the digest
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acquisitions_in_roundup: Vec<NestedAcquisition>,
    /// Shared record fields
    #[serde(flatten)]
    pub common: RecordCommon,
}

/// The canonical output unit of both extraction engines.
///
/// One schema serves two record shapes: a singular funding event with scalar
/// `company`/`amount`, and a roundup digest where those fields are parallel
/// ordered lists. Consumers branch on the variant instead of runtime-checking
/// whether a JSON field is a string or an array; the serialized form remains
/// the flat legacy shape with a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InvestmentRecord {
    /// One company, scalar amount (`type = investment | acquisition`)
    Single(SingleRecord),
    /// Parallel company/amount lists (`type = roundup`)
    Roundup(RoundupRecord),
}

impl InvestmentRecord {
    /// The serialized `type` tag of this record.
    pub fn record_type(&self) -> &'static str {
        match self {
            InvestmentRecord::Single(r) => match r.event {
                EventKind::Investment => "investment",
                EventKind::Acquisition => "acquisition",
            },
            InvestmentRecord::Roundup(_) => "roundup",
        }
    }

    /// Shared fields of either shape.
    pub fn common(&self) -> &RecordCommon {
        match self {
            InvestmentRecord::Single(r) => &r.common,
            InvestmentRecord::Roundup(r) => &r.common,
        }
    }

    /// Mutable access to the shared fields.
    pub fn common_mut(&mut self) -> &mut RecordCommon {
        match self {
            InvestmentRecord::Single(r) => &mut r.common,
            InvestmentRecord::Roundup(r) => &mut r.common,
        }
    }

    /// True when the company field is an empty string or an empty list.
    ///
    /// Records for which this holds are discarded, never emitted.
    pub fn has_empty_company(&self) -> bool {
        match self {
            InvestmentRecord::Single(r) => r.company.trim().is_empty(),
            InvestmentRecord::Roundup(r) => {
                r.company.is_empty() || r.company.iter().all(|c| c.trim().is_empty())
            }
        }
    }

    /// All company names carried by this record, in order.
    pub fn companies(&self) -> Vec<&str> {
        match self {
            InvestmentRecord::Single(r) => vec![r.company.as_str()],
            InvestmentRecord::Roundup(r) => r.company.iter().map(String::as_str).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(company: &str) -> InvestmentRecord {
        InvestmentRecord::Single(SingleRecord {
            event: EventKind::Investment,
            company: company.to_string(),
            amount: "1.5M".to_string(),
            acquirer: None,
            common: RecordCommon {
                date: "2024-05-01T00:00:00Z".to_string(),
                raw_text: "text".to_string(),
                ..Default::default()
            },
        })
    }

    #[test]
    fn test_single_serializes_flat_with_type_tag() {
        let json = serde_json::to_value(single("Acme")).unwrap();
        assert_eq!(json["type"], "investment");
        assert_eq!(json["company"], "Acme");
        assert_eq!(json["amount"], "1.5M");
        assert_eq!(json["rawText"], "text");
        // Absent options are omitted entirely
        assert!(json.get("acquirer").is_none());
        assert!(json.get("round").is_none());
    }

    #[test]
    fn test_roundup_serializes_parallel_arrays() {
        let record = InvestmentRecord::Roundup(RoundupRecord {
            tag: RoundupTag::Roundup,
            company: vec!["Acme".into(), "Beta".into()],
            amount: vec!["10M".into(), "2.5M".into()],
            acquisitions_in_roundup: vec![],
            common: RecordCommon::default(),
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "roundup");
        assert_eq!(json["company"][1], "Beta");
        assert_eq!(json["amount"][0], "10M");
    }

    #[test]
    fn test_untagged_deserialization_branches_on_type() {
        let single: InvestmentRecord = serde_json::from_str(
            r#"{"type":"acquisition","company":"Foo","amount":"Undisclosed",
                "acquirer":"Bar","date":"d","rawText":"t"}"#,
        )
        .unwrap();
        assert_eq!(single.record_type(), "acquisition");

        let roundup: InvestmentRecord = serde_json::from_str(
            r#"{"type":"roundup","company":["Foo"],"amount":["1M"],"date":"d","rawText":"t"}"#,
        )
        .unwrap();
        assert_eq!(roundup.record_type(), "roundup");
    }

    #[test]
    fn test_empty_company_detection() {
        assert!(single("").has_empty_company());
        assert!(single("   ").has_empty_company());
        assert!(!single("Acme").has_empty_company());

        let empty_roundup = InvestmentRecord::Roundup(RoundupRecord {
            tag: RoundupTag::Roundup,
            company: vec![],
            amount: vec![],
            acquisitions_in_roundup: vec![],
            common: RecordCommon::default(),
        });
        assert!(empty_roundup.has_empty_company());
    }
}
