//! Closed vocabulary of funding round labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// The round-type vocabulary a record may carry.
///
/// The set is closed: extraction never invents new labels, it either maps a
/// phrase onto one of these or leaves the field absent. Serialized forms match
/// the labels used in persisted output files ("Pre-Seed", "Series A", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundType {
    /// Pre-seed round
    #[serde(rename = "Pre-Seed")]
    PreSeed,
    /// Seed round
    Seed,
    /// Angel round
    #[serde(rename = "Angel Round")]
    Angel,
    /// Series A
    #[serde(rename = "Series A")]
    SeriesA,
    /// Series B
    #[serde(rename = "Series B")]
    SeriesB,
    /// Series C
    #[serde(rename = "Series C")]
    SeriesC,
    /// Strategic investment
    Strategic,
    /// Token sale
    #[serde(rename = "Token Sale")]
    TokenSale,
    /// Private token/equity sale
    #[serde(rename = "Private Sale")]
    PrivateSale,
    /// Generic funding round
    Funding,
    /// Pre-Series A
    #[serde(rename = "Pre-Series A")]
    PreSeriesA,
    /// Private round
    #[serde(rename = "Private Round")]
    PrivateRound,
}

impl RoundType {
    /// The display label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            RoundType::PreSeed => "Pre-Seed",
            RoundType::Seed => "Seed",
            RoundType::Angel => "Angel Round",
            RoundType::SeriesA => "Series A",
            RoundType::SeriesB => "Series B",
            RoundType::SeriesC => "Series C",
            RoundType::Strategic => "Strategic",
            RoundType::TokenSale => "Token Sale",
            RoundType::PrivateSale => "Private Sale",
            RoundType::Funding => "Funding",
            RoundType::PreSeriesA => "Pre-Series A",
            RoundType::PrivateRound => "Private Round",
        }
    }

    /// Parse a label back into its variant.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Pre-Seed" => Some(RoundType::PreSeed),
            "Seed" => Some(RoundType::Seed),
            "Angel Round" => Some(RoundType::Angel),
            "Series A" => Some(RoundType::SeriesA),
            "Series B" => Some(RoundType::SeriesB),
            "Series C" => Some(RoundType::SeriesC),
            "Strategic" => Some(RoundType::Strategic),
            "Token Sale" => Some(RoundType::TokenSale),
            "Private Sale" => Some(RoundType::PrivateSale),
            "Funding" => Some(RoundType::Funding),
            "Pre-Series A" => Some(RoundType::PreSeriesA),
            "Private Round" => Some(RoundType::PrivateRound),
            _ => None,
        }
    }
}

impl fmt::Display for RoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for round in [
            RoundType::PreSeed,
            RoundType::Seed,
            RoundType::Angel,
            RoundType::SeriesA,
            RoundType::SeriesB,
            RoundType::SeriesC,
            RoundType::Strategic,
            RoundType::TokenSale,
            RoundType::PrivateSale,
            RoundType::Funding,
            RoundType::PreSeriesA,
            RoundType::PrivateRound,
        ] {
            assert_eq!(RoundType::from_label(round.label()), Some(round));
        }
    }

    #[test]
    fn test_serialized_form_matches_label() {
        let json = serde_json::to_string(&RoundType::PreSeriesA).unwrap();
        assert_eq!(json, "\"Pre-Series A\"");

        let parsed: RoundType = serde_json::from_str("\"Angel Round\"").unwrap();
        assert_eq!(parsed, RoundType::Angel);
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(RoundType::from_label("Series D"), None);
    }
}
