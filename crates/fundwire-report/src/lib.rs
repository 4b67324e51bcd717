//! Fundwire Aggregation Layer
//!
//! Read-only summaries over extracted records and raw channels. No record is
//! ever mutated during aggregation; everything here is frequency counting
//! over borrowed data.

#![warn(missing_docs)]

use fundwire_domain::{InvestmentRecord, RawMessage};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How many investors the leaderboard keeps.
const TOP_INVESTORS: usize = 20;

/// How many keywords the channel summary keeps.
const TOP_KEYWORDS: usize = 20;

/// One investor with its appearance count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorCount {
    /// Cleaned investor name
    pub name: String,
    /// Number of records the investor appears in
    pub count: u64,
}

/// The persisted investments summary for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSummary {
    /// Number of records summarized
    pub total_investments: usize,
    /// Record count per `type` tag
    pub investments_by_type: BTreeMap<String, u64>,
    /// Up to twenty most frequent investors. Ordering between equal counts
    /// is stable first-seen order but is not a contract.
    pub top_investors: Vec<InvestorCount>,
    /// Record count per round label, with typed fallbacks for records that
    /// carry no explicit round
    pub round_distribution: BTreeMap<String, u64>,
    /// The records themselves
    pub investments: Vec<InvestmentRecord>,
    /// Optional grouping of records by company name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investments_by_company: Option<BTreeMap<String, Vec<InvestmentRecord>>>,
}

/// The persisted per-channel message summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    /// Messages fetched for the channel
    pub total_messages: usize,
    /// Distinct company mentions, first-seen order
    pub companies: Vec<String>,
    /// Distinct protocol mentions, first-seen order
    pub protocols: Vec<String>,
    /// Distinct theme tags, first-seen order
    pub themes: Vec<String>,
    /// Most frequent keywords
    pub top_keywords: Vec<String>,
}

/// Summarize extracted records; `group_by_company` additionally buckets the
/// records per company name.
pub fn summarize(records: &[InvestmentRecord], group_by_company: bool) -> InvestmentSummary {
    let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
    let mut rounds: BTreeMap<String, u64> = BTreeMap::new();
    // name -> (first-seen rank, count)
    let mut investor_counts: HashMap<String, (usize, u64)> = HashMap::new();
    let mut next_rank = 0usize;

    for record in records {
        *by_type.entry(record.record_type().to_string()).or_insert(0) += 1;

        let round_key = match record.common().round {
            Some(round) => round.label().to_string(),
            None => match record.record_type() {
                "acquisition" => "Acquisition".to_string(),
                "roundup" => "Roundup".to_string(),
                _ => "Other".to_string(),
            },
        };
        *rounds.entry(round_key).or_insert(0) += 1;

        for investor in &record.common().investors {
            let entry = investor_counts.entry(investor.clone()).or_insert_with(|| {
                let rank = next_rank;
                next_rank += 1;
                (rank, 0)
            });
            entry.1 += 1;
        }
    }

    let mut leaderboard: Vec<(String, usize, u64)> = investor_counts
        .into_iter()
        .map(|(name, (rank, count))| (name, rank, count))
        .collect();
    leaderboard.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    let top_investors = leaderboard
        .into_iter()
        .take(TOP_INVESTORS)
        .map(|(name, _, count)| InvestorCount { name, count })
        .collect();

    let investments_by_company = group_by_company.then(|| {
        let mut grouped: BTreeMap<String, Vec<InvestmentRecord>> = BTreeMap::new();
        for record in records {
            for company in record.companies() {
                grouped
                    .entry(company.to_string())
                    .or_default()
                    .push(record.clone());
            }
        }
        grouped
    });

    InvestmentSummary {
        total_investments: records.len(),
        investments_by_type: by_type,
        top_investors,
        round_distribution: rounds,
        investments: records.to_vec(),
        investments_by_company,
    }
}

/// Summarize a channel's raw messages from their attached entity bundles.
pub fn summarize_channel(messages: &[RawMessage]) -> ChannelSummary {
    let mut companies = Vec::new();
    let mut protocols = Vec::new();
    let mut themes = Vec::new();
    let mut keyword_counts: HashMap<String, (usize, u64)> = HashMap::new();
    let mut next_rank = 0usize;

    let push_distinct = |seen: &mut Vec<String>, value: &str| {
        if !seen.iter().any(|v| v == value) {
            seen.push(value.to_string());
        }
    };

    for message in messages {
        let Some(entities) = &message.entities else {
            continue;
        };
        for company in &entities.companies {
            push_distinct(&mut companies, company);
        }
        for protocol in &entities.protocols {
            push_distinct(&mut protocols, protocol);
        }
        for theme in &entities.themes {
            push_distinct(&mut themes, theme);
        }
        for keyword in &entities.keywords {
            let entry = keyword_counts.entry(keyword.clone()).or_insert_with(|| {
                let rank = next_rank;
                next_rank += 1;
                (rank, 0)
            });
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<(String, usize, u64)> = keyword_counts
        .into_iter()
        .map(|(word, (rank, count))| (word, rank, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    let top_keywords = ranked
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(word, _, _)| word)
        .collect();

    ChannelSummary {
        total_messages: messages.len(),
        companies,
        protocols,
        themes,
        top_keywords,
    }
}
