//! The deterministic extraction engine.
//!
//! Pure pattern matching over message text: no network, no model, and the
//! same record for the same input every time. Every rule is best-effort;
//! anything the patterns cannot recover is simply absent from the record,
//! and a message with no recoverable company yields `None`.

use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use fundwire_domain::{
    EventKind, ExtractError, ExtractionEngine, InvestmentRecord, NestedAcquisition, RawMessage,
    RecordCommon, RoundupRecord, RoundupTag, SingleRecord,
};

use crate::normalize::{
    amount_with_unit, clean_company, clean_investor_list, extract_links, match_round,
    unit_from_token, Unit,
};

/// Vocabulary that marks a message as funding-related at all.
///
/// Checked verbatim, so capitalized forms catch headline usage while the
/// lowercase verbs catch prose.
const FUNDING_KEYWORDS: &[&str] = &["Round", "raised", "acquired", "Funding", "$"];

/// True when the text carries any funding vocabulary. Messages failing this
/// gate are skipped by both engines without further work.
pub fn has_funding_vocabulary(text: &str) -> bool {
    FUNDING_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// True when the text talks about an acquisition rather than a raise.
/// Both engines classify the event from the raw message with this, so a
/// model response that omits the `type` field still lands on the right one.
pub fn has_acquisition_vocabulary(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("acquired") || lower.contains("acquisition")
}

/// Recognizes weekly-digest headlines ("Top 5 Rounds of This Week").
///
/// Shared by both engines: the deterministic engine branches into its
/// line-item scanner on a match, and the AI engine picks the roundup prompt.
pub struct RoundupDetector {
    headlines: Vec<Regex>,
}

impl RoundupDetector {
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = [
            r"(?i)\btop\s+\d+[^\n]{0,40}?rounds?\b",
            r"(?i)\b(?:top|best|biggest|largest)\s+(?:funding\s+)?rounds?\s+of\s+(?:this|the|last)\s+(?:week|month)",
            r"(?i)\brounds?\s+of\s+(?:january|february|march|april|may|june|july|august|september|october|november|december)\b",
            r"(?i)\bweekly\s+(?:funding\s+)?round-?up\b",
        ];
        let headlines = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headlines })
    }

    /// True when any line of `text` reads like a roundup headline.
    pub fn is_roundup(&self, text: &str) -> bool {
        self.headlines.iter().any(|re| re.is_match(text))
    }

    fn line_is_headline(&self, line: &str) -> bool {
        self.headlines.iter().any(|re| re.is_match(line))
    }
}

/// Regex-driven engine producing canonical records without a model call.
pub struct HeuristicEngine {
    detector: RoundupDetector,
    // Monetary tokens
    amount_suffixed: Regex,
    amount_worded: Regex,
    amount_full_number: Regex,
    // Company title patterns
    title_amount: Regex,
    title_round: Regex,
    about_section: Regex,
    has_acquired: Regex,
    acquired_by_title: Regex,
    // Acquisition sentences and sections
    acquisition_line: Regex,
    acquired_by_inline: Regex,
    // Sections
    investors_header: Regex,
    acquired_by_header: Regex,
    header_line: Regex,
    // Valuation
    valuation_before: Regex,
    valuation_after: Regex,
}

impl HeuristicEngine {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            detector: RoundupDetector::new()?,
            amount_suffixed: Regex::new(
                r"\$\s*(?P<num>[0-9][0-9,]*(?:\.[0-9]+)?)\s*(?P<unit>[MmBbKk])\b",
            )?,
            amount_worded: Regex::new(
                r"(?i)\$\s*(?P<num>[0-9][0-9,]*(?:\.[0-9]+)?)\s*(?P<unit>million|billion|thousand|[MBK])\b",
            )?,
            amount_full_number: Regex::new(r"\$\s*(?P<num>[0-9]{1,3}(?:,[0-9]{3})+|[0-9]{5,})")?,
            title_amount: Regex::new(
                r"^\W*(?P<c>[\w][\w .&'-]{0,60}?)(?:\s+(?i:raises|raised|closes|closed|secures|secured|lands|announces|nets)\b|\s*[-–—:])[^\n]*\$[0-9]",
            )?,
            title_round: Regex::new(r"^\W*(?P<c>[\w][\w .&'-]{0,60}?)\s*[-–—:|]")?,
            about_section: Regex::new(r"(?i)\babout\s*:\s*(?P<body>[^\n.]+)")?,
            has_acquired: Regex::new(
                r"(?i)\bhas acquired\s+(?P<c>[A-Za-z0-9][A-Za-z0-9&' -]{0,60})",
            )?,
            acquired_by_title: Regex::new(
                r"(?m)^\W*(?P<c>[\w][\w &'-]{0,60}?)\s+(?i:acquired\s+by)\b",
            )?,
            acquisition_line: Regex::new(
                r"(?m)(?P<acquirer>[A-Z][A-Za-z0-9&' -]{0,40}?)\s+(?:has\s+)?acquired\s+(?P<target>[A-Z][A-Za-z0-9&' -]{0,40}?)(?:\s+for\s+\$\s*(?P<num>[0-9][0-9,]*(?:\.[0-9]+)?)\s*(?P<unit>[Mm]illion|[Bb]illion|[MmBbKk])?)?\s*(?:[.,;!)\n]|$)",
            )?,
            acquired_by_inline: Regex::new(
                r"(?i)\bacquired by\s*:?\s*(?P<a>[A-Za-z0-9][A-Za-z0-9&' -]{0,60})",
            )?,
            investors_header: Regex::new(r"(?i)\b(?:lead\s+)?investor\(?s\)?\s*:")?,
            acquired_by_header: Regex::new(r"(?i)\bacquired\s+by\s*:")?,
            header_line: Regex::new(r"^[A-Za-z][\w ()/&'-]{0,30}:")?,
            valuation_before: Regex::new(
                r"(?i)\$\s*(?P<num>[0-9][0-9,]*(?:\.[0-9]+)?)\s*(?P<unit>million|billion|[MBK])\s+(?:pre-money\s+|post-money\s+)?valuation",
            )?,
            valuation_after: Regex::new(
                r"(?i)\bvaluation\s*(?:of|at|:)?\s*\$\s*(?P<num>[0-9][0-9,]*(?:\.[0-9]+)?)\s*(?P<unit>million|billion|[MBK])?",
            )?,
        })
    }

    /// Extracts zero or one record from a message. Deterministic and total:
    /// never errors, never panics on arbitrary text.
    pub fn extract(&self, message: &RawMessage) -> Option<InvestmentRecord> {
        let text = message.text.trim();
        if text.is_empty() || !has_funding_vocabulary(text) {
            return None;
        }
        let record = if self.detector.is_roundup(text) {
            self.parse_roundup(message, text)
        } else {
            self.parse_single(message, text)
        }?;
        if record.has_empty_company() {
            debug!(message = message.id, "record discarded, empty company");
            return None;
        }
        Some(record)
    }

    // ---- roundup path ----

    fn parse_roundup(&self, message: &RawMessage, text: &str) -> Option<InvestmentRecord> {
        let mut companies = Vec::new();
        let mut amounts = Vec::new();
        let mut seen = HashSet::new();

        for raw_line in text.lines() {
            let mut line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            // A headline can carry line items after its colon; without one
            // it contributes nothing.
            if self.detector.line_is_headline(line) {
                match line.split_once(':') {
                    Some((_, rest)) => line = rest.trim(),
                    None => continue,
                }
                if line.is_empty() {
                    continue;
                }
            }
            for segment in line.split(',') {
                let segment = segment.trim();
                let Some(caps) = self.amount_suffixed.captures(segment) else {
                    continue;
                };
                let Some(whole) = caps.get(0) else { continue };
                let company = clean_company(&segment[..whole.start()]);
                // A single leading letter is a list marker, not a company.
                if company.chars().count() <= 1 {
                    continue;
                }
                if !seen.insert(company.to_lowercase()) {
                    continue;
                }
                let Ok(value) = caps["num"].replace(',', "").parse::<f64>() else {
                    continue;
                };
                let unit = caps
                    .name("unit")
                    .and_then(|m| unit_from_token(m.as_str()))
                    .unwrap_or(Unit::Million);
                companies.push(company);
                amounts.push(amount_with_unit(value, unit));
            }
        }

        if companies.is_empty() {
            debug!(message = message.id, "roundup with no recoverable line items");
            return None;
        }
        Some(InvestmentRecord::Roundup(RoundupRecord {
            tag: RoundupTag::Roundup,
            company: companies,
            amount: amounts,
            acquisitions_in_roundup: self.scan_acquisitions(text),
            common: RecordCommon {
                date: message.date.clone(),
                raw_text: message.text.clone(),
                links: extract_links(text),
                ..Default::default()
            },
        }))
    }

    fn scan_acquisitions(&self, text: &str) -> Vec<NestedAcquisition> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for caps in self.acquisition_line.captures_iter(text) {
            let target = clean_company(cut_at_connectives(&caps["target"]));
            let acquirer = clean_company(cut_at_connectives(&caps["acquirer"]));
            if target.is_empty() || acquirer.is_empty() {
                continue;
            }
            if !seen.insert(target.to_lowercase()) {
                continue;
            }
            let amount = caps.name("num").and_then(|num| {
                let value: f64 = num.as_str().replace(',', "").parse().ok()?;
                let unit = caps
                    .name("unit")
                    .and_then(|m| unit_from_token(m.as_str()))
                    .unwrap_or(Unit::Million);
                Some(amount_with_unit(value, unit))
            });
            out.push(NestedAcquisition {
                company: target,
                acquirer,
                amount,
            });
        }
        out
    }

    // ---- singular path ----

    fn parse_single(&self, message: &RawMessage, text: &str) -> Option<InvestmentRecord> {
        let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
        let event = if has_acquisition_vocabulary(text) {
            EventKind::Acquisition
        } else {
            EventKind::Investment
        };

        let company = self.extract_company(text, first_line)?;
        let (investors, investor_notes) = self.extract_investors(text, event);
        let acquirer = match event {
            EventKind::Acquisition => self.extract_acquirer(text),
            EventKind::Investment => None,
        };

        Some(InvestmentRecord::Single(SingleRecord {
            event,
            company,
            amount: self.extract_amount(text, first_line),
            acquirer,
            common: RecordCommon {
                date: message.date.clone(),
                raw_text: message.text.clone(),
                round: match_round(first_line).or_else(|| match_round(text)),
                investors,
                investor_notes,
                about: self.extract_about(text),
                valuation: self.extract_valuation(text),
                links: extract_links(text),
                is_part_of_roundup: false,
            },
        }))
    }

    /// Company resolution runs an ordered strategy list; the first strategy
    /// yielding a non-empty cleaned name wins.
    fn extract_company(&self, text: &str, first_line: &str) -> Option<String> {
        type Strategy = fn(&HeuristicEngine, &str, &str) -> Option<String>;
        let strategies: [(&str, Strategy); 5] = [
            ("title-amount", Self::company_from_title_amount),
            ("title-round", Self::company_from_title_round),
            ("about-section", Self::company_from_about),
            ("acquisition-phrase", Self::company_from_acquisition),
            ("first-line", Self::company_from_first_line),
        ];
        for (name, strategy) in strategies {
            if let Some(raw) = strategy(self, text, first_line) {
                let company = clean_company(&raw);
                if !company.is_empty() {
                    debug!(strategy = name, company = %company, "company resolved");
                    return Some(company);
                }
            }
        }
        None
    }

    /// "Acme raises $10M in Seed" / "Acme - $10M Seed Round".
    fn company_from_title_amount(&self, _text: &str, first_line: &str) -> Option<String> {
        match_round(first_line)?;
        self.title_amount
            .captures(first_line)
            .map(|c| c["c"].to_string())
    }

    /// "Acme - Seed Round" style titles without an amount.
    fn company_from_title_round(&self, _text: &str, first_line: &str) -> Option<String> {
        match_round(first_line)?;
        self.title_round
            .captures(first_line)
            .map(|c| c["c"].to_string())
    }

    /// "About: Acme is a ..." yields the subject of the first sentence.
    fn company_from_about(&self, text: &str, _first_line: &str) -> Option<String> {
        let caps = self.about_section.captures(text)?;
        let sentence = caps["body"].trim();
        let head = sentence.split(" is ").next().unwrap_or(sentence).trim();
        // Without an " is " boundary a long sentence is not a name.
        if head.len() == sentence.len() && head.split_whitespace().count() > 6 {
            return None;
        }
        (!head.is_empty()).then(|| head.to_string())
    }

    /// "BigCo has acquired Acme" or "Acme acquired by BigCo".
    fn company_from_acquisition(&self, text: &str, _first_line: &str) -> Option<String> {
        if let Some(caps) = self.has_acquired.captures(text) {
            return Some(cut_at_connectives(&caps["c"]).to_string());
        }
        self.acquired_by_title
            .captures(text)
            .map(|c| c["c"].to_string())
    }

    /// Last resort: the first line cut at the first separator or funding verb.
    fn company_from_first_line(&self, _text: &str, first_line: &str) -> Option<String> {
        let line = clean_company(first_line);
        if line.is_empty() {
            return None;
        }
        let mut cut = line.len();
        for sep in ["!", ".", ":", ";", "–", "—", " - ", "$", "("] {
            if let Some(pos) = line.find(sep) {
                cut = cut.min(pos);
            }
        }
        let lower = line.to_lowercase();
        if lower.len() == line.len() {
            for verb in [
                " raises", " raised", " closes", " closed", " secures", " secured", " announces",
                " lands", " nets", " just",
            ] {
                if let Some(pos) = lower.find(verb) {
                    cut = cut.min(pos);
                }
            }
        }
        let head = clean_company(&line[..cut]);
        if !head.is_empty() {
            return Some(head);
        }
        Some(line.chars().take(80).collect())
    }

    /// Amount resolution: explicit $N(M|B|K) on the first line, then worded
    /// magnitudes anywhere, then full dollar figures, else "Undisclosed".
    fn extract_amount(&self, text: &str, first_line: &str) -> String {
        for (source, re) in [
            (first_line, &self.amount_suffixed),
            (text, &self.amount_suffixed),
            (text, &self.amount_worded),
        ] {
            if let Some(caps) = re.captures(source) {
                if let Ok(value) = caps["num"].replace(',', "").parse::<f64>() {
                    let unit = caps
                        .name("unit")
                        .and_then(|m| unit_from_token(m.as_str()))
                        .unwrap_or(Unit::Million);
                    return amount_with_unit(value, unit);
                }
            }
        }
        if let Some(caps) = self.amount_full_number.captures(text) {
            if let Ok(value) = caps["num"].replace(',', "").parse::<f64>() {
                let millions = (value / 1_000_000.0 * 100.0).round() / 100.0;
                if millions > 0.0 {
                    return format!("{millions}M");
                }
            }
        }
        "Undisclosed".to_string()
    }

    /// Investors come from an "Investor(s):" section; acquisition posts
    /// usually carry an "Acquired by:" section instead, so that body is the
    /// fallback for them. Keeps acquirers countable alongside investors.
    fn extract_investors(
        &self,
        text: &str,
        event: EventKind,
    ) -> (Vec<String>, Option<std::collections::BTreeMap<String, String>>) {
        let body = self
            .section_body(text, &self.investors_header)
            .or_else(|| match event {
                EventKind::Acquisition => self.section_body(text, &self.acquired_by_header),
                EventKind::Investment => None,
            });
        let Some(body) = body else {
            return (Vec::new(), None);
        };
        let (names, notes) = clean_investor_list(&body);
        (names, (!notes.is_empty()).then_some(notes))
    }

    fn extract_acquirer(&self, text: &str) -> Option<String> {
        if let Some(caps) = self.acquired_by_inline.captures(text) {
            let acquirer = clean_company(cut_at_connectives(&caps["a"]));
            if !acquirer.is_empty() {
                return Some(acquirer);
            }
        }
        self.scan_acquisitions(text)
            .into_iter()
            .next()
            .map(|a| a.acquirer)
    }

    fn extract_about(&self, text: &str) -> Option<String> {
        let caps = self.about_section.captures(text)?;
        let body = caps["body"].trim().to_string();
        (!body.is_empty()).then_some(body)
    }

    fn extract_valuation(&self, text: &str) -> Option<String> {
        for re in [&self.valuation_before, &self.valuation_after] {
            if let Some(caps) = re.captures(text) {
                let Ok(value) = caps["num"].replace(',', "").parse::<f64>() else {
                    continue;
                };
                let unit = caps
                    .name("unit")
                    .and_then(|m| unit_from_token(m.as_str()))
                    .unwrap_or(Unit::Million);
                return Some(amount_with_unit(value, unit));
            }
        }
        None
    }

    /// Text of a labeled section: the remainder of the header's own line
    /// plus following lines until a blank line or the next header.
    fn section_body(&self, text: &str, header: &Regex) -> Option<String> {
        let found = header.find(text)?;
        let after = &text[found.end()..];
        let mut body_lines = Vec::new();
        for (i, line) in after.lines().enumerate() {
            let trimmed = line.trim();
            if i == 0 {
                body_lines.push(trimmed);
                continue;
            }
            if trimmed.is_empty() || self.header_line.is_match(trimmed) {
                break;
            }
            body_lines.push(trimmed);
        }
        let body = body_lines.join("\n");
        (!body.trim().is_empty()).then_some(body)
    }
}

/// Drops trailing clauses the lazy capture groups cannot exclude
/// ("Acme Labs for" becomes "Acme Labs").
fn cut_at_connectives(captured: &str) -> &str {
    let mut cut = captured.len();
    for word in [" for ", " in ", " to ", " with ", " from "] {
        if let Some(pos) = captured.find(word) {
            cut = cut.min(pos);
        }
    }
    captured[..cut].trim()
}

#[async_trait]
impl ExtractionEngine for HeuristicEngine {
    async fn parse(
        &mut self,
        message: &RawMessage,
    ) -> Result<Option<InvestmentRecord>, ExtractError> {
        Ok(self.extract(message))
    }
}
