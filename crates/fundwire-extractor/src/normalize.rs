//! Field normalizers shared by the deterministic and model-backed engines.
//!
//! Both engines produce the same record shape, so cleanup of amounts,
//! links, investor names and round labels lives here rather than in
//! either engine.

use std::collections::BTreeMap;

use fundwire_domain::RoundType;

/// Magnitude units recognized in monetary tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// "M", "million"
    Million,
    /// "B", "billion"
    Billion,
    /// "K", "thousand"; folded into millions on output.
    Thousand,
}

/// Maps a unit token ("M", "billion", "k", ...) to a [`Unit`].
pub fn unit_from_token(token: &str) -> Option<Unit> {
    match token.to_ascii_lowercase().as_str() {
        "m" | "million" => Some(Unit::Million),
        "b" | "billion" => Some(Unit::Billion),
        "k" | "thousand" => Some(Unit::Thousand),
        _ => None,
    }
}

/// Renders a numeric magnitude without trailing zeros ("1.50" becomes "1.5").
fn format_magnitude(value: f64) -> String {
    let rendered = format!("{value:.2}");
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Canonical amount string for a value and unit.
///
/// Thousands are converted to millions rounded to two decimals, so
/// "$500K" comes out as "0.5M".
pub fn amount_with_unit(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Million => format!("{}M", format_magnitude(value)),
        Unit::Billion => format!("{}B", format_magnitude(value)),
        Unit::Thousand => {
            let millions = (value / 1000.0 * 100.0).round() / 100.0;
            format!("{millions}M")
        }
    }
}

/// Strips currency symbols and thousands separators from a monetary string
/// and folds its magnitude into the canonical "1.5M" shape. Worded units
/// ("1.5 million") and full dollar figures ("2500000") are converted;
/// anything unrecognized is left as-is after symbol stripping.
pub fn clean_monetary(value: &str) -> String {
    let stripped: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ','))
        .collect();
    let stripped = stripped.trim().to_string();
    if stripped.eq_ignore_ascii_case("undisclosed") {
        return "Undisclosed".to_string();
    }
    // "1.5m" -> "1.5M" when the token is a plain number plus magnitude.
    if stripped.chars().last().is_some_and(|c| c.is_ascii_alphabetic()) {
        let (head, tail) = stripped.split_at(stripped.len() - 1);
        if let (Ok(value), Some(unit)) = (head.parse::<f64>(), unit_from_token(tail)) {
            return amount_with_unit(value, unit);
        }
    }
    // "1.5 million" and similar worded magnitudes.
    let mut parts = stripped.split_whitespace();
    if let (Some(num), Some(word), None) = (parts.next(), parts.next(), parts.next()) {
        if let (Ok(value), Some(unit)) = (num.parse::<f64>(), unit_from_token(word)) {
            return amount_with_unit(value, unit);
        }
    }
    // Full dollar figures fold into millions.
    if let Ok(value) = stripped.parse::<f64>() {
        if value >= 10_000.0 {
            return amount_with_unit(value / 1_000_000.0, Unit::Million);
        }
    }
    stripped
}

/// Domain suffixes that mark a schemeless token as a probable URL.
const URL_SUFFIXES: &[&str] = &[
    ".com", ".io", ".xyz", ".org", ".net", ".co", ".me", ".app", ".ai", ".fi", ".finance",
    ".network", ".exchange", ".capital", ".fund", ".vc",
];

/// Abbreviations that look like domains but never are.
const NON_URL_LITERALS: &[&str] = &["e.g", "i.e", "etc", "vs", "approx"];

fn is_bare_amount(token: &str) -> bool {
    let mut chars = token.chars().peekable();
    let mut saw_digit = false;
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' || c == ',' {
            saw_digit |= c.is_ascii_digit();
            chars.next();
        } else {
            break;
        }
    }
    let rest: String = chars.collect();
    saw_digit && (rest.is_empty() || matches!(rest.as_str(), "M" | "B" | "K" | "m" | "b" | "k"))
}

/// Canonicalizes a whitespace token into a URL, or rejects it.
///
/// Tokens with an explicit scheme pass through unchanged. Schemeless
/// tokens must carry a dot and either a "www." prefix or a known domain
/// suffix, and get an "https://" prefix. Bare amounts like "1.5M" and
/// abbreviations like "e.g." are never links.
pub fn canonical_link(token: &str) -> Option<String> {
    let token = token
        .trim()
        .trim_start_matches(['(', '[', '<'])
        .trim_end_matches([',', ';', ')', ']', '>', '!', '?', '.']);
    if token.is_empty() {
        return None;
    }
    if token.starts_with("http://") || token.starts_with("https://") {
        return Some(token.to_string());
    }
    if !token.contains('.') {
        return None;
    }
    let lower = token.to_ascii_lowercase();
    if NON_URL_LITERALS.contains(&lower.as_str()) {
        return None;
    }
    if is_bare_amount(token) {
        return None;
    }
    let domain = lower.split('/').next().unwrap_or(&lower);
    let looks_like_url =
        lower.starts_with("www.") || URL_SUFFIXES.iter().any(|s| domain.ends_with(s));
    if !looks_like_url {
        return None;
    }
    Some(format!("https://{token}"))
}

/// Scans free text for URL-like tokens, deduplicating in order of appearance.
pub fn extract_links(text: &str) -> Vec<String> {
    let mut links = Vec::new();
    for token in text.split_whitespace() {
        if let Some(link) = canonical_link(token) {
            if !links.contains(&link) {
                links.push(link);
            }
        }
    }
    links
}

/// Phrase separators that split an investor entry into name and note.
const NOTE_SEPARATORS: &[&str] = &[
    ",", " — ", " – ", " - ", " (", " who ", " which ", " led ", " leading ",
];

/// Cleans one investor entry into a name and an optional descriptive note.
///
/// Returns `None` when nothing name-like is left after cleanup.
pub fn clean_investor(raw: &str) -> Option<(String, Option<String>)> {
    let mut entry = raw.trim().trim_start_matches(['-', '–', '—', '•', '*']).trim();
    if let Some(rest) = entry.strip_prefix("and ") {
        entry = rest.trim_start();
    }
    let split_at = NOTE_SEPARATORS
        .iter()
        .filter_map(|sep| entry.find(sep).map(|pos| (pos, sep.len())))
        .min_by_key(|&(pos, _)| pos);
    let (name, note) = match split_at {
        Some((pos, sep_len)) => {
            let note = entry[pos + sep_len..]
                .trim()
                .trim_end_matches([')', '.'])
                .to_string();
            (&entry[..pos], (!note.is_empty()).then_some(note))
        }
        None => (entry, None),
    };
    let name = name
        .trim()
        .trim_end_matches(['.', ':', ';'])
        .trim()
        .to_string();
    (!name.is_empty()).then_some((name, note))
}

/// Splits an investor section body into cleaned names plus a notes map.
pub fn clean_investor_list(body: &str) -> (Vec<String>, BTreeMap<String, String>) {
    let mut names = Vec::new();
    let mut notes = BTreeMap::new();
    let joined = body.replace(" and ", ", ");
    for entry in joined.split(['\n', ',']) {
        if let Some((name, note)) = clean_investor(entry) {
            if names.iter().any(|n: &String| n.eq_ignore_ascii_case(&name)) {
                continue;
            }
            if let Some(note) = note {
                notes.insert(name.clone(), note);
            }
            names.push(name);
        }
    }
    (names, notes)
}

/// Ordered round-label phrases; the first match wins, so longer phrases
/// like "pre-seed" come before their substrings.
const ROUND_PHRASES: &[(&str, RoundType)] = &[
    ("pre-seed", RoundType::PreSeed),
    ("pre seed", RoundType::PreSeed),
    ("preseed", RoundType::PreSeed),
    ("pre-series a", RoundType::PreSeriesA),
    ("pre series a", RoundType::PreSeriesA),
    ("seed", RoundType::Seed),
    ("angel", RoundType::Angel),
    ("series a", RoundType::SeriesA),
    ("series b", RoundType::SeriesB),
    ("series c", RoundType::SeriesC),
    ("strategic", RoundType::Strategic),
    ("token sale", RoundType::TokenSale),
    ("private sale", RoundType::PrivateSale),
    ("private round", RoundType::PrivateRound),
    ("funding", RoundType::Funding),
];

/// Matches the first round phrase appearing in `text`, case-insensitively.
pub fn match_round(text: &str) -> Option<RoundType> {
    let lower = text.to_lowercase();
    ROUND_PHRASES
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|&(_, round)| round)
}

/// Strips list markers, emoji and separator punctuation from a captured
/// company name.
pub fn clean_company(raw: &str) -> String {
    let mut s = raw.trim();
    if let Some(rest) = strip_list_marker(s) {
        s = rest;
    }
    s.trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| {
            c.is_whitespace() || matches!(c, '-' | '–' | '—' | ':' | '|' | '*' | '•' | ',')
        })
        .to_string()
}

/// Removes a leading "1." or "2)" style enumeration marker.
fn strip_list_marker(s: &str) -> Option<&str> {
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits > 2 {
        return None;
    }
    let rest = &s[digits..];
    let rest = rest.strip_prefix(['.', ')'])?;
    Some(rest.trim_start())
}
