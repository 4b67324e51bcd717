//! Extraction engines for fundraising announcements.
//!
//! Two engines implement the same [`fundwire_domain::ExtractionEngine`]
//! boundary and converge on the same canonical record:
//!
//! - [`HeuristicEngine`]: deterministic regex extraction, no network
//! - [`AiEngine`]: prompt-driven extraction over a generation service,
//!   with rate limiting and transient-error retry built in
//!
//! Shared normalization ([`normalize`]) keeps amounts, links, investors
//! and round labels identical regardless of which engine produced them.

pub mod ai;
pub mod heuristic;
pub mod normalize;
pub mod parser;
pub mod prompt;

pub use ai::AiEngine;
pub use heuristic::{
    has_acquisition_vocabulary, has_funding_vocabulary, HeuristicEngine, RoundupDetector,
};
