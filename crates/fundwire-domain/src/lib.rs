//! Fundwire Domain Layer
//!
//! This crate contains the core data model for the fundraising-extraction
//! pipeline and the trait seams every other layer depends on.
//!
//! ## Key Concepts
//!
//! - **InvestmentRecord**: the canonical output unit - a tagged union of a
//!   single funding event and a multi-company roundup digest
//! - **RawMessage**: one announcement message as fetched from a chat source
//! - **CheckpointState**: durable per-channel progress for resumable runs
//! - **RoundType**: the closed vocabulary of funding round labels
//!
//! ## Architecture
//!
//! Infrastructure implementations (generation clients, file stores, batch
//! drivers) live in other crates; this crate defines the shapes and the
//! trait boundaries they implement.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
pub mod errors;
pub mod message;
pub mod record;
pub mod round;
pub mod traits;

// Re-exports for convenience
pub use checkpoint::{CheckpointEntry, CheckpointState};
pub use errors::{ExtractError, GenerationError, SourceError};
pub use message::{MessageEntities, RawMessage};
pub use record::{
    EventKind, InvestmentRecord, NestedAcquisition, RecordCommon, RoundupRecord, RoundupTag,
    SingleRecord,
};
pub use round::RoundType;
pub use traits::{ExtractionEngine, GenerationService, MessageSource, TextAnalyzer};
