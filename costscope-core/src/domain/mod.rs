//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

pub mod bucket;
mod filter;
mod insight;
mod record;
pub mod result;

pub use bucket::AggregatedBucket;
pub use filter::FilterSelection;
pub use insight::{Insight, InsightKind, Severity};
pub use record::{CostRecord, Field};
