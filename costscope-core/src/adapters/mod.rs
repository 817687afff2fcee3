//! Adapters - data sources that sit outside the pipeline
//!
//! - Bundled sample dataset and template CSV

pub mod sample;
