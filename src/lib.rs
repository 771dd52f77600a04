//! credit-risk: German credit classification
//!
//! Loads the German credit dataset, fits a feature pipeline together with a
//! boosted-tree or logistic-regression classifier, records the run in a
//! file-backed tracking store, registers the fitted pipeline and serves
//! single-record predictions over HTTP.

pub mod cli;
pub mod model;
pub mod pipeline;
pub mod predict;
pub mod record;
pub mod registry;
pub mod report;
pub mod serve;
pub mod train;
pub mod utils;
