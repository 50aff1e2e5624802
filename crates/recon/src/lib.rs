//! `rankmerge-recon`: cross-source player reconciliation engine.
//!
//! Receives pre-loaded source tables, links records for the same player by
//! normalized-name similarity, blends their values into one consensus per player
//! and selects low-confidence players for review. File reading is limited to the
//! `load` module; everything else is pure.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod load;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod output;
pub mod review;
pub mod weights;

pub use config::ReconConfig;
pub use engine::run;
pub use error::ReconError;
pub use load::load_sources;
pub use model::{CanonicalPlayer, ConsensusResult, ReconInput, SourceRecord};
