//! Candidate-to-job match scoring.
//!
//! The [`matching`] module is the pure core: a deterministic keyword scorer and
//! an adapter around an external analysis model, both behind [`matching::MatchScorer`].
//! Everything else is the service shell around it.

pub mod config;
pub mod errors;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod routes;
pub mod state;
