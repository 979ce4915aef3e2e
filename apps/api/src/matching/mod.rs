// Match scoring core.
// Implements: keyword taxonomy, deterministic scoring, the external analysis
// adapter, batch orchestration, improvement suggestions, per-job summaries and
// candidate comparison.
// All external model calls go through llm_client.

pub mod analysis;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod jitter;
pub mod models;
pub mod prompts;
pub mod report;
pub mod scorer;
pub mod suggestions;
pub mod summary;
pub mod taxonomy;

pub use engine::{BatchPolicy, CancelHandle, CancelToken, MatchEngine};
pub use error::{MatchError, TransportFailure};
pub use models::{JobPosting, ResumeProfile};
pub use report::{MatchAnalysis, MatchBand, MatchReport};
pub use scorer::{MatchScorer, Strategy};
pub use suggestions::{ImprovementAdvisor, ImprovementSuggestions};
