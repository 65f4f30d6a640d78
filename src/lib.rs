// Library interface for relay-advisor
// This allows integration tests and benches to access internal modules

pub mod advisor;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod report;
pub mod scenario;
pub mod service;
pub mod writer;

// Re-export commonly used types
pub use advisor::{
    CandidateRow, MatchedScenario, PerformanceThresholds, Recommendation, RecommendationEngine,
};
pub use config::AppConfig;
pub use dataset::{CsvDatasetProvider, DatasetProvider, Datasets};
pub use errors::AdvisorError;
pub use scenario::{BaseCatalog, Inertia, SystemBase, UserQuery};
pub use service::{Advice, Advisor};
