pub mod anomaly;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod search;
pub mod similarity;
pub mod verdict;

pub use anomaly::{AnomalyFlag, detect};
pub use model::{
    ExtractedFields, FieldMatch, FlagSet, InstitutionRef, MatchCandidate, MatchDetails,
    MatchedSummary, RegistryRecord,
};
pub use normalize::normalize;
pub use search::{Comparator, FieldRule, ScoredField, SearchConfig, find_candidates};
pub use verdict::{Decision, Verdict, decide};
