// Scoring core: age-tier profiles, the category evaluator, the tier rating
// composer and the position-composite aggregator. Pure apart from the
// category-result lookup seam in `composite::source`.

pub mod composite;
pub mod derived;
pub mod error;
pub mod evaluator;
pub mod numeric;
pub mod position;
pub mod profile;
pub mod rating;
pub mod snapshot;
pub mod tier;
pub mod transform;

pub use composite::{
    compose_full_eval, fetch_full_eval_inputs, full_eval_report, ratio_to_score, CategoryRecord,
    CategoryResultSource, FullEvalAggregates, FullEvalReport, PositionScoreSet,
};
pub use error::{LookupError, ProfileError};
pub use evaluator::{evaluate_category, CategoryBreakdown, CategoryResult};
pub use position::Position;
pub use profile::TierProfile;
pub use rating::{evaluate_profile, evaluate_tier_rating, RatingResult};
pub use snapshot::{InputIssue, MetricKey, MetricSnapshot, MetricValue};
pub use tier::{AgeTier, CategoryKind, TierFamily};
pub use transform::TestPoint;
