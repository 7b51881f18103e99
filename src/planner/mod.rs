pub mod metrics;
pub mod performance;
pub mod synthesizer;

pub use metrics::{consistency_score, learning_rate, retention_score, MetricsEstimate};
pub use performance::aggregate;
pub use synthesizer::{adaptive_level, synthesize};
