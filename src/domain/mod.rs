pub mod attempt;
pub mod plan;

pub use attempt::{accuracy_percent, QuizAttempt};
pub use plan::{
  completion_percent, AdaptiveLevel, AiMetrics, Difficulty, Focus, GoalKind, PerformanceSummary,
  PlanDraft, PlanSubject, PlanTopic, Priority, Recommendation, RecommendationKind, StudyGoal,
  StudyPlan, SubjectPerformance, TopicKind, TopicRef,
};
