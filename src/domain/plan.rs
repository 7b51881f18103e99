use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subject priority within a plan. Ordering follows weight (low < medium < high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Low,
  Medium,
  High,
}

impl Priority {
  pub fn weight(&self) -> u8 {
    match self {
      Self::High => 3,
      Self::Medium => 2,
      Self::Low => 1,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::High => "high",
      Self::Medium => "medium",
      Self::Low => "low",
    }
  }
}

/// Learner classification driving topic difficulty and goal sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdaptiveLevel {
  Beginner,
  Intermediate,
  Advanced,
}

impl AdaptiveLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Beginner => "beginner",
      Self::Intermediate => "intermediate",
      Self::Advanced => "advanced",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
  Intensive,
  Balanced,
  Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
  Foundation,
  Practice,
  Recap,
  Warmup,
  Advanced,
  Competitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
  JeeMain,
  JeeAdvanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTopic {
  /// Stable identifier, survives reordering of subjects and topics
  pub id: String,
  pub name: String,
  pub kind: TopicKind,
  pub difficulty: Difficulty,
  /// Minutes
  pub duration: u32,
  pub completed: bool,
  pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSubject {
  pub subject: String,
  pub accuracy: f64,
  pub urgency_score: f64,
  pub priority: Priority,
  /// Minutes per day
  pub allocated_time: u32,
  pub focus: Focus,
  pub topics: Vec<PlanTopic>,
}

/// Per-subject aggregate over the performance window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformance {
  pub subject: String,
  pub total_score: i64,
  pub total_questions: i64,
  pub attempts: usize,
  pub accuracy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
  pub overall_accuracy: f64,
  pub total_attempts: usize,
  pub subjects: Vec<SubjectPerformance>,
  pub strengths: Vec<String>,
  pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMetrics {
  pub learning_rate: f64,
  pub retention_score: f64,
  pub consistency_score: f64,
  pub adaptive_level: AdaptiveLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
  Urgent,
  Practice,
  Fundamentals,
  Revision,
  Consistency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
  pub kind: RecommendationKind,
  pub priority: Priority,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subject: Option<String>,
  pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
  HighPrioritySubjects,
  TopicCompletion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGoal {
  pub kind: GoalKind,
  pub description: String,
  pub target: u32,
}

/// Everything the synthesizer produces, before it is stamped and persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
  pub subjects: Vec<PlanSubject>,
  pub performance: PerformanceSummary,
  pub recommendations: Vec<Recommendation>,
  pub study_goals: Vec<StudyGoal>,
  pub ai_metrics: AiMetrics,
  pub total_study_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
  pub id: i64,
  pub user_id: i64,
  pub subjects: Vec<PlanSubject>,
  pub performance: PerformanceSummary,
  pub recommendations: Vec<Recommendation>,
  pub study_goals: Vec<StudyGoal>,
  pub ai_metrics: AiMetrics,
  pub total_study_time: u32,
  /// Rounded percentage of completed topics
  pub completion_status: u32,
  pub version: i64,
  pub created_at: DateTime<Utc>,
  pub last_updated: DateTime<Utc>,
  pub next_refresh_time: DateTime<Utc>,
}

/// Which topic a completion request refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicRef {
  Index { subject: usize, topic: usize },
  Id(String),
}

impl StudyPlan {
  pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
    now >= self.next_refresh_time
  }

  /// Whole minutes until the next automatic refresh, never negative
  pub fn minutes_until_refresh(&self, now: DateTime<Utc>) -> i64 {
    (self.next_refresh_time - now).num_minutes().max(0)
  }

  pub fn total_topics(&self) -> usize {
    self.subjects.iter().map(|s| s.topics.len()).sum()
  }

  pub fn completed_topics(&self) -> usize {
    self
      .subjects
      .iter()
      .flat_map(|s| s.topics.iter())
      .filter(|t| t.completed)
      .count()
  }

  pub fn recompute_completion(&mut self) {
    self.completion_status = completion_percent(self.completed_topics(), self.total_topics());
  }

  pub fn topic_mut(&mut self, target: &TopicRef) -> Option<&mut PlanTopic> {
    match target {
      TopicRef::Index { subject, topic } => self
        .subjects
        .get_mut(*subject)
        .and_then(|s| s.topics.get_mut(*topic)),
      TopicRef::Id(id) => self
        .subjects
        .iter_mut()
        .flat_map(|s| s.topics.iter_mut())
        .find(|t| &t.id == id),
    }
  }
}

/// round(100 × completed / total), 0 for an empty plan
pub fn completion_percent(completed: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  (completed as f64 * 100.0 / total as f64).round() as u32
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn topic(id: &str) -> PlanTopic {
    PlanTopic {
      id: id.to_string(),
      name: id.to_string(),
      kind: TopicKind::Practice,
      difficulty: Difficulty::Medium,
      duration: 10,
      completed: false,
      completed_at: None,
    }
  }

  fn plan_with_topics(counts: &[usize]) -> StudyPlan {
    let now = Utc::now();
    let subjects = counts
      .iter()
      .enumerate()
      .map(|(i, n)| PlanSubject {
        subject: format!("S{}", i),
        accuracy: 50.0,
        urgency_score: 10.0,
        priority: Priority::Low,
        allocated_time: 30,
        focus: Focus::Maintenance,
        topics: (0..*n).map(|t| topic(&format!("{}-{}", i, t))).collect(),
      })
      .collect();
    StudyPlan {
      id: 1,
      user_id: 1,
      subjects,
      performance: PerformanceSummary::default(),
      recommendations: vec![],
      study_goals: vec![],
      ai_metrics: AiMetrics {
        learning_rate: 0.5,
        retention_score: 0.5,
        consistency_score: 0.3,
        adaptive_level: AdaptiveLevel::Beginner,
      },
      total_study_time: 30,
      completion_status: 0,
      version: 1,
      created_at: now,
      last_updated: now,
      next_refresh_time: now + Duration::hours(24),
    }
  }

  #[test]
  fn test_priority_ordering_matches_weight() {
    assert!(Priority::High > Priority::Medium);
    assert!(Priority::Medium > Priority::Low);
    assert_eq!(Priority::High.weight(), 3);
    assert_eq!(Priority::Low.weight(), 1);
  }

  #[test]
  fn test_completion_percent_rounds() {
    assert_eq!(completion_percent(0, 0), 0);
    assert_eq!(completion_percent(1, 3), 33);
    assert_eq!(completion_percent(2, 3), 67);
    assert_eq!(completion_percent(1, 8), 13);
    assert_eq!(completion_percent(9, 9), 100);
  }

  #[test]
  fn test_topic_lookup_by_index_and_id() {
    let mut plan = plan_with_topics(&[3, 3]);
    let by_index = plan
      .topic_mut(&TopicRef::Index { subject: 1, topic: 2 })
      .map(|t| t.id.clone());
    assert_eq!(by_index.as_deref(), Some("1-2"));

    let by_id = plan.topic_mut(&TopicRef::Id("0-1".into())).map(|t| t.name.clone());
    assert_eq!(by_id.as_deref(), Some("0-1"));
  }

  #[test]
  fn test_topic_lookup_out_of_range() {
    let mut plan = plan_with_topics(&[3]);
    assert!(plan.topic_mut(&TopicRef::Index { subject: 5, topic: 0 }).is_none());
    assert!(plan.topic_mut(&TopicRef::Index { subject: 0, topic: 3 }).is_none());
    assert!(plan.topic_mut(&TopicRef::Id("missing".into())).is_none());
  }

  #[test]
  fn test_recompute_completion() {
    let mut plan = plan_with_topics(&[3, 3]);
    for target in ["0-0", "1-1"] {
      if let Some(t) = plan.topic_mut(&TopicRef::Id(target.into())) {
        t.completed = true;
      }
    }
    plan.recompute_completion();
    assert_eq!(plan.completed_topics(), 2);
    assert_eq!(plan.completion_status, 33);
  }

  #[test]
  fn test_staleness_boundary() {
    let plan = plan_with_topics(&[1]);
    let refresh = plan.next_refresh_time;
    assert!(!plan.is_stale(refresh - Duration::seconds(1)));
    assert!(plan.is_stale(refresh));
    assert_eq!(plan.minutes_until_refresh(refresh + Duration::hours(1)), 0);
  }
}
