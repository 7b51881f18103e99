//! Turns subject performance and learning metrics into a prioritized plan.

use crate::domain::{
  AdaptiveLevel, AiMetrics, Difficulty, Focus, GoalKind, PerformanceSummary, PlanDraft,
  PlanSubject, PlanTopic, Priority, Recommendation, RecommendationKind, StudyGoal, TopicKind,
};
use crate::session::generate_topic_id;

use super::metrics::MetricsEstimate;

/// Urgency above this is high priority
pub const HIGH_URGENCY: f64 = 40.0;
/// Urgency above this (and up to HIGH_URGENCY) is medium priority
pub const MEDIUM_URGENCY: f64 = 20.0;

pub const HIGH_BASE_MINUTES: f64 = 60.0;
pub const MEDIUM_BASE_MINUTES: f64 = 45.0;
pub const LOW_BASE_MINUTES: f64 = 30.0;

/// Consistency above this earns the longer session multiplier
pub const CONSISTENT_THRESHOLD: f64 = 0.7;
pub const CONSISTENT_MULTIPLIER: f64 = 1.2;
pub const INCONSISTENT_MULTIPLIER: f64 = 0.8;

/// Accuracy tiers selecting the topic template
pub const STRUGGLING_BELOW: f64 = 60.0;
pub const DEVELOPING_BELOW: f64 = 75.0;

pub const LOW_LEARNING_RATE: f64 = 0.3;
pub const LOW_RETENTION: f64 = 0.5;
pub const LOW_CONSISTENCY: f64 = 0.5;

/// Percentage of topics a non-advanced learner is asked to finish
pub const TOPIC_GOAL_PERCENT: u32 = 70;

struct TopicTemplate {
  kind: TopicKind,
  title: &'static str,
  share: f64,
  difficulty: Difficulty,
}

const STRUGGLING: [TopicTemplate; 3] = [
  TopicTemplate {
    kind: TopicKind::Foundation,
    title: "Core Concepts & Formulas",
    share: 0.4,
    difficulty: Difficulty::Easy,
  },
  TopicTemplate {
    kind: TopicKind::Practice,
    title: "Guided Problem Practice",
    share: 0.4,
    difficulty: Difficulty::Easy,
  },
  TopicTemplate {
    kind: TopicKind::Recap,
    title: "Quick Recap & Error Log",
    share: 0.2,
    difficulty: Difficulty::Easy,
  },
];

const DEVELOPING: [TopicTemplate; 3] = [
  TopicTemplate {
    kind: TopicKind::Foundation,
    title: "Concept Reinforcement",
    share: 0.3,
    difficulty: Difficulty::Medium,
  },
  TopicTemplate {
    kind: TopicKind::Practice,
    title: "Mixed Problem Sets",
    share: 0.5,
    difficulty: Difficulty::Medium,
  },
  TopicTemplate {
    kind: TopicKind::Recap,
    title: "Formula Recap",
    share: 0.2,
    difficulty: Difficulty::Easy,
  },
];

const PROFICIENT: [TopicTemplate; 3] = [
  TopicTemplate {
    kind: TopicKind::Warmup,
    title: "Warm-up Drill",
    share: 0.2,
    difficulty: Difficulty::Medium,
  },
  TopicTemplate {
    kind: TopicKind::Advanced,
    title: "Advanced Problem Solving",
    share: 0.5,
    difficulty: Difficulty::Hard,
  },
  TopicTemplate {
    kind: TopicKind::Competitive,
    title: "Previous Year JEE Questions",
    share: 0.3,
    difficulty: Difficulty::JeeMain,
  },
];

/// (100 − accuracy) × (1 − retention)
pub fn urgency_score(accuracy: f64, retention_score: f64) -> f64 {
  (100.0 - accuracy) * (1.0 - retention_score)
}

pub fn classify_priority(urgency: f64) -> Priority {
  if urgency > HIGH_URGENCY {
    Priority::High
  } else if urgency > MEDIUM_URGENCY {
    Priority::Medium
  } else {
    Priority::Low
  }
}

pub fn consistency_multiplier(consistency_score: f64) -> f64 {
  if consistency_score > CONSISTENT_THRESHOLD {
    CONSISTENT_MULTIPLIER
  } else {
    INCONSISTENT_MULTIPLIER
  }
}

/// Daily minutes for a subject of the given priority
pub fn allocated_time(priority: Priority, multiplier: f64) -> u32 {
  let base = match priority {
    Priority::High => HIGH_BASE_MINUTES,
    Priority::Medium => MEDIUM_BASE_MINUTES,
    Priority::Low => LOW_BASE_MINUTES,
  };
  (base * multiplier).round() as u32
}

/// `accuracy` is the 7-day overall accuracy, so a student with no attempts in
/// the last week is a beginner whatever their learning rate.
pub fn adaptive_level(accuracy: f64, learning_rate: f64) -> AdaptiveLevel {
  if accuracy >= 85.0 && learning_rate > 0.6 {
    AdaptiveLevel::Advanced
  } else if accuracy >= 70.0 && learning_rate > 0.4 {
    AdaptiveLevel::Intermediate
  } else {
    AdaptiveLevel::Beginner
  }
}

fn focus_for(priority: Priority) -> Focus {
  match priority {
    Priority::High => Focus::Intensive,
    Priority::Medium => Focus::Balanced,
    Priority::Low => Focus::Maintenance,
  }
}

fn template_for(accuracy: f64) -> &'static [TopicTemplate; 3] {
  if accuracy < STRUGGLING_BELOW {
    &STRUGGLING
  } else if accuracy < DEVELOPING_BELOW {
    &DEVELOPING
  } else {
    &PROFICIENT
  }
}

fn build_topics(subject: &str, accuracy: f64, allocated: u32, level: AdaptiveLevel) -> Vec<PlanTopic> {
  template_for(accuracy)
    .iter()
    .map(|template| {
      let difficulty = match (template.kind, level) {
        (TopicKind::Competitive, AdaptiveLevel::Advanced) => Difficulty::JeeAdvanced,
        _ => template.difficulty,
      };
      PlanTopic {
        id: generate_topic_id(),
        name: format!("{}: {}", subject, template.title),
        kind: template.kind,
        difficulty,
        duration: (allocated as f64 * template.share).round() as u32,
        completed: false,
        completed_at: None,
      }
    })
    .collect()
}

fn subject_recommendation(subject: &PlanSubject) -> Option<Recommendation> {
  match subject.priority {
    Priority::High => Some(Recommendation {
      kind: RecommendationKind::Urgent,
      priority: Priority::High,
      subject: Some(subject.subject.clone()),
      message: format!(
        "Focus on {} right away: accuracy is {:.1}%. Spend {} minutes a day on fundamentals and guided practice.",
        subject.subject, subject.accuracy, subject.allocated_time
      ),
    }),
    Priority::Medium => Some(Recommendation {
      kind: RecommendationKind::Practice,
      priority: Priority::Medium,
      subject: Some(subject.subject.clone()),
      message: format!(
        "Keep practicing {} ({:.1}% accuracy) with mixed problem sets for {} minutes a day.",
        subject.subject, subject.accuracy, subject.allocated_time
      ),
    }),
    Priority::Low => None,
  }
}

fn global_recommendations(metrics: &MetricsEstimate) -> Vec<Recommendation> {
  let mut recommendations = Vec::new();
  if metrics.learning_rate < LOW_LEARNING_RATE {
    recommendations.push(Recommendation {
      kind: RecommendationKind::Fundamentals,
      priority: Priority::Medium,
      subject: None,
      message: "Scores have not been improving. Revisit fundamentals before moving on to new problem types."
        .to_string(),
    });
  }
  if metrics.retention_score < LOW_RETENTION {
    recommendations.push(Recommendation {
      kind: RecommendationKind::Revision,
      priority: Priority::High,
      subject: None,
      message: "Recent accuracy dropped compared to the week before. Schedule spaced revision of last week's topics."
        .to_string(),
    });
  }
  if metrics.consistency_score < LOW_CONSISTENCY {
    recommendations.push(Recommendation {
      kind: RecommendationKind::Consistency,
      priority: Priority::Medium,
      subject: None,
      message: "Study a little every day. Aim for at least 21 active days a month.".to_string(),
    });
  }
  recommendations
}

fn goals(subjects: &[PlanSubject], level: AdaptiveLevel) -> Vec<StudyGoal> {
  let mut goals = Vec::new();

  let high = subjects.iter().filter(|s| s.priority == Priority::High).count() as u32;
  if high > 0 {
    goals.push(StudyGoal {
      kind: GoalKind::HighPrioritySubjects,
      description: format!(
        "Complete all {} high-priority subject{}",
        high,
        if high == 1 { "" } else { "s" }
      ),
      target: high,
    });
  }

  let total_topics: u32 = subjects.iter().map(|s| s.topics.len() as u32).sum();
  if total_topics > 0 {
    let target = match level {
      AdaptiveLevel::Advanced => total_topics,
      // Integer ceil: 10 topics must give 7
      _ => (total_topics * TOPIC_GOAL_PERCENT).div_ceil(100),
    };
    goals.push(StudyGoal {
      kind: GoalKind::TopicCompletion,
      description: format!("Complete {} of {} topics", target, total_topics),
      target,
    });
  }

  goals
}

/// Build a plan draft from aggregated performance and metrics.
pub fn synthesize(performance: PerformanceSummary, metrics: &MetricsEstimate) -> PlanDraft {
  let level = adaptive_level(performance.overall_accuracy, metrics.learning_rate);
  let multiplier = consistency_multiplier(metrics.consistency_score);

  let mut subjects: Vec<PlanSubject> = performance
    .subjects
    .iter()
    .map(|perf| {
      let urgency = urgency_score(perf.accuracy, metrics.retention_score);
      let priority = classify_priority(urgency);
      let allocated = allocated_time(priority, multiplier);
      PlanSubject {
        subject: perf.subject.clone(),
        accuracy: perf.accuracy,
        urgency_score: urgency,
        priority,
        allocated_time: allocated,
        focus: focus_for(priority),
        topics: build_topics(&perf.subject, perf.accuracy, allocated, level),
      }
    })
    .collect();

  // Stable: equal priorities keep aggregator order
  subjects.sort_by(|a, b| b.priority.cmp(&a.priority));

  let mut recommendations: Vec<Recommendation> =
    subjects.iter().filter_map(subject_recommendation).collect();
  recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
  recommendations.extend(global_recommendations(metrics));

  let study_goals = goals(&subjects, level);
  let total_study_time = subjects.iter().map(|s| s.allocated_time).sum();

  PlanDraft {
    subjects,
    performance,
    recommendations,
    study_goals,
    ai_metrics: AiMetrics {
      learning_rate: metrics.learning_rate,
      retention_score: metrics.retention_score,
      consistency_score: metrics.consistency_score,
      adaptive_level: level,
    },
    total_study_time,
  }
}
