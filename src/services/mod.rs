//! Application services.
//!
//! Request-scoped services that sit between the HTTP handlers and the
//! storage layer.

pub mod study_plan;

pub use study_plan::{CurrentPlan, PlanError, StudyPlanService};
