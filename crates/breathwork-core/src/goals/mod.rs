//! User goals: practice-time goals over a calendar period and metric goals
//! that follow a progress value over a number of days.

mod goal;
mod manager;

pub use goal::{is_goal_completed, Goal, GoalPeriod, GoalSpan, GoalStatus};
pub use manager::{GoalManager, GoalSuggestion};
