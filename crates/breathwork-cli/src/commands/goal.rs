use breathwork_core::{AppContext, GoalPeriod, ProgressMetric};
use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use serde_json::json;
use uuid::Uuid;

use super::print_json;

#[derive(Clone, Copy, ValueEnum)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl From<Period> for GoalPeriod {
    fn from(period: Period) -> Self {
        match period {
            Period::Daily => GoalPeriod::Daily,
            Period::Weekly => GoalPeriod::Weekly,
            Period::Monthly => GoalPeriod::Monthly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Metric {
    Sessions,
    Time,
    Cycles,
    Streak,
    BoxSessions,
}

impl From<Metric> for ProgressMetric {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Sessions => ProgressMetric::SessionCount,
            Metric::Time => ProgressMetric::TotalTime,
            Metric::Cycles => ProgressMetric::TotalCycles,
            Metric::Streak => ProgressMetric::Streak,
            Metric::BoxSessions => ProgressMetric::ModeMastery,
        }
    }
}

#[derive(Subcommand)]
pub enum GoalAction {
    /// List goals
    List {
        /// Show completed goals instead of active ones
        #[arg(long)]
        completed: bool,
    },
    /// Create a practice-time goal
    Create {
        /// Goal title
        title: String,
        /// Target practice time in seconds
        #[arg(long)]
        target_secs: f64,
        #[arg(long, value_enum, default_value = "daily")]
        period: Period,
    },
    /// Create a goal on a progress metric
    CreateMetric {
        #[arg(value_enum)]
        metric: Metric,
        /// Target value of the metric
        #[arg(long)]
        target: u64,
        /// Days to reach it
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Add progress to a goal
    Progress {
        /// Goal ID
        id: Uuid,
        /// Amount to add
        delta: f64,
    },
    /// Delete an active goal
    Delete {
        /// Goal ID
        id: Uuid,
    },
    /// Zero a goal's progress and restart its window
    Reset {
        /// Goal ID
        id: Uuid,
    },
    /// Suggested goals not already active
    Suggest {
        /// Adopt the suggestion at this index
        #[arg(long)]
        adopt: Option<usize>,
    },
    /// Completion rate, average target and recommended targets
    Summary,
}

pub fn run(action: GoalAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = AppContext::open()?;
    let now = Utc::now();

    match action {
        GoalAction::List { completed } => {
            let goals = if completed {
                ctx.goals().completed()
            } else {
                ctx.goals().active()
            };
            let list: Vec<_> = goals
                .iter()
                .map(|g| {
                    json!({
                        "goal": g,
                        "progress_percentage": g.progress_percentage(),
                        "days_remaining": g.days_remaining(now),
                        "status": g.status(now),
                    })
                })
                .collect();
            print_json(&list)?;
        }
        GoalAction::Create { title, target_secs, period } => {
            let goal = ctx.create_goal(&title, target_secs, period.into())?;
            print_json(&goal)?;
        }
        GoalAction::CreateMetric { metric, target, days } => {
            let goal = ctx.create_metric_goal(metric.into(), target, days)?;
            print_json(&goal)?;
        }
        GoalAction::Progress { id, delta } => match ctx.update_goal_progress(id, delta)? {
            Some(goal) => {
                println!("goal completed: {}", goal.title);
            }
            None => {
                if let Some(goal) = ctx.goals().get(id) {
                    print_json(goal)?;
                }
            }
        },
        GoalAction::Delete { id } => {
            if !ctx.delete_goal(id) {
                return Err(format!("no active goal with id {id}").into());
            }
            println!("goal deleted");
        }
        GoalAction::Reset { id } => {
            let goal = ctx.reset_goal(id)?;
            print_json(&goal)?;
        }
        GoalAction::Suggest { adopt } => {
            let suggestions = ctx.goals().suggestions();
            match adopt {
                Some(index) => {
                    let suggestion = suggestions
                        .get(index)
                        .ok_or_else(|| format!("no suggestion at index {index}"))?;
                    let goal = ctx.adopt_suggestion(suggestion)?;
                    print_json(&goal)?;
                }
                None => print_json(&suggestions)?,
            }
        }
        GoalAction::Summary => {
            let goals = ctx.goals();
            print_json(&json!({
                "active": goals.active().len(),
                "completed": goals.completed().len(),
                "completion_rate": goals.completion_rate(),
                "average_target": goals.average_target(),
                "recommended": {
                    "daily": goals.recommended_target(GoalPeriod::Daily, now),
                    "weekly": goals.recommended_target(GoalPeriod::Weekly, now),
                    "monthly": goals.recommended_target(GoalPeriod::Monthly, now),
                },
            }))?;
        }
    }
    Ok(())
}
