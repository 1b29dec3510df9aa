use breathwork_core::AppContext;
use clap::Subcommand;
use serde_json::json;

use super::print_json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Sessions per day over the last seven days
    Weekly,
    /// Current daily streak
    Streak,
    /// Practice time today and this week against the configured goals
    Today,
    /// Every progress metric
    All,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = AppContext::open()?;

    match action {
        StatsAction::Weekly => {
            print_json(ctx.progress().weekly_stats())?;
        }
        StatsAction::Streak => {
            print_json(&json!({ "streak_days": ctx.live_values().streak_days }))?;
        }
        StatsAction::Today => {
            print_json(&ctx.practice_progress())?;
        }
        StatsAction::All => {
            print_json(&ctx.live_values())?;
        }
    }
    Ok(())
}
