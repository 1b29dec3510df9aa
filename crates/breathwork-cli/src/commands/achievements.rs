use breathwork_core::AppContext;
use clap::Subcommand;
use serde_json::json;

use super::print_json;

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// List achievements with current progress
    List {
        /// Only unlocked achievements
        #[arg(long)]
        unlocked: bool,
    },
    /// Relock achievements and drop all goals and weekly stats
    Reset,
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = AppContext::open()?;

    match action {
        AchievementsAction::List { unlocked } => {
            let values = ctx.live_values();
            let list: Vec<_> = ctx
                .progress()
                .achievements()
                .iter()
                .filter(|a| !unlocked || a.is_unlocked)
                .map(|a| {
                    let value = values.get(a.metric);
                    json!({
                        "achievement": a,
                        "value": value,
                        "progress": a.progress(value),
                    })
                })
                .collect();
            print_json(&list)?;
        }
        AchievementsAction::Reset => {
            ctx.reset_progress();
            println!("progress reset");
        }
    }
    Ok(())
}
