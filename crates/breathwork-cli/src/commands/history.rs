use breathwork_core::AppContext;
use clap::Subcommand;

use super::print_json;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List {
        /// Maximum number of sessions to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Totals over the whole history
    Summary,
    /// Delete every recorded session
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = AppContext::open()?;

    match action {
        HistoryAction::List { limit } => {
            print_json(ctx.history().recent(limit))?;
        }
        HistoryAction::Summary => {
            print_json(&ctx.history().summary())?;
        }
        HistoryAction::Clear => {
            ctx.clear_history();
            println!("history cleared");
        }
    }
    Ok(())
}
