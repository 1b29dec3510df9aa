use breathwork_core::{AppContext, CustomPattern, PhaseDurations};
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use super::print_json;

#[derive(Subcommand)]
pub enum PatternAction {
    /// List built-in modes and custom patterns
    List {
        /// Only favourite custom patterns
        #[arg(long)]
        favorites: bool,
        /// Sort custom patterns easiest first
        #[arg(long)]
        by_difficulty: bool,
    },
    /// Show one pattern by id or name
    Show {
        key: String,
    },
    /// Add a custom pattern
    Add {
        name: String,
        #[arg(long)]
        inhale: f64,
        #[arg(long, default_value = "0")]
        hold: f64,
        #[arg(long)]
        exhale: f64,
        #[arg(long, default_value = "0")]
        pause: f64,
        #[arg(long, default_value = "5")]
        cycles: u32,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a custom pattern
    Delete {
        id: Uuid,
    },
    /// Toggle a custom pattern's favourite flag
    Favorite {
        id: Uuid,
    },
    /// Search custom patterns by name or description
    Search {
        query: String,
        /// Minimum whole-session seconds
        #[arg(long)]
        min_secs: Option<f64>,
        /// Maximum whole-session seconds
        #[arg(long)]
        max_secs: Option<f64>,
    },
    /// Add the predefined patterns that are missing
    Seed,
}

fn describe(pattern: &CustomPattern) -> serde_json::Value {
    json!({
        "pattern": pattern,
        "cycle_secs": pattern.cycle_secs(),
        "total_session_secs": pattern.total_session_secs(),
        "difficulty": pattern.difficulty_level(),
    })
}

pub fn run(action: PatternAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = AppContext::open()?;

    match action {
        PatternAction::List { favorites, by_difficulty } => {
            let catalog = ctx.patterns();
            let custom: Vec<&CustomPattern> = if favorites {
                catalog.favorites()
            } else if by_difficulty {
                catalog.by_difficulty()
            } else {
                catalog.custom().iter().collect()
            };
            print_json(&json!({
                "builtin": catalog.builtins(),
                "custom": custom.into_iter().map(describe).collect::<Vec<_>>(),
            }))?;
        }
        PatternAction::Show { key } => {
            let catalog = ctx.patterns();
            match catalog.find_custom(&key) {
                Some(custom) => print_json(&describe(custom))?,
                None => {
                    let pattern = catalog
                        .resolve(&key)
                        .ok_or_else(|| format!("unknown pattern: {key}"))?;
                    print_json(&pattern)?;
                }
            }
        }
        PatternAction::Add { name, inhale, hold, exhale, pause, cycles, description } => {
            let pattern = CustomPattern::new(
                name,
                description,
                PhaseDurations::new(inhale, hold, exhale, pause),
                cycles,
            )?;
            ctx.add_pattern(pattern.clone())?;
            print_json(&describe(&pattern))?;
        }
        PatternAction::Delete { id } => {
            if !ctx.delete_pattern(id) {
                return Err(format!("no custom pattern with id {id}").into());
            }
            println!("pattern deleted");
        }
        PatternAction::Favorite { id } => {
            let favorite = ctx
                .toggle_favorite(id)
                .ok_or_else(|| format!("no custom pattern with id {id}"))?;
            print_json(&json!({ "id": id, "is_favorite": favorite }))?;
        }
        PatternAction::Search { query, min_secs, max_secs } => {
            let catalog = ctx.patterns();
            let in_range: Vec<Uuid> = catalog
                .by_session_time(min_secs.unwrap_or(0.0), max_secs.unwrap_or(f64::INFINITY))
                .iter()
                .map(|p| p.id)
                .collect();
            let matches: Vec<_> = catalog
                .search(&query)
                .into_iter()
                .filter(|p| in_range.contains(&p.id))
                .map(describe)
                .collect();
            print_json(&matches)?;
        }
        PatternAction::Seed => {
            let added = ctx.seed_patterns();
            println!("{added} patterns added");
        }
    }
    Ok(())
}
