use std::time::{Duration, Instant};

use breathwork_core::storage::BreathingSpeed;
use breathwork_core::{AppContext, Event, SessionOutcome};
use clap::{Subcommand, ValueEnum};
use tokio::time::MissedTickBehavior;
use tracing::warn;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, ValueEnum)]
pub enum Speed {
    Slow,
    Normal,
    Fast,
}

impl From<Speed> for BreathingSpeed {
    fn from(speed: Speed) -> Self {
        match speed {
            Speed::Slow => BreathingSpeed::Slow,
            Speed::Normal => BreathingSpeed::Normal,
            Speed::Fast => BreathingSpeed::Fast,
        }
    }
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a session until Ctrl-C, the time limit or the pattern's cycle limit
    Run {
        /// Built-in mode id, custom pattern id or custom pattern name
        #[arg(long, default_value = "box")]
        pattern: String,
        /// Override the configured speed
        #[arg(long, value_enum)]
        speed: Option<Speed>,
        /// Stop after this many minutes
        #[arg(long)]
        minutes: Option<f64>,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Run { pattern, speed, minutes } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let mut ctx = AppContext::open()?;
            let outcome = runtime.block_on(run_session(&mut ctx, &pattern, speed, minutes))?;
            report(&outcome)?;
        }
    }
    Ok(())
}

async fn run_session(
    ctx: &mut AppContext,
    pattern: &str,
    speed: Option<Speed>,
    minutes: Option<f64>,
) -> Result<SessionOutcome, Box<dyn std::error::Error>> {
    let started = Instant::now();
    let deadline = match minutes {
        Some(m) => session_deadline(started, m)?,
        None => None,
    };
    let speed = speed
        .map(|s| BreathingSpeed::from(s).multiplier())
        .unwrap_or_else(|| ctx.settings().speed_multiplier());
    let event = ctx.start_session_at_speed(pattern, speed, started)?;
    print_event(&event)?;

    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = interval.tick() => {
                let now = Instant::now();
                let outcome = ctx.tick_session(now)?;
                if outcome.finished() {
                    return Ok(outcome);
                }
                for event in &outcome.events {
                    print_event(event)?;
                }
                if deadline.is_some_and(|d| now >= d) {
                    break;
                }
            }
        }
    }

    Ok(ctx.stop_session(Instant::now()))
}

/// Instant at which a `--minutes` limit ends the session. A limit too far
/// out to represent means no deadline.
fn session_deadline(started: Instant, minutes: f64) -> Result<Option<Instant>, String> {
    if minutes.is_nan() || minutes < 0.0 {
        return Err(format!("invalid --minutes value: {minutes}"));
    }
    Ok(Duration::try_from_secs_f64(minutes * 60.0)
        .ok()
        .and_then(|limit| started.checked_add(limit)))
}

/// One compact JSON line per event. Ticks are too frequent to print.
fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    if !matches!(event, Event::Tick { .. }) {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

fn report(outcome: &SessionOutcome) -> Result<(), Box<dyn std::error::Error>> {
    for event in &outcome.events {
        print_event(event)?;
    }
    for warning in &outcome.warnings {
        warn!(%warning, "storage write failed during session");
    }
    Ok(())
}
