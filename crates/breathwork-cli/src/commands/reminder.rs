use breathwork_core::{AppContext, ReminderTime};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Schedule the daily reminder at HH:MM local time
    Set {
        time: String,
    },
    /// Cancel the daily reminder
    Cancel,
    /// Print the scheduled time, if any
    Show,
}

fn parse_time(value: &str) -> Result<ReminderTime, Box<dyn std::error::Error>> {
    let (hour, minute) = value
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{value}'"))?;
    Ok(ReminderTime::new(hour.trim().parse()?, minute.trim().parse()?)?)
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = AppContext::open()?;

    match action {
        ReminderAction::Set { time } => {
            let time = parse_time(&time)?;
            ctx.set_reminder(time)?;
            println!("reminder set for {time}");
        }
        ReminderAction::Cancel => {
            ctx.cancel_reminder();
            println!("reminder cancelled");
        }
        ReminderAction::Show => match ctx.settings().reminder {
            Some(time) => println!("{time}"),
            None => println!("no reminder"),
        },
    }
    for warning in ctx.take_warnings() {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hh_mm() {
        assert_eq!(parse_time("07:30").unwrap(), ReminderTime { hour: 7, minute: 30 });
        assert!(parse_time("0730").is_err());
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("ab:cd").is_err());
    }
}
