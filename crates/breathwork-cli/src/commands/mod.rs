pub mod achievements;
pub mod config;
pub mod goal;
pub mod history;
pub mod pattern;
pub mod reminder;
pub mod session;
pub mod stats;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
