//! Diagnostics for the terminal. Everything goes to stderr; stdout carries
//! only the plan.

use colored::Colorize;

/// Print a warning message
pub fn warn(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print an error, with its category when it came from a planner.
pub fn report(err: &anyhow::Error) {
    match err.downcast_ref::<maintenance::Error>() {
        Some(planner_err) => error(&format!(
            "{}: {}",
            planner_err.category().description().bold(),
            planner_err
        )),
        None => error(&format!("{err:#}")),
    }
}
