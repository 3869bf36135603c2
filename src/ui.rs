// UI module for consistent terminal output with spinners and styling

#![allow(clippy::print_stdout, clippy::print_stderr)]

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Check if stderr is a TTY (for interactive output)
fn is_tty() -> bool {
    Term::stderr().is_term()
}

fn spinner_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars(SPINNER_CHARS)
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Create a styled spinner for network work
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if !is_tty() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb.set_style(spinner_style("{spinner:.cyan} {msg}"));
    pb.set_message(message.to_string());

    if is_tty() {
        pb.enable_steady_tick(Duration::from_millis(80));
    }

    pb
}

fn finish_spinner(pb: &ProgressBar, msg: String, to_stderr: bool) {
    if is_tty() {
        pb.set_style(spinner_style("{msg}"));
        pb.finish_with_message(msg);
    } else {
        pb.finish_and_clear();
        if to_stderr {
            eprintln!("{}", msg);
        } else {
            println!("{}", msg);
        }
    }
}

/// Finish a spinner with success
pub fn finish_spinner_success(pb: &ProgressBar, message: &str) {
    finish_spinner(pb, format!("{} {}", style("✓").green(), message), false);
}

/// Finish a spinner with a name and a dimmed detail, e.g. a version
pub fn finish_spinner_resolved(pb: &ProgressBar, name: &str, detail: &str) {
    finish_spinner(
        pb,
        format!("{} {} {}", style("✓").green(), name, style(detail).dim()),
        false,
    );
}

/// Finish a spinner with error
pub fn finish_spinner_error(pb: &ProgressBar, message: &str) {
    finish_spinner(pb, format!("{} {}", style("✗").red(), message), true);
}

/// Print a success message with checkmark
pub fn success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print an info/action message with arrow
pub fn action(message: &str) {
    println!("{} {}", style("→").cyan(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message);
}

/// Print a dimmed/secondary message
pub fn dim(message: &str) {
    println!("{}", style(message).dim());
}

/// Print raw output such as JSON documents
pub fn plain(message: &str) {
    println!("{}", message);
}
