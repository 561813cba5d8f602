//! `TerminalReporter` — Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly. On a TTY, step messages drive a single
//! spinner instead of printing one line per step; poll stages can run for
//! minutes, and a live spinner reads better than a silent pause.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"`, or updates the spinner on a TTY
/// - `success()` prints `"  ✓ {message}"`, finishing any spinner
/// - `warn()` prints `"  ! {message}"`
///
/// All output is suppressed when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: RefCell::new(None),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if self.ctx.show_progress() {
            let mut spinner = self.spinner.borrow_mut();
            match spinner.as_ref() {
                Some(pb) => pb.set_message(message.to_string()),
                None => *spinner = Some(progress::spinner(message)),
            }
        } else {
            println!("  {} {message}", "→".cyan());
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if let Some(pb) = self.spinner.borrow_mut().take() {
            progress::finish_ok(&pb, message);
        } else {
            println!("  {} {message}", "✓".green());
        }
    }

    fn warn(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        let spinner = self.spinner.borrow();
        if let Some(pb) = spinner.as_ref() {
            pb.println(format!("  {} {message}", "!".yellow()));
        } else {
            println!("  {} {message}", "!".yellow());
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        // A run that fails mid-stage leaves the spinner live; clear it so
        // the error line below is not garbled.
        if let Some(pb) = self.spinner.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}
