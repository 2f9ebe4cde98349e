use crate::git::PullProgress;
use crate::ui::icons::{CHECK, CROSS, DOWN};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Resolution of the bar; event values are fractions in [0, 1].
const BAR_LENGTH: u64 = 1000;

/// Terminal rendering of a running pull, driven by [`PullProgress`] events.
pub struct PullUI {
    multi: MultiProgress,
    bar: ProgressBar,
    verbose: bool,
}

impl PullUI {
    pub fn new(remote: &str, verbose: bool) -> Self {
        Self::with_target(remote, verbose, ProgressDrawTarget::stderr())
    }

    /// A UI that draws nothing, for tests and non-interactive output.
    pub fn hidden(remote: &str) -> Self {
        Self::with_target(remote, false, ProgressDrawTarget::hidden())
    }

    fn with_target(remote: &str, verbose: bool, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);

        let bar_style = ProgressStyle::default_bar()
            .template("{prefix:.bold} {spinner} [{bar:40.cyan/blue}] {percent:>3}% {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let bar = multi.add(ProgressBar::new(BAR_LENGTH));
        bar.set_style(bar_style);
        bar.set_prefix(format!("{}{}", DOWN, PullProgress::title_for(remote)));
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            multi,
            bar,
            verbose,
        }
    }

    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Apply one progress event to the bar.
    pub fn handle(&self, event: &PullProgress) {
        if let Some(value) = event.value {
            let position = (value.clamp(0.0, 1.0) * BAR_LENGTH as f64).round() as u64;
            // Overall progress only moves forward.
            if position > self.bar.position() {
                self.bar.set_position(position);
            }
        }
        if let Some(ref description) = event.description {
            self.bar.set_message(style(description).dim().to_string());
            if self.verbose {
                self.print_line(format!("    {} {}", style("→").dim(), style(description).dim()));
            }
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish_success(&self, summary: &str) {
        self.bar.set_position(BAR_LENGTH);
        self.bar.finish_and_clear();
        self.print_line(format!("{}{}", CHECK, style(summary).green()));
    }

    pub fn finish_error(&self, message: &str) {
        self.bar.abandon();
        self.print_line(format!("{}{}", CROSS, style(message).red()));
    }
}
