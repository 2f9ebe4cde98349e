//! Progress parsing for git's stderr output.
//!
//! git reports transfer phases as lines such as:
//! - `remote: Compressing objects:  50% (3/6)`
//! - `Receiving objects:  45% (450/1000), 1.20 MiB | 2.00 MiB/s`
//! - `Resolving deltas: 100% (12/12), done.`
//!
//! [`parse`] maps one such line to a [`ProgressRecord`] and never fails:
//! anything it does not recognize comes back as `Context` with the raw text.
//! [`StepTracker`] folds the per-phase percentages of a pull into a single
//! overall fraction.

use gitdesk_common::{ProgressDetails, ProgressRecord};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Erase-to-end-of-line sequence git appends to sideband lines on terminals.
const ERASE_LINE: &str = "\x1b[K";

type Constructor = fn(&Captures<'_>, &str) -> Option<ProgressDetails>;

// Evaluated top-to-bottom, first match wins.
static MATCHERS: LazyLock<Vec<(Regex, Constructor)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(
                r"^(?P<title>.+?):\s+(?P<percent>\d{1,3})%\s+\((?P<value>\d+)/(?P<total>\d+)\)(?P<rest>.*)$",
            )
            .unwrap(),
            percent_details as Constructor,
        ),
        (
            Regex::new(
                r"^(?P<title>Git LFS):\s+\((?P<value>\d+) of (?P<total>\d+) files?(?:, \d+ skipped)?\)(?P<rest>.*)$",
            )
            .unwrap(),
            lfs_details as Constructor,
        ),
    ]
});

/// Parse one line of git output.
///
/// Recognized progress lines become `Progress` records whose `percent` is the
/// completion of that phase in [0, 1]. Every other line, including count-only
/// lines like `remote: Counting objects: 1234, done.`, becomes a `Context`
/// record carrying `line` unchanged.
pub fn parse(line: &str) -> ProgressRecord {
    let trimmed = strip_sideband_padding(line);

    for (regex, construct) in MATCHERS.iter() {
        if let Some(caps) = regex.captures(trimmed)
            && let Some(details) = construct(&caps, trimmed)
        {
            return ProgressRecord::Progress { details };
        }
    }

    ProgressRecord::context(line)
}

fn strip_sideband_padding(line: &str) -> &str {
    let mut trimmed = line.trim_end();
    while let Some(stripped) = trimmed.strip_suffix(ERASE_LINE) {
        trimmed = stripped.trim_end();
    }
    trimmed
}

fn percent_details(caps: &Captures<'_>, text: &str) -> Option<ProgressDetails> {
    let value = caps["value"].parse::<u64>().ok()?;
    let total = caps["total"].parse::<u64>().ok()?;
    let reported = caps["percent"].parse::<u32>().ok()?;

    Some(ProgressDetails {
        title: caps["title"].to_string(),
        text: text.to_string(),
        value,
        total,
        percent: fraction(value, total, reported),
        done: is_done(&caps["rest"]),
    })
}

fn lfs_details(caps: &Captures<'_>, text: &str) -> Option<ProgressDetails> {
    let value = caps["value"].parse::<u64>().ok()?;
    let total = caps["total"].parse::<u64>().ok()?;

    Some(ProgressDetails {
        title: caps["title"].to_string(),
        text: text.to_string(),
        value,
        total,
        percent: fraction(value, total, 0),
        done: total > 0 && value >= total,
    })
}

/// `value / total`, falling back to git's own rounded percentage when the
/// total is zero.
fn fraction(value: u64, total: u64, reported_percent: u32) -> f64 {
    let raw = if total > 0 {
        value as f64 / total as f64
    } else {
        f64::from(reported_percent) / 100.0
    };
    raw.clamp(0.0, 1.0)
}

fn is_done(rest: &str) -> bool {
    rest.split(", ").any(|part| part.trim() == "done.")
}

/// One weighted phase of a multi-phase git operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressStep {
    /// Title exactly as git prints it, including any `remote: ` prefix
    pub title: &'static str,
    /// Share of the overall operation, weights of a step list sum to 1
    pub weight: f64,
}

/// Phases of a pull, in the order git reports them.
pub const PULL_STEPS: &[ProgressStep] = &[
    ProgressStep {
        title: "remote: Compressing objects",
        weight: 0.1,
    },
    ProgressStep {
        title: "Receiving objects",
        weight: 0.7,
    },
    ProgressStep {
        title: "Resolving deltas",
        weight: 0.2,
    },
];

/// Folds per-phase progress into an overall completion fraction.
///
/// A record only advances the tracker when its title matches the current step
/// or a later one, so the overall value does not move backwards when git
/// re-reports an earlier phase.
#[derive(Debug, Clone)]
pub struct StepTracker {
    steps: &'static [ProgressStep],
    step_index: usize,
    last_value: f64,
}

impl StepTracker {
    pub fn new(steps: &'static [ProgressStep]) -> Self {
        Self {
            steps,
            step_index: 0,
            last_value: 0.0,
        }
    }

    /// Tracker preloaded with [`PULL_STEPS`].
    pub fn pull() -> Self {
        Self::new(PULL_STEPS)
    }

    /// Update the tracker with a record and return the overall fraction.
    ///
    /// Context records and progress for unknown phases return the last
    /// overall value unchanged.
    pub fn observe(&mut self, record: &ProgressRecord) -> f64 {
        let ProgressRecord::Progress { details } = record else {
            return self.last_value;
        };

        let mut overall = 0.0;
        for (index, step) in self.steps.iter().enumerate() {
            if index >= self.step_index && details.title == step.title {
                overall += step.weight * details.percent;
                self.step_index = index;
                self.last_value = overall.min(1.0);
                return self.last_value;
            }
            overall += step.weight;
        }

        self.last_value
    }

    /// The most recent overall fraction.
    pub fn last_value(&self) -> f64 {
        self.last_value
    }
}

impl Default for StepTracker {
    fn default() -> Self {
        Self::pull()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(record: &ProgressRecord) -> &ProgressDetails {
        match record {
            ProgressRecord::Progress { details } => details,
            ProgressRecord::Context { text } => panic!("Expected Progress, got Context({text})"),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_parse_counting_objects_half() {
        let record = parse("Counting objects: 50% (50/100)");
        let d = details(&record);
        assert_eq!(d.title, "Counting objects");
        assert_eq!(d.value, 50);
        assert_eq!(d.total, 100);
        assert_close(d.percent, 0.5);
        assert!(!d.done);
    }

    #[test]
    fn test_parse_receiving_objects_with_throughput() {
        let record = parse("Receiving objects:  45% (450/1000), 1.20 MiB | 2.00 MiB/s");
        let d = details(&record);
        assert_eq!(d.title, "Receiving objects");
        assert_close(d.percent, 0.45);
        assert_eq!(d.text, "Receiving objects:  45% (450/1000), 1.20 MiB | 2.00 MiB/s");
    }

    #[test]
    fn test_parse_done_marker() {
        let record = parse("Resolving deltas: 100% (12/12), done.");
        let d = details(&record);
        assert!(d.done);
        assert_close(d.percent, 1.0);

        let record = parse("Receiving objects: 100% (3/3), 292 bytes | 292.00 KiB/s, done.");
        assert!(details(&record).done);
    }

    #[test]
    fn test_parse_remote_prefixed_title() {
        let record = parse("remote: Counting objects: 10% (1/10)");
        let d = details(&record);
        assert_eq!(d.title, "remote: Counting objects");
        assert_close(d.percent, 0.1);
    }

    #[test]
    fn test_parse_strips_sideband_padding() {
        let record = parse("remote: Compressing objects:  50% (3/6)        ");
        assert_eq!(details(&record).title, "remote: Compressing objects");

        let record = parse("remote: Compressing objects: 100% (6/6), done.\x1b[K");
        let d = details(&record);
        assert!(d.done);
        assert_eq!(d.text, "remote: Compressing objects: 100% (6/6), done.");
    }

    #[test]
    fn test_parse_unknown_lines_are_context_verbatim() {
        for line in [
            "From github.com:org/repo",
            " * branch            main       -> FETCH_HEAD",
            "Already up to date.",
            "remote: Total 3 (delta 0), reused 0 (delta 0), pack-reused 0",
            "remote: Counting objects: 1234, done.",
            "",
            "   ",
            "Receiving objects: abc% (x/y)",
        ] {
            assert_eq!(parse(line), ProgressRecord::context(line), "line {line:?}");
        }
    }

    #[test]
    fn test_parse_context_keeps_trailing_padding() {
        let line = "remote: Enumerating objects: 5, done.\x1b[K";
        assert_eq!(parse(line), ProgressRecord::context(line));
    }

    #[test]
    fn test_parse_overflowing_numbers_fall_back_to_context() {
        let line = "Receiving objects:  50% (99999999999999999999999/2)";
        assert_eq!(parse(line), ProgressRecord::context(line));
    }

    #[test]
    fn test_parse_clamps_percent() {
        let record = parse("Receiving objects: 100% (12/10)");
        assert_close(details(&record).percent, 1.0);
    }

    #[test]
    fn test_parse_zero_total_uses_reported_percent() {
        let record = parse("Checking out files:  25% (0/0)");
        assert_close(details(&record).percent, 0.25);
    }

    #[test]
    fn test_parse_lfs_progress() {
        let record = parse("Git LFS: (1 of 4 files) 1.05 MB / 4.20 MB");
        let d = details(&record);
        assert_eq!(d.title, "Git LFS");
        assert_close(d.percent, 0.25);
        assert!(!d.done);

        let record = parse("Git LFS: (4 of 4 files, 1 skipped) 4.20 MB / 4.20 MB");
        assert!(details(&record).done);
    }

    #[test]
    fn test_tracker_weights_pull_phases() {
        let mut tracker = StepTracker::pull();
        assert_close(tracker.observe(&parse("remote: Compressing objects:  50% (1/2)")), 0.05);
        assert_close(tracker.observe(&parse("Receiving objects:  50% (5/10)")), 0.1 + 0.35);
        assert_close(tracker.observe(&parse("Resolving deltas: 100% (4/4), done.")), 1.0);
    }

    #[test]
    fn test_tracker_ignores_context_and_unknown_phases() {
        let mut tracker = StepTracker::pull();
        tracker.observe(&parse("Receiving objects:  10% (1/10)"));
        let before = tracker.last_value();
        assert_close(tracker.observe(&parse("From github.com:org/repo")), before);
        assert_close(tracker.observe(&parse("remote: Counting objects: 10% (1/10)")), before);
    }

    #[test]
    fn test_tracker_does_not_move_back_to_earlier_phase() {
        let mut tracker = StepTracker::pull();
        let resolving = tracker.observe(&parse("Resolving deltas:  50% (1/2)"));
        assert_close(resolving, 0.9);
        let after = tracker.observe(&parse("remote: Compressing objects: 100% (2/2)"));
        assert_close(after, resolving);
    }
}
