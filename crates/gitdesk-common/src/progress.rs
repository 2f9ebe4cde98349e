//! Progress types shared between the pull wrapper and its observers.
//!
//! A [`ProgressRecord`] is what a single line of git output parses into.
//! A [`PullProgress`] is what observers actually receive.

use serde::{Deserialize, Serialize};

/// A measured step parsed from a git progress line.
///
/// For `Receiving objects:  45% (450/1000), 1.20 MiB | 2.00 MiB/s` the title is
/// `Receiving objects`, value 450, total 1000 and percent 0.45.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressDetails {
    /// Phase label, everything before the last `": "`
    pub title: String,
    /// The raw line the details were parsed from
    pub text: String,
    /// Units completed so far
    pub value: u64,
    /// Total units in this phase
    pub total: u64,
    /// Completion fraction of this phase in [0, 1]
    pub percent: f64,
    /// Whether git marked the phase `done.`
    #[serde(default)]
    pub done: bool,
}

/// One line of subprocess output, tagged as contextual or measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProgressRecord {
    /// Informational line with no completion fraction.
    Context { text: String },
    /// Measured step.
    Progress { details: ProgressDetails },
}

impl ProgressRecord {
    /// Build a context record from raw text.
    pub fn context(text: impl Into<String>) -> Self {
        ProgressRecord::Context { text: text.into() }
    }

    /// The text this record describes.
    ///
    /// For context records this is the raw line; for progress records it is
    /// the detail text.
    pub fn text(&self) -> &str {
        match self {
            ProgressRecord::Context { text } => text,
            ProgressRecord::Progress { details } => &details.text,
        }
    }
}

/// The operation an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    #[default]
    Pull,
}

impl std::fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressKind::Pull => write!(f, "pull"),
        }
    }
}

/// Normalized progress event delivered to observers of a pull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullProgress {
    pub kind: ProgressKind,
    /// Headline such as `Pulling origin`
    pub title: String,
    /// Current phase description, absent on the initial event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Overall completion fraction in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Name of the remote being pulled from
    pub remote: String,
}

impl PullProgress {
    /// Title used for every event of a pull from `remote`.
    pub fn title_for(remote: &str) -> String {
        format!("Pulling {}", remote)
    }

    /// The zero-progress event emitted before git produces any output.
    pub fn started(remote: &str) -> Self {
        Self {
            kind: ProgressKind::Pull,
            title: Self::title_for(remote),
            description: None,
            value: Some(0.0),
            remote: remote.to_string(),
        }
    }

    /// An event describing the current phase of a pull.
    pub fn update(remote: &str, description: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            kind: ProgressKind::Pull,
            title: Self::title_for(remote),
            description: Some(description.into()),
            value,
            remote: remote.to_string(),
        }
    }
}
