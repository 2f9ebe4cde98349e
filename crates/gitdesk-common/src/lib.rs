//! Shared domain types for gitdesk.
//!
//! Kept free of process and runtime dependencies so UI front-ends can consume
//! progress events without pulling in tokio or git2.

pub mod progress;

pub use progress::{ProgressDetails, ProgressKind, ProgressRecord, PullProgress};
