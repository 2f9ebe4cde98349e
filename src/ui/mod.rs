pub mod icons;
pub mod pull_progress;

pub use pull_progress::PullUI;
