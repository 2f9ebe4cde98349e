pub mod config;
pub mod errors;
pub mod git;
pub mod logging;
pub mod sidebar;
pub mod storage;
pub mod throttle;
pub mod ui;
