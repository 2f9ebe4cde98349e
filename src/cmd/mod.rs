//! CLI command implementations.
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `pull`    | `Pull`           |
//! | `sidebar` | `Sidebar`        |
//! | `config`  | `Config`         |

pub mod config;
pub mod pull;
pub mod sidebar;

pub use config::cmd_config;
pub use pull::cmd_pull;
pub use sidebar::cmd_sidebar;
