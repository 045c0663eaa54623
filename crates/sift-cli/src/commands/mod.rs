//! Command implementations.

pub mod config;
pub mod detect;
pub mod fetch;
pub mod process;

pub use self::config::execute_config;
pub use self::detect::execute_detect;
pub use self::fetch::execute_fetch;
pub use self::process::{execute_process, Runner};
