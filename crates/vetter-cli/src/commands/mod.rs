pub mod analyze;
pub mod config;

pub use analyze::{run_analyze, AnalyzeOptions};
pub use config::{handle_config_command, ConfigCommand};
