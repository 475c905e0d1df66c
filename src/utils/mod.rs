pub mod logging;
pub mod timing;

pub use logging::{init_logging, LoggingGuards};
pub use timing::{complete_command_timer, log_llm_timing, start_command_timer, CommandTimer};
