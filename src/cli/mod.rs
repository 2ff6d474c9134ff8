pub mod commands;
pub mod output;

pub use commands::{Command, CommandContext, CommandStatus, OutputFormat};
pub use output::{print_error, print_success, print_warning, Icons};
