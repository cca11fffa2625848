//! Command-line interface definitions and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Cli, Command, ConfigAction, GenerateArgs, ThemeAction};
pub use commands::{
    build_settings, handle_config_action, handle_theme_action, run_generate, run_studio,
};
pub use enums::ThemeArg;
