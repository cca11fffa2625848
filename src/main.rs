use clap::Parser;

use veo_studio::cli::{
    handle_config_action, handle_theme_action, run_generate, run_studio, Cli, Command,
};
use veo_studio::config::Config;
use veo_studio::veo::{CancelToken, VEO_API_KEY_ENV};

/// Load .env file and check for GEMINI_API_KEY
///
/// Does not override existing environment variables.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    if std::env::var(VEO_API_KEY_ENV).is_err() {
        eprintln!("Warning: {} environment variable not set.", VEO_API_KEY_ENV);
        eprintln!("         Video generation will not be available.");
        eprintln!("         Set {} in .env or environment to enable.\n", VEO_API_KEY_ENV);
    }
}

fn setup_ctrlc_handler(shutdown: CancelToken) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        shutdown.cancel();
        eprintln!("\nReceived Ctrl+C, cancelling...");
    })
}

fn main() {
    load_env();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = CancelToken::new();
    if let Err(e) = setup_ctrlc_handler(shutdown.clone()) {
        log::warn!("Failed to install Ctrl+C handler: {}", e);
    }

    let result = match cli.command {
        Command::Generate(args) => run_generate(&config, args, shutdown),
        Command::Studio { output_dir, share } => run_studio(&config, output_dir, share, shutdown),
        Command::Theme { action } => handle_theme_action(action),
        Command::Config { action } => handle_config_action(action, cli.config.as_deref(), &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
