//! Subcommand handlers for generate, studio, theme and config.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::args::{ConfigAction, GenerateArgs, ThemeAction};
use crate::config::{default_path as get_config_path, Config, DEFAULT_CONFIG_TEMPLATE};
use crate::presenter::TerminalPresenter;
use crate::session::Session;
use crate::studio::Studio;
use crate::theme::{Theme, ThemeStore};
use crate::veo::{
    self, parse_aspect_ratio, parse_duration_seconds, CancelToken, GenerationOutcome, PollPolicy,
    VeoClient, VeoError, VideoSettings, VEO_API_KEY_ENV,
};

/// Merge command-line settings over the configured defaults.
pub fn build_settings(args: &GenerateArgs, defaults: VideoSettings) -> VideoSettings {
    let mut settings = defaults;
    if let Some(raw) = &args.aspect_ratio {
        settings.aspect_ratio = parse_aspect_ratio(raw);
    }
    if let Some(raw) = &args.duration {
        settings.duration_seconds = parse_duration_seconds(raw);
        if settings.duration_seconds.is_none() {
            log::warn!("Duration '{}' is not a positive number; it will not be sent", raw);
        }
    }
    if let Some(count) = args.count {
        settings.number_of_videos = count;
    }
    if let Some(quality) = &args.quality {
        settings.quality = Some(quality.clone());
    }
    settings
}

fn poll_policy(config: &Config, max_polls: Option<u32>, timeout: Option<u64>) -> PollPolicy {
    let mut policy = config.polling.policy();
    if let Some(max) = max_polls {
        policy = policy.with_max_polls(Some(max));
    }
    if let Some(secs) = timeout {
        policy = policy.with_timeout(Some(Duration::from_secs(secs)));
    }
    policy
}

fn create_client(config: &Config) -> Result<VeoClient, String> {
    let api_key = std::env::var(VEO_API_KEY_ENV).unwrap_or_default();
    VeoClient::with_options(api_key, config.api.base_url.clone(), config.api.model.clone()).map_err(
        |e| match e {
            VeoError::MissingApiKey => format!(
                "{} environment variable is not set.\n\n\
                Add your API key to a .env file:\n    \
                echo '{}=your-api-key-here' >> .env\n\n\
                Or set it as an environment variable:\n    \
                export {}=\"your-api-key-here\"\n\n\
                Get your API key at: https://aistudio.google.com/apikey",
                VEO_API_KEY_ENV, VEO_API_KEY_ENV, VEO_API_KEY_ENV
            ),
            _ => format!("Failed to create Veo client: {}", e),
        },
    )
}

fn output_dir(config: &Config, cli_dir: Option<PathBuf>) -> PathBuf {
    cli_dir
        .or_else(|| config.output.dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn presenter(config: &Config, output_dir: PathBuf, theme: Theme, share: bool) -> TerminalPresenter {
    TerminalPresenter::new(output_dir, theme).with_share_command(config.share.command.clone(), share)
}

/// Run `veo-studio generate`.
pub fn run_generate(
    config: &Config,
    args: GenerateArgs,
    shutdown: CancelToken,
) -> Result<(), String> {
    let theme = ThemeStore::with_default_path().resolve_initial();
    let mut session = Session::new(build_settings(&args, config.defaults.settings()), theme);
    if let Some(path) = &args.image {
        session
            .load_image(path)
            .map_err(|e| format!("Failed to read image '{}': {}", path.display(), e))?;
    }

    let client = create_client(config)?;
    let request = session.request(&args.prompt);
    let policy = poll_policy(config, args.max_polls, args.timeout);
    let presenter = presenter(
        config,
        output_dir(config, args.output_dir.clone()),
        theme,
        args.share,
    );

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    let outcome =
        rt.block_on(async { veo::generate(&client, &request, &policy, &shutdown, &presenter).await });

    match outcome {
        GenerationOutcome::Completed(assets) => {
            log::info!("Generated {} video(s)", assets.len());
            Ok(())
        }
        GenerationOutcome::Failed(failure) => Err(failure.status_message()),
    }
}

/// Run `veo-studio studio`.
pub fn run_studio(
    config: &Config,
    output_dir_arg: Option<PathBuf>,
    share: bool,
    shutdown: CancelToken,
) -> Result<(), String> {
    let theme_store = ThemeStore::with_default_path();
    let theme = theme_store.resolve_initial();
    let session = Session::new(config.defaults.settings(), theme);

    let client = Arc::new(create_client(config)?);
    let presenter = presenter(config, output_dir(config, output_dir_arg), theme, share);
    let studio = Studio::new(
        client,
        session,
        config.polling.policy(),
        presenter,
        theme_store,
        shutdown,
    );

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;
    rt.block_on(studio.run());
    Ok(())
}

/// Handle theme subcommand actions.
pub fn handle_theme_action(action: ThemeAction) -> Result<(), String> {
    let store = ThemeStore::with_default_path();
    match action {
        ThemeAction::Show => {
            let saved = store.load().map_err(|e| e.to_string())?;
            match saved {
                Some(theme) => println!("Theme: {} (saved in {})", theme, store.path().display()),
                None => println!("Theme: {} (not saved)", store.resolve_initial()),
            }
        }
        ThemeAction::Toggle => {
            let theme = store
                .toggle(store.resolve_initial())
                .map_err(|e| e.to_string())?;
            println!("Theme: {}", theme);
        }
        ThemeAction::Set { theme } => {
            let theme = Theme::from(theme);
            store.save(theme).map_err(|e| e.to_string())?;
            println!("Theme: {}", theme);
        }
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config_path: Option<&Path>,
    config: &Config,
) -> Result<(), String> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let policy = config.polling.policy();
            let defaults = config.defaults.settings();
            println!("Current configuration:");
            println!("  Base URL: {}", config.api.base_url);
            println!("  Model: {}", config.api.model);
            println!("  Poll interval: {:?}", policy.interval);
            println!(
                "  Max polls: {}",
                policy
                    .max_polls
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unlimited".to_string())
            );
            println!(
                "  Timeout: {}",
                policy
                    .timeout
                    .map(|t| format!("{:?}", t))
                    .unwrap_or_else(|| "none".to_string())
            );
            println!(
                "  Aspect ratio: {}",
                defaults
                    .aspect_ratio
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "service default".to_string())
            );
            println!("  Videos per prompt: {}", defaults.number_of_videos);
            println!(
                "  Output dir: {}",
                output_dir(config, None).display()
            );
            println!(
                "  Share command: {}",
                config.share.command.as_deref().unwrap_or("none")
            );
            println!(
                "  API key: {}",
                if std::env::var(VEO_API_KEY_ENV).is_ok() {
                    "set"
                } else {
                    "not set"
                }
            );
            println!();

            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
        }
        ConfigAction::Init => {
            if path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'veo-studio config show' to view current settings.",
                    path.display()
                ));
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }

            std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
                .map_err(|e| format!("Error writing config file: {}", e))?;

            println!("Created config file: {}", path.display());
        }
    }
    Ok(())
}
