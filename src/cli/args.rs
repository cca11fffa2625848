//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::ThemeArg;

/// Generate videos from text prompts with Google Veo
#[derive(Parser, Debug)]
#[command(name = "veo-studio")]
#[command(version, about = "Generate videos from text prompts with Google Veo", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Generate one video from a prompt
    veo-studio generate \"a paper boat drifting down a rainy street\"

    # Animate an image without a prompt
    veo-studio generate --image photo.png

    # Two 16:9 videos of 8 seconds, starting from an image
    veo-studio generate \"make it snow\" --image photo.png -a 16:9 -d 8 -n 2

    # Interactive prompt loop
    veo-studio studio

ENVIRONMENT:
    GEMINI_API_KEY    Required. Your Gemini API key.
    RUST_LOG          Log level (default: warn).")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path (default: ~/.config/veo-studio/config.toml)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate videos from a single prompt
    Generate(GenerateArgs),

    /// Interactive prompt loop with a persistent reference image and settings
    Studio {
        /// Directory for downloaded videos
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,

        /// Share each video with the configured share command
        #[arg(long)]
        share: bool,
    },

    /// Show or change the saved theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// The text prompt describing the video to generate (may be empty with --image)
    #[arg(default_value = "")]
    pub prompt: String,

    /// Reference image used as the starting frame
    #[arg(long, short = 'i')]
    pub image: Option<PathBuf>,

    /// Aspect ratio: 1:1, 16:9, 9:16, 3:4 or 4:3 (omitted if empty or unknown)
    #[arg(long, short = 'a')]
    pub aspect_ratio: Option<String>,

    /// Duration in seconds (omitted if not a positive number)
    #[arg(long, short = 'd')]
    pub duration: Option<String>,

    /// Number of videos to generate
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u32).range(1..))]
    pub count: Option<u32>,

    /// Quality preference (recorded only; the service has no quality option)
    #[arg(long, short = 'q')]
    pub quality: Option<String>,

    /// Directory for downloaded videos
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Share each video with the configured share command
    #[arg(long)]
    pub share: bool,

    /// Give up after this many status checks
    #[arg(long)]
    pub max_polls: Option<u32>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ThemeAction {
    /// Show the current theme
    Show,
    /// Switch between dark and light
    Toggle,
    /// Save a specific theme
    Set { theme: ThemeArg },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(cli: Cli) -> GenerateArgs {
        match cli.command {
            Command::Generate(args) => args,
            other => panic!("Expected Generate subcommand, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_defaults() {
        let args = generate_args(Cli::parse_from(["veo-studio", "generate", "a fox"]));
        assert_eq!(args.prompt, "a fox");
        assert!(args.image.is_none());
        assert!(args.aspect_ratio.is_none());
        assert!(args.duration.is_none());
        assert!(args.count.is_none());
        assert!(args.quality.is_none());
        assert!(!args.share);
        assert!(args.max_polls.is_none());
        assert!(args.timeout.is_none());
    }

    #[test]
    fn test_generate_all_options() {
        let cli = Cli::parse_from([
            "veo-studio",
            "generate",
            "make it snow",
            "-i",
            "photo.png",
            "-a",
            "16:9",
            "-d",
            "8",
            "-n",
            "2",
            "-q",
            "high",
            "-o",
            "/tmp/out",
            "--share",
            "--max-polls",
            "30",
            "--timeout",
            "90",
            "-c",
            "/tmp/config.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
        let args = generate_args(cli);
        assert_eq!(args.image, Some(PathBuf::from("photo.png")));
        assert_eq!(args.aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(args.duration.as_deref(), Some("8"));
        assert_eq!(args.count, Some(2));
        assert_eq!(args.quality.as_deref(), Some("high"));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
        assert!(args.share);
        assert_eq!(args.max_polls, Some(30));
        assert_eq!(args.timeout, Some(90));
    }

    #[test]
    fn test_generate_rejects_zero_count() {
        let result = Cli::try_parse_from(["veo-studio", "generate", "x", "-n", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_image_without_prompt() {
        let args = generate_args(Cli::parse_from(["veo-studio", "generate", "-i", "ref.png"]));
        assert_eq!(args.prompt, "");
        assert_eq!(args.image, Some(PathBuf::from("ref.png")));
    }

    #[test]
    fn test_studio_subcommand() {
        let cli = Cli::parse_from(["veo-studio", "studio", "--share", "-o", "clips"]);
        match cli.command {
            Command::Studio { output_dir, share } => {
                assert_eq!(output_dir, Some(PathBuf::from("clips")));
                assert!(share);
            }
            other => panic!("Expected Studio subcommand, got {:?}", other),
        }
    }

    #[test]
    fn test_theme_subcommands() {
        let cli = Cli::parse_from(["veo-studio", "theme", "set", "dark"]);
        assert!(matches!(
            cli.command,
            Command::Theme {
                action: ThemeAction::Set {
                    theme: ThemeArg::Dark
                }
            }
        ));

        let cli = Cli::parse_from(["veo-studio", "theme", "toggle"]);
        assert!(matches!(
            cli.command,
            Command::Theme {
                action: ThemeAction::Toggle
            }
        ));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::parse_from(["veo-studio", "config", "init"]);
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Init
            }
        ));
    }
}
