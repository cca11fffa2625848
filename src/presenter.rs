//! Terminal presenter: prints progress, saves generated videos and shares
//! them through a configured command.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tokio::io::AsyncWriteExt;

use crate::theme::Theme;
use crate::veo::{AssetAction, AssetCard, Presenter, VeoError};

/// Where users can check their Gemini API quota.
pub const QUOTA_HELP_URL: &str = "https://ai.google.dev/gemini-api/docs/rate-limits";

/// Presenter that writes to stdout/stderr and the local filesystem.
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    output_dir: PathBuf,
    share_command: Option<String>,
    auto_share: bool,
    theme: Theme,
}

impl TerminalPresenter {
    pub fn new(output_dir: impl Into<PathBuf>, theme: Theme) -> Self {
        Self {
            output_dir: output_dir.into(),
            share_command: None,
            auto_share: false,
            theme,
        }
    }

    /// Enable sharing through `command`. Videos are shared as soon as they
    /// are saved when `auto_share` is set.
    pub fn with_share_command(mut self, command: Option<String>, auto_share: bool) -> Self {
        self.share_command = command.filter(|c| !c.trim().is_empty());
        self.auto_share = auto_share;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    fn styled(&self, text: &str) -> String {
        match self.theme {
            Theme::Dark => text.bright_cyan().to_string(),
            Theme::Light => text.blue().to_string(),
        }
    }

    /// Save `bytes` under `filename`, adding a numeric suffix if the name is
    /// already taken. Concurrent saves never overwrite each other.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, VeoError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{}", ext)),
            None => (filename, String::new()),
        };

        let mut attempt = 1u32;
        loop {
            let candidate = if attempt == 1 {
                self.output_dir.join(filename)
            } else {
                self.output_dir.join(format!("{}-{}{}", stem, attempt, ext))
            };

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn share(&self, path: &Path, title: &str, text: &str) {
        let Some(command) = &self.share_command else {
            return;
        };
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return;
        };

        let result = tokio::process::Command::new(program)
            .args(parts)
            .arg(path)
            .env("VEO_SHARE_TITLE", title)
            .env("VEO_SHARE_TEXT", text)
            .status()
            .await;

        match result {
            Ok(status) if status.success() => {
                println!("  Shared {}", path.display());
            }
            Ok(status) => log::info!("Sharing failed or was cancelled: {}", status),
            Err(e) => log::info!("Sharing failed or was cancelled: {}", e),
        }
    }
}

#[async_trait::async_trait]
impl Presenter for TerminalPresenter {
    fn status(&self, text: &str) {
        println!("{}", self.styled(text));
    }

    fn quota_exceeded(&self) {
        eprintln!("{}", "Quota exceeded for this API key.".red().bold());
        eprintln!("  Check your usage and limits at {}", QUOTA_HELP_URL);
        eprintln!("  Or select a different key by setting GEMINI_API_KEY.");
    }

    fn supports_file_sharing(&self) -> bool {
        self.share_command.is_some()
    }

    async fn present(&self, card: AssetCard<'_>) -> Result<(), VeoError> {
        let path = self.save(&card.asset.filename, &card.asset.bytes).await?;
        println!(
            "{} {} ({} bytes, {})",
            "Saved".green(),
            path.display(),
            card.asset.bytes.len(),
            card.asset.mime_type
        );

        if card.offers(AssetAction::Share) {
            if self.auto_share {
                self.share(&path, card.share_title, card.share_text).await;
            } else {
                println!("  Share available: rerun with --share to share automatically");
            }
        }
        Ok(())
    }
}
