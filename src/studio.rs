//! Interactive studio: a prompt loop for generating videos.
//!
//! Plain text is submitted as a generation prompt; slash commands change the
//! session (reference image, settings, theme) or cancel running generations.
//! Every generation runs as its own task, so a new prompt never waits for or
//! cancels the previous one.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::presenter::TerminalPresenter;
use crate::session::Session;
use crate::theme::ThemeStore;
use crate::veo::{
    generate, parse_aspect_ratio, parse_duration_seconds, CancelToken, PollPolicy, VideoService,
};

/// Prompts offered through `/presets`.
pub const PRESET_PROMPTS: &[&str] = &[
    "A hummingbird hovering over a red flower in slow motion",
    "Time-lapse of clouds rolling over a mountain ridge at sunrise",
    "A paper boat drifting down a rain-soaked city street",
    "Neon-lit alley in the rain at night, cinematic camera dolly",
    "A golden retriever running through autumn leaves",
    "Aerial shot of waves crashing against black volcanic rocks",
];

/// Commands entered at the studio prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum StudioCommand {
    /// Generate videos for the given prompt, which may be empty.
    Generate(String),
    /// Load a reference image from disk.
    Image(PathBuf),
    ClearImage,
    /// Set or clear the aspect ratio. Invalid values clear it.
    AspectRatio(String),
    /// Set or clear the duration. Non-numeric values clear it.
    Duration(String),
    Count(u32),
    Quality(String),
    Presets,
    /// Generate from the n-th (1-based) preset prompt.
    Preset(usize),
    Settings,
    ToggleTheme,
    Cancel,
    Help,
    Quit,
}

pub const HELP_TEXT: &str = "Commands:
  <prompt>             Generate videos from a text prompt
  /generate [prompt]   Generate, with an empty prompt if none is given
  /image <path>        Use an image as the starting frame
  /clear-image         Stop using the reference image
  /aspect <ratio|none> Aspect ratio: 1:1, 16:9, 9:16, 3:4, 4:3
  /duration <s|none>   Video length in seconds
  /count <n>           Number of videos to generate
  /quality <label>     Quality preference (not sent to the service)
  /presets             List preset prompts
  /preset <n>          Generate from a preset prompt
  /settings            Show current settings
  /theme               Toggle dark/light theme
  /cancel              Cancel running generations
  /quit                Exit";

/// Parse a line of input into a StudioCommand.
///
/// Empty input yields `None`. Invalid slash commands print a hint and
/// yield `None`.
pub fn parse_input(input: &str) -> Option<StudioCommand> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('/') {
        return parse_command(trimmed);
    }

    Some(StudioCommand::Generate(trimmed.to_string()))
}

fn parse_command(input: &str) -> Option<StudioCommand> {
    let (name, arg) = match input.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (input, ""),
    };

    match name.to_lowercase().as_str() {
        "/image" => {
            if arg.is_empty() {
                print_status("Usage: /image <path>");
                return None;
            }
            Some(StudioCommand::Image(PathBuf::from(arg)))
        }
        "/generate" => Some(StudioCommand::Generate(arg.to_string())),
        "/clear-image" => Some(StudioCommand::ClearImage),
        "/aspect" => Some(StudioCommand::AspectRatio(none_as_empty(arg))),
        "/duration" => Some(StudioCommand::Duration(none_as_empty(arg))),
        "/count" => match arg.parse::<u32>() {
            Ok(n) if n > 0 => Some(StudioCommand::Count(n)),
            _ => {
                print_status("Usage: /count <n> (n >= 1)");
                None
            }
        },
        "/quality" => Some(StudioCommand::Quality(arg.to_string())),
        "/presets" => Some(StudioCommand::Presets),
        "/preset" => match arg.parse::<usize>() {
            Ok(n) if (1..=PRESET_PROMPTS.len()).contains(&n) => Some(StudioCommand::Preset(n)),
            _ => {
                print_status(&format!("Usage: /preset <1-{}>", PRESET_PROMPTS.len()));
                None
            }
        },
        "/settings" => Some(StudioCommand::Settings),
        "/theme" => Some(StudioCommand::ToggleTheme),
        "/cancel" => Some(StudioCommand::Cancel),
        "/help" => Some(StudioCommand::Help),
        "/quit" | "/exit" => Some(StudioCommand::Quit),
        _ => {
            print_status(&format!("Unknown command: {}", name));
            print_status("Type /help for available commands");
            None
        }
    }
}

fn none_as_empty(arg: &str) -> String {
    if arg.eq_ignore_ascii_case("none") {
        String::new()
    } else {
        arg.to_string()
    }
}

pub fn print_prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn print_status(message: &str) {
    println!("{}", message);
}

/// Read stdin lines on a background thread and forward parsed commands.
fn spawn_listener() -> mpsc::UnboundedReceiver<StudioCommand> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        let stdin = io::stdin();
        print_prompt();
        for line in stdin.lock().lines() {
            let Ok(input) = line else {
                break;
            };
            if let Some(cmd) = parse_input(&input) {
                if tx.send(cmd).is_err() {
                    break;
                }
            }
            print_prompt();
        }
    });

    rx
}

/// Runs the interactive loop against a video service.
pub struct Studio<S> {
    service: Arc<S>,
    session: Session,
    policy: PollPolicy,
    presenter: TerminalPresenter,
    theme_store: ThemeStore,
    /// Cancelled on Ctrl+C; stops the loop and every generation.
    shutdown: CancelToken,
    in_flight: Vec<CancelToken>,
    tasks: JoinSet<()>,
}

impl<S: VideoService + 'static> Studio<S> {
    pub fn new(
        service: Arc<S>,
        session: Session,
        policy: PollPolicy,
        presenter: TerminalPresenter,
        theme_store: ThemeStore,
        shutdown: CancelToken,
    ) -> Self {
        Self {
            service,
            session,
            policy,
            presenter,
            theme_store,
            shutdown,
            in_flight: Vec::new(),
            tasks: JoinSet::new(),
        }
    }

    /// Run until `/quit`, end of input or shutdown.
    ///
    /// On `/quit` or shutdown, running generations are cancelled. At end of
    /// input they are allowed to finish.
    pub async fn run(mut self) {
        print_status("veo-studio: type a prompt, or /help for commands");
        let mut commands = spawn_listener();
        let mut ticker = tokio::time::interval(std::time::Duration::from_millis(200));
        let mut cancel_remaining = true;

        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(cmd) => {
                        if !self.handle(cmd) {
                            break;
                        }
                    }
                    None => {
                        cancel_remaining = false;
                        break;
                    }
                },
                Some(_) = self.tasks.join_next(), if !self.tasks.is_empty() => {}
                _ = ticker.tick() => {
                    if self.shutdown.is_cancelled() {
                        break;
                    }
                }
            }
        }

        if cancel_remaining {
            self.cancel_all();
        }
        while !self.tasks.is_empty() {
            tokio::select! {
                _ = self.tasks.join_next() => {}
                _ = ticker.tick() => {
                    if self.shutdown.is_cancelled() {
                        self.cancel_all();
                    }
                }
            }
        }
    }

    /// Apply one command. Returns false when the loop should stop.
    pub fn handle(&mut self, command: StudioCommand) -> bool {
        match command {
            StudioCommand::Generate(prompt) => self.start_generation(&prompt),
            StudioCommand::Preset(n) => {
                let prompt = PRESET_PROMPTS[n - 1];
                print_status(&format!("Preset: {}", prompt));
                self.start_generation(prompt);
            }
            StudioCommand::Image(path) => match self.session.load_image(&path) {
                Ok(image) => print_status(&format!(
                    "Reference image: {} ({} bytes)",
                    image.file_name().unwrap_or("image"),
                    image.bytes().len()
                )),
                Err(e) => print_status(&format!("Error: {}", e)),
            },
            StudioCommand::ClearImage => {
                self.session.clear_image();
                print_status("No file chosen");
            }
            StudioCommand::AspectRatio(raw) => {
                self.session.settings.aspect_ratio = parse_aspect_ratio(&raw);
                self.print_settings();
            }
            StudioCommand::Duration(raw) => {
                self.session.settings.duration_seconds = parse_duration_seconds(&raw);
                self.print_settings();
            }
            StudioCommand::Count(n) => {
                self.session.settings.number_of_videos = n;
                self.print_settings();
            }
            StudioCommand::Quality(label) => {
                self.session.settings.quality = (!label.is_empty()).then_some(label);
                self.print_settings();
            }
            StudioCommand::Presets => {
                for (i, prompt) in PRESET_PROMPTS.iter().enumerate() {
                    print_status(&format!("  {}. {}", i + 1, prompt));
                }
            }
            StudioCommand::Settings => self.print_settings(),
            StudioCommand::ToggleTheme => match self.theme_store.toggle(self.session.theme) {
                Ok(theme) => {
                    self.session.theme = theme;
                    self.presenter = self.presenter.clone().with_theme(theme);
                    print_status(&format!("Theme: {}", theme));
                }
                Err(e) => print_status(&format!("Error: {}", e)),
            },
            StudioCommand::Cancel => {
                let count = self.cancel_all();
                print_status(&format!("Cancelled {} generation(s)", count));
            }
            StudioCommand::Help => print_status(HELP_TEXT),
            StudioCommand::Quit => return false,
        }
        true
    }

    fn start_generation(&mut self, prompt: &str) {
        let request = self.session.request(prompt);
        let cancel = CancelToken::new();
        self.in_flight.retain(|token| !token.is_cancelled());
        self.in_flight.push(cancel.clone());

        let service = Arc::clone(&self.service);
        let presenter = self.presenter.clone();
        let policy = self.policy;
        self.tasks.spawn(async move {
            generate(service.as_ref(), &request, &policy, &cancel, &presenter).await;
            // Mark finished so /cancel only counts running generations.
            cancel.cancel();
        });
    }

    fn cancel_all(&mut self) -> usize {
        self.in_flight
            .drain(..)
            .filter(|token| !token.is_cancelled())
            .inspect(|token| token.cancel())
            .count()
    }

    fn print_settings(&self) {
        let settings = &self.session.settings;
        print_status(&format!(
            "Settings: aspect ratio {}, duration {}, videos {}, quality {}, image {}",
            settings
                .aspect_ratio
                .map(|r| r.to_string())
                .unwrap_or_else(|| "default".to_string()),
            settings
                .duration_seconds
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "default".to_string()),
            settings.number_of_videos,
            settings.quality.as_deref().unwrap_or("default"),
            self.session
                .image()
                .map(|img| img.file_name().unwrap_or("loaded"))
                .unwrap_or("none"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_generate() {
        assert_eq!(
            parse_input("  a fox in the snow  "),
            Some(StudioCommand::Generate("a fox in the snow".to_string()))
        );
    }

    #[test]
    fn test_generate_command_allows_empty_prompt() {
        assert_eq!(
            parse_input("/generate"),
            Some(StudioCommand::Generate(String::new()))
        );
        assert_eq!(
            parse_input("/generate  slow zoom "),
            Some(StudioCommand::Generate("slow zoom".to_string()))
        );
    }

    #[test]
    fn test_empty_input_is_ignored() {
        assert_eq!(parse_input(""), None);
        assert_eq!(parse_input("   \t"), None);
    }

    #[test]
    fn test_image_commands() {
        assert_eq!(
            parse_input("/image ./ref image.png"),
            Some(StudioCommand::Image(PathBuf::from("./ref image.png")))
        );
        assert_eq!(parse_input("/image"), None);
        assert_eq!(parse_input("/clear-image"), Some(StudioCommand::ClearImage));
    }

    #[test]
    fn test_settings_commands() {
        assert_eq!(
            parse_input("/aspect 16:9"),
            Some(StudioCommand::AspectRatio("16:9".to_string()))
        );
        assert_eq!(
            parse_input("/aspect none"),
            Some(StudioCommand::AspectRatio(String::new()))
        );
        assert_eq!(
            parse_input("/duration abc"),
            Some(StudioCommand::Duration("abc".to_string()))
        );
        assert_eq!(parse_input("/count 3"), Some(StudioCommand::Count(3)));
        assert_eq!(parse_input("/count 0"), None);
        assert_eq!(
            parse_input("/quality high"),
            Some(StudioCommand::Quality("high".to_string()))
        );
    }

    #[test]
    fn test_preset_bounds() {
        assert_eq!(parse_input("/preset 1"), Some(StudioCommand::Preset(1)));
        assert_eq!(parse_input("/preset 0"), None);
        assert_eq!(
            parse_input(&format!("/preset {}", PRESET_PROMPTS.len() + 1)),
            None
        );
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(parse_input("/THEME"), Some(StudioCommand::ToggleTheme));
        assert_eq!(parse_input("/cancel"), Some(StudioCommand::Cancel));
        assert_eq!(parse_input("/exit"), Some(StudioCommand::Quit));
        assert_eq!(parse_input("/bogus"), None);
    }
}
