//! Generation workflow: submit a request, wait for the operation to finish,
//! then fetch every generated video and hand it to the presenter.

use futures_util::future::try_join_all;
use tokio::time::Instant;

use super::error::{Failure, VeoError};
use super::operation::Operation;
use super::polling::{CancelToken, PollPolicy};
use super::request::GenerationRequest;

/// MIME type of every generated asset.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// Title used when sharing a generated video.
pub const SHARE_TITLE: &str = "Generated Video";

/// Share text used when the prompt is empty.
pub const DEFAULT_SHARE_TEXT: &str = "Check out this video!";

/// Remote side of the workflow.
#[async_trait::async_trait]
pub trait VideoService: Send + Sync {
    /// Submit a generation request and return the initial operation.
    async fn submit(&self, request: &GenerationRequest) -> Result<Operation, VeoError>;

    /// Re-fetch an operation's status by its handle.
    async fn poll(&self, operation: &Operation) -> Result<Operation, VeoError>;

    /// Download the bytes behind a generated video's resource locator.
    async fn fetch_video(&self, uri: &str) -> Result<Vec<u8>, VeoError>;
}

/// A generated video held in memory.
#[derive(Clone, PartialEq)]
pub struct GeneratedVideoAsset {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl GeneratedVideoAsset {
    /// Materialize the `index`-th (0-based) result as `generated-video-{index + 1}.mp4`.
    pub fn new(index: usize, bytes: Vec<u8>) -> Self {
        Self {
            filename: format!("generated-video-{}.mp4", index + 1),
            mime_type: VIDEO_MIME_TYPE,
            bytes,
        }
    }
}

impl std::fmt::Debug for GeneratedVideoAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedVideoAsset")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Action offered for a presented asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetAction {
    Download,
    Share,
}

/// What the presenter receives for each generated video.
#[derive(Debug)]
pub struct AssetCard<'a> {
    pub asset: &'a GeneratedVideoAsset,
    pub actions: Vec<AssetAction>,
    pub share_title: &'static str,
    pub share_text: &'a str,
}

impl<'a> AssetCard<'a> {
    /// Download is always offered; Share only when the presenter can share files.
    pub fn new(asset: &'a GeneratedVideoAsset, prompt: &'a str, can_share: bool) -> Self {
        let mut actions = vec![AssetAction::Download];
        if can_share {
            actions.push(AssetAction::Share);
        }
        let share_text = if prompt.trim().is_empty() {
            DEFAULT_SHARE_TEXT
        } else {
            prompt
        };
        Self {
            asset,
            actions,
            share_title: SHARE_TITLE,
            share_text,
        }
    }

    pub fn offers(&self, action: AssetAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Surface that shows progress and generated videos to the user.
#[async_trait::async_trait]
pub trait Presenter: Send + Sync {
    fn status(&self, text: &str);

    /// Distinct signal for exhausted quota.
    fn quota_exceeded(&self);

    fn supports_file_sharing(&self) -> bool;

    async fn present(&self, card: AssetCard<'_>) -> Result<(), VeoError>;
}

/// Result of a reported generation.
#[derive(Debug)]
pub enum GenerationOutcome {
    Completed(Vec<GeneratedVideoAsset>),
    Failed(Failure),
}

/// Submit `request`, wait for completion and collect every generated video.
///
/// Fetches of the individual results are all started before any of them is
/// awaited. The first failing fetch fails the whole call.
pub async fn submit_and_collect<S, P>(
    service: &S,
    request: &GenerationRequest,
    policy: &PollPolicy,
    cancel: &CancelToken,
    presenter: &P,
) -> Result<Vec<GeneratedVideoAsset>, VeoError>
where
    S: VideoService + ?Sized,
    P: Presenter + ?Sized,
{
    request.validate()?;

    if let Some(quality) = &request.settings.quality {
        log::info!("Selected quality (not sent to the service): {}", quality);
    }

    let operation = service.submit(request).await?;
    log::info!("Generation submitted, operation: {}", operation.name);

    let operation = wait_for_completion(service, operation, policy, cancel).await?;
    let videos = operation.into_videos()?;
    log::info!("Generation complete, fetching {} video(s)", videos.len());

    let can_share = presenter.supports_file_sharing();
    let fetches = videos.iter().enumerate().map(|(index, video)| async move {
        let uri = video.uri().ok_or(VeoError::MissingVideoUri { index })?;
        let bytes = service.fetch_video(uri).await?;
        let asset = GeneratedVideoAsset::new(index, bytes);
        presenter
            .present(AssetCard::new(&asset, &request.prompt, can_share))
            .await?;
        Ok::<_, VeoError>(asset)
    });

    try_join_all(fetches).await
}

/// Re-fetch `operation` until it is done, the policy is exhausted or the
/// token is cancelled.
pub async fn wait_for_completion<S>(
    service: &S,
    mut operation: Operation,
    policy: &PollPolicy,
    cancel: &CancelToken,
) -> Result<Operation, VeoError>
where
    S: VideoService + ?Sized,
{
    let started = Instant::now();
    let mut polls = 0u32;

    while !operation.done {
        cancel.check()?;
        if let Err(e) = policy.ensure_can_poll(polls, started.elapsed()) {
            log::error!("Gave up waiting for {}: {}", operation.name, e);
            return Err(e);
        }

        log::debug!("Waiting for completion of {}", operation.name);
        tokio::time::sleep(policy.interval).await;
        cancel.check()?;

        operation = service.poll(&operation).await?;
        polls += 1;
    }

    log::debug!("{} done after {} status checks", operation.name, polls);
    Ok(operation)
}

/// Run one generation and report its result through `presenter`.
///
/// Never fails: every error is classified and reported as status text, with
/// exhausted quota additionally raising the presenter's quota signal.
pub async fn generate<S, P>(
    service: &S,
    request: &GenerationRequest,
    policy: &PollPolicy,
    cancel: &CancelToken,
    presenter: &P,
) -> GenerationOutcome
where
    S: VideoService + ?Sized,
    P: Presenter + ?Sized,
{
    presenter.status("Generating...");

    match submit_and_collect(service, request, policy, cancel, presenter).await {
        Ok(assets) => {
            presenter.status("Generation complete.");
            GenerationOutcome::Completed(assets)
        }
        Err(e) => {
            log::warn!("Generation failed: {}", e);
            let failure = Failure::from(&e);
            if failure == Failure::QuotaExceeded {
                presenter.quota_exceeded();
            }
            presenter.status(&failure.status_message());
            GenerationOutcome::Failed(failure)
        }
    }
}
