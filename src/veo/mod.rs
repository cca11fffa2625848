//! Veo video generation integration.
//!
//! Prompts (optionally with a reference image) are submitted to the Gemini
//! API as long-running operations, polled until done, and every generated
//! video is downloaded and handed to a [`Presenter`].

mod client;
mod error;
mod operation;
mod polling;
mod request;
mod workflow;

pub use client::{VeoClient, DEFAULT_MODEL, VEO_API_BASE_URL, VEO_API_KEY_ENV};
pub use error::{error_from_response, ApiStatus, Failure, VeoError, QUOTA_EXCEEDED_CODE};
pub use operation::{GeneratedVideo, Operation};
pub use polling::{
    CancelToken, PollPolicy, DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT,
    MIN_POLL_INTERVAL,
};
pub use request::{
    parse_aspect_ratio, parse_duration_seconds, AspectRatio, GenerationRequest, ReferenceImage,
    VideoSettings, REFERENCE_IMAGE_MIME_TYPE,
};
pub use workflow::{
    generate, submit_and_collect, wait_for_completion, AssetAction, AssetCard,
    GeneratedVideoAsset, GenerationOutcome, Presenter, VideoService, DEFAULT_SHARE_TEXT,
    SHARE_TITLE, VIDEO_MIME_TYPE,
};
