//! Long-running operation returned by the generation service.

use serde::Deserialize;

use super::error::{ApiStatus, VeoError};

/// Handle for an in-flight or finished generation job.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    /// Opaque handle used to re-fetch the operation.
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<OperationResponse>,
    #[serde(default)]
    pub error: Option<ApiStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default, alias = "generatedVideos")]
    pub generated_samples: Vec<GeneratedVideo>,
}

/// One generated video descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedVideo {
    #[serde(default)]
    pub video: Option<VideoResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoResource {
    #[serde(default)]
    pub uri: Option<String>,
}

impl GeneratedVideo {
    /// Resource locator of the video, if the service returned one.
    pub fn uri(&self) -> Option<&str> {
        self.video.as_ref().and_then(|v| v.uri.as_deref())
    }
}

impl Operation {
    /// Consume a finished operation, yielding its video descriptors.
    ///
    /// A structured operation error becomes a service error; an absent or
    /// empty result list is `NoVideosGenerated`.
    pub fn into_videos(self) -> Result<Vec<GeneratedVideo>, VeoError> {
        if let Some(status) = self.error {
            return Err(status.into());
        }
        let videos = self
            .response
            .and_then(|r| r.generate_video_response)
            .map(|r| r.generated_samples)
            .unwrap_or_default();
        if videos.is_empty() {
            return Err(VeoError::NoVideosGenerated);
        }
        Ok(videos)
    }
}
