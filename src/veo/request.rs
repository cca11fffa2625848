//! Generation request model and its wire encoding.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::error::VeoError;

/// MIME type sent with every reference image.
pub const REFERENCE_IMAGE_MIME_TYPE: &str = "image/png";

/// Video count used when the requested count is missing or not positive.
pub const DEFAULT_NUMBER_OF_VIDEOS: u32 = 1;

/// Aspect ratios accepted by the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "3:4")]
    Tall,
    #[serde(rename = "4:3")]
    Wide,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Tall,
        AspectRatio::Wide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Tall => "3:4",
            AspectRatio::Wide => "4:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == trimmed)
            .ok_or_else(|| {
                format!(
                    "Unknown aspect ratio '{}'. Expected one of: 1:1, 16:9, 9:16, 3:4, 4:3",
                    s
                )
            })
    }
}

/// Parse a user-supplied aspect ratio. Empty or unknown values mean "not set".
pub fn parse_aspect_ratio(raw: &str) -> Option<AspectRatio> {
    if raw.trim().is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(ratio) => Some(ratio),
        Err(e) => {
            log::warn!("{}; aspect ratio will not be sent", e);
            None
        }
    }
}

/// Parse a user-supplied duration from its leading digits, so `"8s"` and
/// `"5.5"` give 8 and 5. Values without leading digits, or zero, mean "not set".
pub fn parse_duration_seconds(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..digits_end]
        .parse::<u32>()
        .ok()
        .filter(|secs| *secs > 0)
}

/// User-chosen generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSettings {
    pub aspect_ratio: Option<AspectRatio>,
    pub duration_seconds: Option<u32>,
    /// Collected from the user but not supported by the service.
    pub quality: Option<String>,
    pub number_of_videos: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: None,
            duration_seconds: None,
            quality: None,
            number_of_videos: DEFAULT_NUMBER_OF_VIDEOS,
        }
    }
}

/// Reference image supplied alongside the prompt.
#[derive(Clone, PartialEq)]
pub struct ReferenceImage {
    bytes: Vec<u8>,
    file_name: Option<String>,
}

impl ReferenceImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: None,
        }
    }

    /// Read an image from disk.
    pub fn from_path(path: &Path) -> Result<Self, VeoError> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            bytes,
            file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn mime_type(&self) -> &'static str {
        REFERENCE_IMAGE_MIME_TYPE
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("len", &self.bytes.len())
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// A complete request for the generation service.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ReferenceImage>,
    pub settings: VideoSettings,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            settings: VideoSettings::default(),
        }
    }

    pub fn with_image(mut self, image: Option<ReferenceImage>) -> Self {
        self.image = image.filter(|img| !img.bytes().is_empty());
        self
    }

    pub fn with_settings(mut self, settings: VideoSettings) -> Self {
        self.settings = settings;
        self
    }

    /// A request needs prompt text, a reference image, or both. An empty
    /// prompt with an image is sent as-is.
    pub fn validate(&self) -> Result<(), VeoError> {
        if self.prompt.trim().is_empty() && self.image.is_none() {
            return Err(VeoError::EmptyRequest);
        }
        Ok(())
    }

    /// Encode as the `predictLongRunning` request body.
    pub(crate) fn to_wire(&self) -> PredictRequest {
        PredictRequest {
            instances: vec![Instance {
                prompt: self.prompt.clone(),
                image: self.image.as_ref().map(|img| WireImage {
                    bytes_base64_encoded: img.to_base64(),
                    mime_type: img.mime_type().to_string(),
                }),
            }],
            parameters: Parameters {
                aspect_ratio: self.settings.aspect_ratio,
                duration_seconds: self.settings.duration_seconds.filter(|secs| *secs > 0),
                sample_count: self.settings.number_of_videos.max(1),
            },
        }
    }
}

/// Request body for `models/{model}:predictLongRunning`.
#[derive(Debug, Serialize)]
pub(crate) struct PredictRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<WireImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<u32>,
    sample_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_json(request: &GenerationRequest) -> serde_json::Value {
        serde_json::to_value(request.to_wire()).unwrap()
    }

    fn settings(aspect_ratio: &str, duration: &str) -> VideoSettings {
        VideoSettings {
            aspect_ratio: parse_aspect_ratio(aspect_ratio),
            duration_seconds: parse_duration_seconds(duration),
            ..VideoSettings::default()
        }
    }

    #[test]
    fn test_empty_aspect_ratio_is_omitted() {
        let settings = settings("", "5");
        let json = wire_json(&GenerationRequest::new("a cat").with_settings(settings));
        assert!(json["parameters"].get("aspectRatio").is_none());
        assert_eq!(json["parameters"]["durationSeconds"], 5);
    }

    #[test]
    fn test_non_numeric_duration_is_omitted() {
        for raw in ["", "abc", "five", "  ", "-3", "0"] {
            let settings = settings("16:9", raw);
            let json = wire_json(&GenerationRequest::new("a cat").with_settings(settings));
            assert!(
                json["parameters"].get("durationSeconds").is_none(),
                "duration '{}' should be omitted",
                raw
            );
            assert_eq!(json["parameters"]["aspectRatio"], "16:9");
        }
    }

    #[test]
    fn test_unknown_aspect_ratio_is_omitted() {
        assert_eq!(parse_aspect_ratio("21:9"), None);
        assert_eq!(parse_aspect_ratio(" 9:16 "), Some(AspectRatio::Portrait));
    }

    #[test]
    fn test_absent_fields_are_never_null() {
        let json = wire_json(&GenerationRequest::new("waves"));
        let text = json.to_string();
        assert!(!text.contains("null"));
        assert!(json["instances"][0].get("image").is_none());
        assert_eq!(json["parameters"]["sampleCount"], 1);
    }

    #[test]
    fn test_image_block_uses_png_mime_type() {
        let request =
            GenerationRequest::new("waves").with_image(Some(ReferenceImage::new(vec![1, 2, 3])));
        let json = wire_json(&request);
        assert_eq!(json["instances"][0]["image"]["mimeType"], "image/png");
        assert_eq!(json["instances"][0]["image"]["bytesBase64Encoded"], "AQID");
    }

    #[test]
    fn test_empty_image_bytes_are_dropped() {
        let request = GenerationRequest::new("waves").with_image(Some(ReferenceImage::new(vec![])));
        assert!(request.image.is_none());
    }

    #[test]
    fn test_quality_is_collected_but_not_sent() {
        let settings = VideoSettings {
            quality: Some("high".to_string()),
            number_of_videos: 2,
            ..settings("1:1", "8")
        };
        assert_eq!(settings.quality.as_deref(), Some("high"));
        let text = wire_json(&GenerationRequest::new("x").with_settings(settings)).to_string();
        assert!(!text.contains("high"));
        assert!(!text.contains("quality"));
    }

    #[test]
    fn test_duration_takes_leading_digits() {
        assert_eq!(parse_duration_seconds("8"), Some(8));
        assert_eq!(parse_duration_seconds(" 8s "), Some(8));
        assert_eq!(parse_duration_seconds("5.5"), Some(5));
        assert_eq!(parse_duration_seconds("+6"), Some(6));
        assert_eq!(parse_duration_seconds("s8"), None);
        assert_eq!(parse_duration_seconds("0.9"), None);
    }

    #[test]
    fn test_validate_needs_prompt_or_image() {
        assert!(matches!(
            GenerationRequest::new(" \n\t ").validate(),
            Err(VeoError::EmptyRequest)
        ));
        assert!(GenerationRequest::new("a neon city at night").validate().is_ok());

        let image_only =
            GenerationRequest::new("").with_image(Some(ReferenceImage::new(vec![1, 2, 3])));
        assert!(image_only.validate().is_ok());
        let json = wire_json(&image_only);
        assert_eq!(json["instances"][0]["prompt"], "");
        assert_eq!(json["instances"][0]["image"]["mimeType"], "image/png");
    }

    #[test]
    fn test_aspect_ratio_round_trips_through_display() {
        for ratio in AspectRatio::ALL {
            assert_eq!(ratio.to_string().parse::<AspectRatio>().unwrap(), ratio);
        }
    }
}
