//! State carried between generations: the last loaded reference image, the
//! current settings and the current theme.

use std::path::Path;

use crate::theme::Theme;
use crate::veo::{GenerationRequest, ReferenceImage, VeoError, VideoSettings};

#[derive(Debug, Clone)]
pub struct Session {
    image: Option<ReferenceImage>,
    pub settings: VideoSettings,
    pub theme: Theme,
}

impl Session {
    pub fn new(settings: VideoSettings, theme: Theme) -> Self {
        Self {
            image: None,
            settings,
            theme,
        }
    }

    pub fn image(&self) -> Option<&ReferenceImage> {
        self.image.as_ref()
    }

    /// Replace the reference image with the contents of `path`.
    pub fn load_image(&mut self, path: &Path) -> Result<&ReferenceImage, VeoError> {
        let image = ReferenceImage::from_path(path)?;
        log::info!("Loaded reference image {} ({} bytes)", path.display(), image.bytes().len());
        Ok(&*self.image.insert(image))
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Build a request from `prompt` and a snapshot of the current state.
    pub fn request(&self, prompt: &str) -> GenerationRequest {
        GenerationRequest::new(prompt)
            .with_image(self.image.clone())
            .with_settings(self.settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::veo::AspectRatio;

    #[test]
    fn test_request_snapshots_state() {
        let mut session = Session::new(VideoSettings::default(), Theme::Light);
        session.settings.aspect_ratio = Some(AspectRatio::Landscape);

        let request = session.request("a lighthouse in a storm");
        assert_eq!(request.prompt, "a lighthouse in a storm");
        assert_eq!(request.settings.aspect_ratio, Some(AspectRatio::Landscape));
        assert!(request.image.is_none());

        session.settings.aspect_ratio = None;
        assert_eq!(request.settings.aspect_ratio, Some(AspectRatio::Landscape));
    }

    #[test]
    fn test_load_and_clear_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let mut session = Session::new(VideoSettings::default(), Theme::Dark);
        let image = session.load_image(&path).unwrap();
        assert_eq!(image.file_name(), Some("ref.png"));
        assert_eq!(session.request("x").image.unwrap().bytes().len(), 4);

        session.clear_image();
        assert!(session.image().is_none());
        assert!(session.request("x").image.is_none());
    }

    #[test]
    fn test_load_missing_image_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.png");
        std::fs::write(&path, [1, 2, 3]).unwrap();

        let mut session = Session::new(VideoSettings::default(), Theme::Dark);
        session.load_image(&path).unwrap();
        let result = session.load_image(&dir.path().join("missing.png"));
        assert!(matches!(result, Err(VeoError::IoError(_))));
        assert!(session.image().is_some());
    }
}
