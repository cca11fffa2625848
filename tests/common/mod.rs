//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use veo_studio::veo::{AssetAction, AssetCard, Operation, Presenter, VeoError};

/// A presented asset as the presenter saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Presented {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub actions: Vec<AssetAction>,
    pub share_text: String,
}

/// Presenter that records everything it is shown.
#[derive(Default)]
pub struct RecordingPresenter {
    pub can_share: bool,
    pub statuses: Mutex<Vec<String>>,
    pub quota_signals: Mutex<u32>,
    pub presented: Mutex<Vec<Presented>>,
}

impl RecordingPresenter {
    pub fn sharing() -> Self {
        Self {
            can_share: true,
            ..Self::default()
        }
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn quota_signals(&self) -> u32 {
        *self.quota_signals.lock().unwrap()
    }

    pub fn presented(&self) -> Vec<Presented> {
        let mut presented = self.presented.lock().unwrap().clone();
        presented.sort_by(|a, b| a.filename.cmp(&b.filename));
        presented
    }
}

#[async_trait::async_trait]
impl Presenter for RecordingPresenter {
    fn status(&self, text: &str) {
        self.statuses.lock().unwrap().push(text.to_string());
    }

    fn quota_exceeded(&self) {
        *self.quota_signals.lock().unwrap() += 1;
    }

    fn supports_file_sharing(&self) -> bool {
        self.can_share
    }

    async fn present(&self, card: AssetCard<'_>) -> Result<(), VeoError> {
        self.presented.lock().unwrap().push(Presented {
            filename: card.asset.filename.clone(),
            bytes: card.asset.bytes.clone(),
            actions: card.actions.clone(),
            share_text: card.share_text.to_string(),
        });
        Ok(())
    }
}

/// An operation that is still running.
pub fn pending_json(name: &str) -> serde_json::Value {
    serde_json::json!({ "name": name, "done": false })
}

/// A finished operation with one sample per URI.
pub fn done_json(name: &str, uris: &[String]) -> serde_json::Value {
    let samples: Vec<_> = uris
        .iter()
        .map(|uri| serde_json::json!({ "video": { "uri": uri } }))
        .collect();
    serde_json::json!({
        "name": name,
        "done": true,
        "response": {
            "@type": "type.googleapis.com/google.ai.generativelanguage.v1beta.PredictLongRunningResponse",
            "generateVideoResponse": { "generatedSamples": samples }
        }
    })
}

pub fn pending(name: &str) -> Operation {
    serde_json::from_value(pending_json(name)).unwrap()
}

pub fn done(name: &str, uris: &[String]) -> Operation {
    serde_json::from_value(done_json(name, uris)).unwrap()
}
