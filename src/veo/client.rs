//! VeoClient - handles communication with the Gemini video generation API.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Url;

use super::error::{error_from_response, VeoError};
use super::operation::Operation;
use super::request::GenerationRequest;
use super::workflow::VideoService;

/// The environment variable name for the Gemini API key.
pub const VEO_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default base URL for the Generative Language API.
pub const VEO_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for video generation.
pub const DEFAULT_MODEL: &str = "veo-2.0-generate-001";

/// Header carrying the API key on submit and status requests.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Query parameter carrying the API key on resource downloads.
const API_KEY_QUERY_PARAM: &str = "key";

/// Default timeout for HTTP requests. Downloads of finished videos can be
/// large, so this is generous.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Upper bound on the buffer reserved from a download's `Content-Length`.
/// Larger bodies still download; the buffer just grows as chunks arrive.
const MAX_PREALLOCATED_BYTES: u64 = 64 * 1024 * 1024;

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for communicating with the Veo generation service.
pub struct VeoClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl VeoClient {
    /// Create a new VeoClient with an explicit API key.
    pub fn with_api_key(api_key: String) -> Result<Self, VeoError> {
        Self::with_options(api_key, VEO_API_BASE_URL.to_string(), DEFAULT_MODEL.to_string())
    }

    /// Create a new VeoClient with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, VeoError> {
        Self::with_options(api_key, base_url, DEFAULT_MODEL.to_string())
    }

    /// Create a new VeoClient with a custom model.
    pub fn with_model(api_key: String, model: String) -> Result<Self, VeoError> {
        Self::with_options(api_key, VEO_API_BASE_URL.to_string(), model)
    }

    /// Create a new VeoClient with every option spelled out.
    pub fn with_options(api_key: String, base_url: String, model: String) -> Result<Self, VeoError> {
        if api_key.is_empty() {
            return Err(VeoError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            http_client,
        })
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit a video generation request.
    ///
    /// Sends `POST {base}/v1beta/models/{model}:predictLongRunning` and returns
    /// the long-running operation the service created.
    ///
    /// # Errors
    ///
    /// Returns `VeoError::EmptyRequest` if there is neither prompt nor image,
    /// `VeoError::QuotaExceeded` for a structured 429 error,
    /// `VeoError::Service` for any other structured error,
    /// `VeoError::ApiError` for an unstructured error response,
    /// or `VeoError::HttpError` if the request fails.
    pub async fn submit_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<Operation, VeoError> {
        request.validate()?;

        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url, self.model
        );

        log::debug!(
            "Submitting generation: model={}, image={}, settings={:?}",
            self.model,
            request.image.is_some(),
            request.settings
        );

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request.to_wire())
            .send()
            .await?;

        Self::parse_operation(response).await
    }

    /// Re-fetch an operation by its handle.
    ///
    /// Sends `GET {base}/v1beta/{operation_name}`.
    pub async fn get_operation(&self, operation_name: &str) -> Result<Operation, VeoError> {
        let url = format!("{}/v1beta/{}", self.base_url, operation_name);

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        Self::parse_operation(response).await
    }

    async fn parse_operation(response: reqwest::Response) -> Result<Operation, VeoError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let error = error_from_response(status, &error_text);
            if let VeoError::QuotaExceeded { message } = &error {
                log::warn!("Quota exceeded: {}", message);
            }
            return Err(error);
        }

        Ok(response.json().await?)
    }

    /// Build the download URL for a resource locator, with the API key
    /// appended as a query parameter.
    pub fn resource_url(&self, uri: &str) -> Result<Url, VeoError> {
        let mut url = Url::parse(uri).map_err(|_| VeoError::InvalidResourceUri {
            uri: uri.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair(API_KEY_QUERY_PARAM, &self.api_key);
        Ok(url)
    }

    /// Download a generated video into memory.
    ///
    /// # Errors
    ///
    /// Returns `VeoError::InvalidResourceUri` if `uri` is not a URL,
    /// `VeoError::HttpError` if the download fails, or the classified
    /// service error if the server answers with an error response.
    pub async fn download_video(&self, uri: &str) -> Result<Vec<u8>, VeoError> {
        let url = self.resource_url(uri)?;
        log::info!("Downloading video from: {}", uri);

        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(error_from_response(status, &error_text));
        }

        let reserve = response
            .content_length()
            .unwrap_or(0)
            .min(MAX_PREALLOCATED_BYTES);
        let mut bytes = Vec::with_capacity(reserve as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl VideoService for VeoClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<Operation, VeoError> {
        self.submit_generation(request).await
    }

    async fn poll(&self, operation: &Operation) -> Result<Operation, VeoError> {
        self.get_operation(&operation.name).await
    }

    async fn fetch_video(&self, uri: &str) -> Result<Vec<u8>, VeoError> {
        self.download_video(uri).await
    }
}
