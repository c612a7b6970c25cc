use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::{EngineEvent, FailureKind, FetchError, ProgressSink};

/// File name of a serialized tokenizer definition.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Hub resolve URLs answer with a redirect to the file's CDN location.
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Base URL of the model hub.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Largest tokenizer definition accepted.
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://huggingface.co".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_bytes: 64 * 1024 * 1024,
        }
    }
}

impl FetchSettings {
    /// URL of the tokenizer definition of `model_id` on the main revision.
    pub fn tokenizer_url(&self, model_id: &str) -> String {
        format!(
            "{}/{}/resolve/main/{TOKENIZER_FILE}",
            self.endpoint.trim_end_matches('/'),
            model_id.trim_matches('/')
        )
    }
}

/// A downloaded tokenizer definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    /// Where the bytes came from after redirects.
    pub final_url: String,
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url`, reporting progress under `label`.
    async fn fetch(
        &self,
        label: &str,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "tokenizer definition too large",
        )
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        label: &str,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self
            .client()?
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        // Gated repositories can answer 200 with a sign-in page.
        if let Some(content_type) = html_content_type(&response) {
            return Err(FetchError::new(
                FailureKind::UnsupportedContentType { content_type },
                "expected a tokenizer definition, got a web page",
            ));
        }

        if let Some(len) = response.content_length() {
            if len > self.settings.max_bytes {
                return Err(self.too_large(len));
            }
        }

        let final_url = response.url().to_string();
        sink.emit(EngineEvent::Downloading {
            model: label.to_string(),
            bytes: 0,
        });

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let received = (bytes.len() + chunk.len()) as u64;
            if received > self.settings.max_bytes {
                return Err(self.too_large(received));
            }
            bytes.extend_from_slice(&chunk);
            sink.emit(EngineEvent::Downloading {
                model: label.to_string(),
                bytes: received,
            });
        }

        Ok(FetchOutput { bytes, final_url })
    }
}

fn html_content_type(response: &reqwest::Response) -> Option<String> {
    let value = response.headers().get(CONTENT_TYPE)?.to_str().ok()?;
    let mime = value.split(';').next().unwrap_or(value).trim();
    mime.eq_ignore_ascii_case("text/html")
        .then(|| value.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::FetchSettings;

    #[test]
    fn tokenizer_url_joins_endpoint_and_model_id() {
        let settings = FetchSettings {
            endpoint: "http://localhost:8080/".to_string(),
            ..FetchSettings::default()
        };
        assert_eq!(
            settings.tokenizer_url("Qwen/Qwen2.5-7B"),
            "http://localhost:8080/Qwen/Qwen2.5-7B/resolve/main/tokenizer.json"
        );
    }
}
