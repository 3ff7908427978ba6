use std::time::Duration;

use encore_core::{SongIndex, Tour};
use engine_logging::{engine_debug, engine_trace};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{ApiError, EngineEvent, FailureKind, SearchResult};
use crate::wire::{tours_from_wire, Envelope, SearchData, SongIndexWire, TourWire};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The backend endpoints the dashboard consumes.
#[async_trait::async_trait]
pub trait MusicApi: Send + Sync {
    /// `GET /api/upcoming-tours`
    async fn upcoming_tours(&self) -> Result<Vec<Tour>, ApiError>;

    /// `GET /api/search_singer?name=<name>`
    async fn search_singer(&self, name: &str) -> Result<SearchResult, ApiError>;

    /// `GET /api/song_index?mid=<mid>`
    async fn song_index(&self, mid: &str) -> Result<SongIndex, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = parse_base(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        engine_trace!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        engine_debug!("{} answered {} bytes", url.path(), bytes.len());

        serde_json::from_slice(&bytes)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }

    fn too_large(&self, actual: Option<u64>) -> ApiError {
        ApiError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual,
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl MusicApi for ReqwestApi {
    async fn upcoming_tours(&self) -> Result<Vec<Tour>, ApiError> {
        let url = self.endpoint("api/upcoming-tours", &[])?;
        let rows: Vec<TourWire> = self.get_json(url).await?;
        Ok(tours_from_wire(rows))
    }

    async fn search_singer(&self, name: &str) -> Result<SearchResult, ApiError> {
        let url = self.endpoint("api/search_singer", &[("name", name)])?;
        let envelope: Envelope<SearchData> = self.get_json(url).await?;
        Ok(SearchResult::from(envelope.into_data()?))
    }

    async fn song_index(&self, mid: &str) -> Result<SongIndex, ApiError> {
        let url = self.endpoint("api/song_index", &[("mid", mid)])?;
        let envelope: Envelope<SongIndexWire> = self.get_json(url).await?;
        Ok(SongIndex::from(envelope.into_data()?))
    }
}

/// Parses the base URL so relative endpoint paths land under it.
fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let mut base =
        Url::parse(raw).map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(ApiError::new(
            FailureKind::InvalidUrl,
            format!("{raw} cannot be used as a base url"),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_base_path_and_encode_query() {
        let api = ReqwestApi::new(ApiSettings {
            base_url: "http://pi.local:8000/dashboard".to_string(),
            ..ApiSettings::default()
        })
        .unwrap();

        let url = api
            .endpoint("api/search_singer", &[("name", "杨丞琳 & co")])
            .unwrap();
        assert_eq!(url.path(), "/dashboard/api/search_singer");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("name".to_string(), "杨丞琳 & co".to_string())]);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ReqwestApi::new(ApiSettings {
            base_url: "not a url".to_string(),
            ..ApiSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
