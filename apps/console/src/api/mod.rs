use std::sync::Arc;

use anyhow::Context;
use reqwest::{header, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{ReportSnapshot, SearchHit, SearchResponse, Sentiment};
use crate::report::{ReportError, ReportSource};
use crate::search::{SearchError, SearchSource};

pub type ClientResult<T> = Result<T, ClientError>;

const REPORT_SEGMENTS: [&str; 2] = ["api", "report"];
const SEARCH_PATH: &str = "search";

#[derive(Clone)]
pub struct DashboardClient {
    inner: reqwest::Client,
    config: Arc<AppConfig>,
    base_url: String,
}

impl DashboardClient {
    pub fn new(config: AppConfig) -> ClientResult<Self> {
        let base_url = normalize_base_url(&config.api_base_url);

        // wasm builds delegate timeouts to the browser's fetch implementation
        #[cfg(not(target_arch = "wasm32"))]
        let builder = reqwest::Client::builder().timeout(config.request_timeout);
        #[cfg(target_arch = "wasm32")]
        let builder = reqwest::Client::builder();

        let client = builder
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            inner: client,
            config: Arc::new(config),
            base_url,
        })
    }

    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    pub async fn get_report(&self) -> ClientResult<Value> {
        let builder = self.request(Method::GET, &REPORT_SEGMENTS)?;
        self.send(builder).await
    }

    pub async fn search(&self, query: &str, top_k: usize) -> ClientResult<SearchResponse> {
        let top_k = top_k.to_string();
        let builder = self
            .request(Method::POST, &[SEARCH_PATH])?
            .form(&[("query", query), ("top_k", top_k.as_str())]);
        self.send(builder).await
    }

    pub async fn search_by_sentiment(
        &self,
        sentiment: Sentiment,
        top_k: usize,
    ) -> ClientResult<SearchResponse> {
        let builder = self
            .request(Method::GET, &[SEARCH_PATH, "sentiment", sentiment.query_label()])?
            .query(&[("top_k", top_k)]);
        self.send(builder).await
    }

    pub async fn search_by_product(
        &self,
        product: &str,
        top_k: usize,
    ) -> ClientResult<SearchResponse> {
        let builder = self
            .request(Method::GET, &[SEARCH_PATH, "product", product])?
            .query(&[("top_k", top_k)]);
        self.send(builder).await
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<reqwest::RequestBuilder> {
        let url = self.join_segments(segments)?;
        let builder = self
            .inner
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        Ok(builder)
    }

    fn join_segments(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn send<T>(&self, builder: reqwest::RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await.map_err(ClientError::from)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::from)?;

        let body = classify(status, &bytes)?;
        serde_json::from_value(body).map_err(ClientError::from)
    }
}

/// Sorts a raw response into a JSON body or the failure it represents.
///
/// Any non-2xx status is a status failure, carrying the body's `error` text when
/// there is one. Only a 2xx body can be an application error.
fn classify(status: StatusCode, bytes: &[u8]) -> ClientResult<Value> {
    if !status.is_success() {
        let message = serde_json::from_slice::<Value>(bytes)
            .ok()
            .as_ref()
            .and_then(error_field)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("sin detalle")
                    .to_string()
            });
        return Err(ClientError::Status { status, message });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ClientError::EmptyResponse(status));
    }

    let body: Value = serde_json::from_slice(bytes)?;
    if let Some(message) = error_field(&body) {
        return Err(ClientError::Api { status, message });
    }
    Ok(body)
}

fn normalize_base_url(input: &str) -> String {
    input.trim_end_matches('/').to_string()
}

fn error_field(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .map(|message| message.to_string())
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{message} (HTTP {status})")]
    Api { status: StatusCode, message: String },
    #[error("empty response body: {0}")]
    EmptyResponse(StatusCode),
    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Setup(#[from] anyhow::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::EmptyResponse(status) => Some(*status),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ClientError> for ReportError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { message, .. } => ReportError::Payload(message),
            ClientError::Decode(err) => ReportError::Payload(format!("respuesta ilegible: {err}")),
            ClientError::EmptyResponse(_) => {
                ReportError::Payload("el reporte está vacío".to_string())
            }
            other => ReportError::Transport(other.to_string()),
        }
    }
}

impl From<ClientError> for SearchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { message, .. } => SearchError::Rejected(message),
            ClientError::Status { status, message } if status.is_client_error() => {
                SearchError::Rejected(message)
            }
            other => SearchError::Transport(other.to_string()),
        }
    }
}

impl ReportSource for DashboardClient {
    async fn fetch_report(&self) -> Result<ReportSnapshot, ReportError> {
        let payload = self.get_report().await?;
        ReportSnapshot::from_payload(payload)
    }
}

impl SearchSource for DashboardClient {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, SearchError> {
        Ok(into_hits(DashboardClient::search(self, query, top_k).await?))
    }

    async fn search_by_sentiment(
        &self,
        sentiment: Sentiment,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let mut hits = into_hits(DashboardClient::search_by_sentiment(self, sentiment, top_k).await?);
        // the per-sentiment resource omits the label it was filtered on
        for hit in hits.iter_mut() {
            hit.sentiment
                .get_or_insert_with(|| sentiment.query_label().to_string());
        }
        Ok(hits)
    }

    async fn search_by_product(
        &self,
        product: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        Ok(into_hits(
            DashboardClient::search_by_product(self, product, top_k).await?,
        ))
    }
}

fn into_hits(response: SearchResponse) -> Vec<SearchHit> {
    tracing::debug!(
        returned = response.results.len(),
        total = ?response.total,
        "search response received"
    );
    response.results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> DashboardClient {
        let config = AppConfig {
            api_base_url: base.to_string(),
            ..AppConfig::default()
        };
        DashboardClient::new(config).unwrap()
    }

    #[test]
    fn joins_segments_under_base_path() {
        let client = client("http://localhost:5000/app/");
        let url = client.join_segments(&[SEARCH_PATH, "sentiment", "positive"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/app/search/sentiment/positive");
    }

    #[test]
    fn product_segment_is_percent_encoded() {
        let client = client("http://localhost:5000");
        let url = client.join_segments(&[SEARCH_PATH, "product", "batería externa"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/search/product/bater%C3%ADa%20externa"
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let client = client("not a url");
        assert!(matches!(
            client.join_segments(&REPORT_SEGMENTS),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn server_error_with_error_body_is_a_transport_failure() {
        let err = classify(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error": "Error: boom"}"#,
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));

        let report = ReportError::from(err);
        assert!(matches!(report, ReportError::Transport(ref reason) if reason.contains("Error: boom")));
        assert!(report.to_string().contains("500"));
    }

    #[test]
    fn html_error_page_is_a_transport_failure() {
        let err = classify(StatusCode::BAD_GATEWAY, b"<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(
            err,
            ClientError::Status { ref message, .. } if message == "Bad Gateway"
        ));
        assert!(matches!(ReportError::from(err), ReportError::Transport(_)));
    }

    #[test]
    fn error_field_in_success_body_is_a_payload_failure() {
        let err = classify(StatusCode::OK, r#"{"error": "No hay reseñas procesadas"}"#.as_bytes())
            .unwrap_err();
        assert_eq!(
            ReportError::from(err),
            ReportError::Payload("No hay reseñas procesadas".into())
        );
    }

    #[test]
    fn empty_or_unreadable_success_bodies_are_payload_failures() {
        let empty = classify(StatusCode::OK, b"").unwrap_err();
        assert!(matches!(empty, ClientError::EmptyResponse(status) if status == StatusCode::OK));
        assert!(matches!(ReportError::from(empty), ReportError::Payload(_)));

        let garbage = classify(StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(garbage, ClientError::Decode(_)));
        assert!(matches!(ReportError::from(garbage), ReportError::Payload(_)));
    }

    #[test]
    fn success_body_passes_through() {
        let body = classify(StatusCode::OK, r#"{"resumen_general": {"total_reseñas": 3}}"#.as_bytes()).unwrap();
        assert_eq!(body["resumen_general"]["total_reseñas"], 3);
    }

    #[test]
    fn rejected_search_keeps_backend_message() {
        let err = classify(StatusCode::BAD_REQUEST, r#"{"error": "Consulta vacía"}"#.as_bytes()).unwrap_err();
        assert_eq!(
            SearchError::from(err),
            SearchError::Rejected("Consulta vacía".into())
        );
    }
}
