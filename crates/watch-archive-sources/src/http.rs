use crate::error::{AttemptError, SourceError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use watch_archive_config::FetchConfig;

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// A single GET with no retry policy. The fetcher layers retries on top.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, AttemptError>;
}

/// Create a reqwest Client with browser-like headers; douban rejects bare clients
pub fn create_client(fetch: &FetchConfig, cookie: Option<&str>) -> Result<Client, SourceError> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = cookie {
        let value = HeaderValue::from_str(cookie).map_err(|_| SourceError::InvalidHeader("Cookie"))?;
        headers.insert(COOKIE, value);
    }

    let client = Client::builder()
        .user_agent(fetch.user_agent.as_str())
        .timeout(fetch.timeout())
        .default_headers(headers)
        .build()?;
    Ok(client)
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(fetch: &FetchConfig, cookie: Option<&str>) -> Result<Self, SourceError> {
        Ok(Self {
            client: create_client(fetch, cookie)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, AttemptError> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(HttpResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> AttemptError {
    if err.is_timeout() {
        AttemptError::Timeout
    } else {
        AttemptError::Transport(err.to_string())
    }
}

const SECRET_PARAMS: [&str; 2] = ["api_key", "apikey"];

/// Mask API keys in a URL before it is logged or stored in an error
pub fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SECRET_PARAMS.contains(&key) => format!("{}=***", key),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", base, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url_masks_api_keys() {
        assert_eq!(
            redact_url("https://api.themoviedb.org/3/find/tt0078788?external_source=imdb_id&api_key=secret"),
            "https://api.themoviedb.org/3/find/tt0078788?external_source=imdb_id&api_key=***"
        );
        assert_eq!(
            redact_url("http://www.omdbapi.com/?i=tt0078788&apikey=secret"),
            "http://www.omdbapi.com/?i=tt0078788&apikey=***"
        );
    }

    #[test]
    fn test_redact_url_without_query() {
        let url = "https://movie.douban.com/subject/1292260/";
        assert_eq!(redact_url(url), url);
    }

    #[test]
    fn test_http_response_json() {
        let response = HttpResponse::ok(r#"{"Rated":"R"}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["Rated"], "R");
        assert!(response.is_ok());
        assert!(!HttpResponse::with_status(503).is_ok());
    }
}
