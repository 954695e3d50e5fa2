//! HTTP client wrapper for Storage Drive API requests.

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::error::{DriveError, Result};

/// HTTP client for making requests against a Storage Drive backend.
///
/// Owns the backend base URL and the cookie store. The session cookie set by
/// a login request authenticates every later request made through the same
/// client or any of its clones.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client for the given backend base URL.
    ///
    /// A trailing slash on the base URL is trimmed so path joins stay stable.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| DriveError::Custom(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    /// Create a new HTTP client with a proxy.
    pub fn with_proxy(base_url: &str, proxy: &str) -> Result<Self> {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| DriveError::Custom(format!("Invalid proxy: {}", e)))?;

        let client = Client::builder()
            .cookie_store(true)
            .proxy(proxy)
            .build()
            .map_err(|e| DriveError::Custom(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    /// Backend base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Underlying reqwest client, for requests outside the API base
    /// (the signed upload destination).
    pub(crate) fn raw(&self) -> &Client {
        &self.client
    }

    /// Make a GET request.
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        checked(response).await
    }

    /// Make a POST request with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        checked(response).await
    }

    /// Make a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.client.post(url).send().await?;
        checked(response).await
    }

    /// Make a PATCH request with a JSON body.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = self.url(path);
        debug!("PATCH {}", url);
        let response = self.client.patch(url).json(body).send().await?;
        checked(response).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Response> {
        let url = self.url(path);
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        checked(response).await
    }
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Turn a non-success response into a normalized `ApiError`.
async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = normalize_error(status, &body);
    warn!("request rejected: {}", err);
    Err(DriveError::Api(err))
}

/// Extract the server message from an `{ "error": ... }` body, falling back
/// to the canonical status reason when the body has no usable message.
fn normalize_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    ApiError::new(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new("http://localhost:3000").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url("/file/f1"), "http://localhost:3000/file/f1");
    }

    #[test]
    fn test_proxy_creation() {
        let client = HttpClient::with_proxy("http://localhost:3000", "http://127.0.0.1:8080");
        assert!(client.is_ok());
    }

    #[test]
    fn test_proxy_invalid() {
        let res = HttpClient::with_proxy("http://localhost:3000", ":::::::");
        assert!(res.is_err());
    }

    #[test]
    fn test_error_body_normalization() {
        let err = normalize_error(
            StatusCode::CONFLICT,
            r#"{"error": "Directory is not empty"}"#,
        );
        assert_eq!(err.status_code, 409);
        assert_eq!(err.message, "Directory is not empty");
    }

    #[test]
    fn test_error_body_fallback() {
        let err = normalize_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.status_code, 500);
        assert_eq!(err.message, "Internal Server Error");

        let err = normalize_error(StatusCode::BAD_REQUEST, r#"{"detail": "nope"}"#);
        assert_eq!(err.message, "Bad Request");
    }
}
