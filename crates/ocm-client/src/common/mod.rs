//! Common utilities for the cluster management API client
//!
//! Provides the authenticated HTTP wrapper shared by every endpoint.

use crate::error::OcmError;
use crate::models::ListResponse;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Page size requested when walking collection endpoints
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// HTTP client wrapper with bearer token authentication
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Map a non-success response to the matching error variant
    async fn check(method: &str, path: &str, response: Response) -> Result<Response, OcmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => OcmError::NotFound(format!("{} - {}", path, body)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                OcmError::Authentication(format!("{} {}: {} - {}", method, path, status, body))
            }
            _ => OcmError::Api(format!("{} {} failed: {} - {}", method, path, status, body)),
        })
    }

    async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, OcmError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            OcmError::Api(format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Make a GET request
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, OcmError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::decode(Self::check("GET", path, response).await?).await
    }

    /// Fetch every page of a collection endpoint
    pub async fn get_all<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<Vec<T>, OcmError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let paged = format!("{}{}page={}&size={}", path, separator, page, DEFAULT_PAGE_SIZE);
            let response: ListResponse<T> = self.get(&paged).await?;
            let received = response.items.len() as u64;
            items.extend(response.items);

            if received < DEFAULT_PAGE_SIZE || items.len() as u64 >= response.total {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Make a POST request
    pub async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, OcmError> {
        let url = self.build_url(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        Self::decode(Self::check("POST", path, response).await?).await
    }

    /// Make a PATCH request
    pub async fn patch<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, OcmError> {
        let url = self.build_url(path);
        debug!("PATCH {}", url);

        let response = self
            .client
            .patch(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        Self::decode(Self::check("PATCH", path, response).await?).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), OcmError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::check("DELETE", path, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> Response {
        Response::from(http::Response::builder().status(status).body(body).unwrap())
    }

    #[tokio::test]
    async fn test_check_passes_success_through() {
        let checked = HttpClient::check("GET", "/clusters/c1", response(200, "{}")).await.unwrap();
        assert_eq!(checked.status(), StatusCode::OK);
        assert_eq!(checked.text().await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_check_maps_not_found() {
        let err = HttpClient::check("DELETE", "/clusters/c1", response(404, "gone")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(&err, OcmError::NotFound(m) if m == "/clusters/c1 - gone"));
    }

    #[tokio::test]
    async fn test_check_maps_auth_failures() {
        for status in [401, 403] {
            let err = HttpClient::check("GET", "/clusters", response(status, "denied")).await.unwrap_err();
            assert!(matches!(err, OcmError::Authentication(_)), "status {}: {:?}", status, err);
            assert!(!err.is_not_found());
        }
    }

    #[tokio::test]
    async fn test_check_maps_other_statuses_to_api_errors() {
        for status in [400, 409, 500, 503] {
            let err = HttpClient::check("POST", "/clusters", response(status, "boom")).await.unwrap_err();
            let OcmError::Api(message) = err else {
                panic!("status {} should map to an api error", status);
            };
            assert!(message.starts_with("POST /clusters failed:"));
            assert!(message.ends_with("boom"));
        }
    }

    #[test]
    fn test_build_url() {
        let client = HttpClient::new(Client::new(), "https://api.example.com/".to_string(), "t".to_string());
        assert_eq!(
            client.build_url("/api/clusters_mgmt/v1/clusters"),
            "https://api.example.com/api/clusters_mgmt/v1/clusters"
        );
        assert_eq!(client.build_url("https://other.example.com/x"), "https://other.example.com/x");
    }
}
